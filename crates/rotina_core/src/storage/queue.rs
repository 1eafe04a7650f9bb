//! Write-behind persistence queue.
//!
//! # Responsibility
//! - Own the backing `KvStore` on a dedicated writer thread.
//! - Accept fire-and-forget writes from the stores.
//! - Offer `flush()` for callers that need a durability point.
//!
//! # Invariants
//! - Commands are applied in issuance order; the last issued write wins.
//! - A `read` observes every write issued before it.
//! - Write failures never roll back caller state; they are logged and
//!   reported by the next `flush()`.

use super::{KvStore, StorageError, StorageResult};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

const WRITER_THREAD_NAME: &str = "rotina-persist";

enum Command {
    Set {
        key: String,
        value: String,
    },
    Remove {
        key: String,
    },
    Clear,
    Get {
        key: String,
        reply: Sender<StorageResult<Option<String>>>,
    },
    Flush {
        reply: Sender<Option<StorageError>>,
    },
}

/// Cloneable handle to the persistence writer thread.
///
/// The writer exits once every handle has been dropped and the queue drained.
#[derive(Debug, Clone)]
pub struct PersistQueue {
    sender: Sender<Command>,
}

impl Command {
    fn op_label(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Remove { .. } => "remove",
            Self::Clear => "clear",
            Self::Get { .. } => "get",
            Self::Flush { .. } => "flush",
        }
    }
}

impl PersistQueue {
    /// Moves `store` onto a new writer thread and returns the queue handle.
    pub fn spawn<S: KvStore + 'static>(store: S) -> StorageResult<Self> {
        let (sender, receiver) = mpsc::channel();
        thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(store, receiver))
            .map_err(|err| StorageError::Backend(format!("failed to spawn writer thread: {err}")))?;
        Ok(Self { sender })
    }

    /// Enqueues a whole-value write for `key`.
    pub fn schedule_set(&self, key: &str, value: String) {
        self.enqueue(Command::Set {
            key: key.to_string(),
            value,
        });
    }

    /// Enqueues removal of `key`.
    pub fn schedule_remove(&self, key: &str) {
        self.enqueue(Command::Remove {
            key: key.to_string(),
        });
    }

    /// Enqueues removal of every key.
    pub fn schedule_clear(&self) {
        self.enqueue(Command::Clear);
    }

    /// Reads `key` after every previously enqueued write has been applied.
    pub fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let (reply, response) = mpsc::channel();
        self.sender
            .send(Command::Get {
                key: key.to_string(),
                reply,
            })
            .map_err(|_| StorageError::WriterUnavailable)?;
        response
            .recv()
            .map_err(|_| StorageError::WriterUnavailable)?
    }

    /// Blocks until every enqueued command has been applied.
    ///
    /// # Errors
    /// - Returns the first write failure observed since the previous flush.
    /// - Returns `WriterUnavailable` when the writer thread has stopped.
    pub fn flush(&self) -> StorageResult<()> {
        let (reply, response) = mpsc::channel();
        self.sender
            .send(Command::Flush { reply })
            .map_err(|_| StorageError::WriterUnavailable)?;
        match response.recv() {
            Ok(None) => Ok(()),
            Ok(Some(err)) => Err(err),
            Err(_) => Err(StorageError::WriterUnavailable),
        }
    }

    fn enqueue(&self, command: Command) {
        let op = command.op_label();
        if self.sender.send(command).is_err() {
            error!(
                "event=persist_enqueue module=storage status=error op={} error_code=writer_unavailable",
                op
            );
        }
    }
}

fn run_writer<S: KvStore>(mut store: S, receiver: Receiver<Command>) {
    let mut first_failure: Option<StorageError> = None;

    for command in receiver {
        let op = command.op_label();
        let outcome = match command {
            Command::Set { key, value } => store.set(&key, &value).map(|()| Some(key)),
            Command::Remove { key } => store.remove(&key).map(|()| Some(key)),
            Command::Clear => store.clear().map(|()| None),
            Command::Get { key, reply } => {
                let _ = reply.send(store.get(&key));
                continue;
            }
            Command::Flush { reply } => {
                let _ = reply.send(first_failure.take());
                continue;
            }
        };

        match outcome {
            Ok(key) => debug!(
                "event=persist_write module=storage status=ok op={} key={}",
                op,
                key.as_deref().unwrap_or("*")
            ),
            Err(err) => {
                error!(
                    "event=persist_write module=storage status=error op={} error={}",
                    op, err
                );
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    if let Some(err) = first_failure {
        warn!(
            "event=persist_shutdown module=storage status=error unreported_failure={}",
            err
        );
    }
}
