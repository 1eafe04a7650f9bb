//! Background thread running the completed-task sweep on a fixed period.
//!
//! # Invariants
//! - The worker never holds the board lock between ticks.
//! - Dropping the handle stops the thread without waiting for the next tick.

use crate::service::board_service::BoardStore;
use log::{debug, error, info};
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SWEEP_THREAD_NAME: &str = "rotina-sweep";

/// Handle owning the sweep thread.
pub struct SweepWorker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SweepWorker {
    /// Spawns the worker; the first tick happens one `interval` from now.
    pub fn spawn(board: Arc<Mutex<BoardStore>>, interval: Duration) -> io::Result<Self> {
        let (stop, stop_signal) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(SWEEP_THREAD_NAME.to_string())
            .spawn(move || loop {
                match stop_signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => match board.lock() {
                        Ok(mut store) => {
                            let removed = store.sweep_expired_tasks();
                            debug!(
                                "event=sweep_tick module=sweep status=ok removed_tasks={}",
                                removed
                            );
                        }
                        Err(_) => {
                            error!(
                                "event=sweep_tick module=sweep status=error error_code=lock_poisoned"
                            );
                            break;
                        }
                    },
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        info!(
            "event=sweep_start module=sweep status=ok interval_secs={}",
            interval.as_secs()
        );
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=sweep_stop module=sweep status=error error_code=thread_panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for SweepWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
