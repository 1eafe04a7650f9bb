//! Key-value backing store contract and implementations.
//!
//! # Responsibility
//! - Define the `KvStore` contract every store persists through.
//! - Provide in-memory and SQLite implementations.
//! - Serialize writes through a single write-behind queue.
//!
//! # Invariants
//! - A `set` followed by a `get` of the same key returns the last written value.
//! - `clear` removes every key.
//! - Values are whole serialized snapshots; there are no partial-field writes.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod queue;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use queue::PersistQueue;
pub use sqlite::SqliteKvStore;

/// Key of the board snapshot blob.
pub const BOARD_DATA_KEY: &str = "@RotinaAutoamor:boardData";
/// Key of the prayer user-data map blob.
pub const PRAYERS_KEY: &str = "@RotinaAutoamor:prayers";
/// Key of the user profile blob.
pub const PROFILE_KEY: &str = "@RotinaAutoamor:userProfile";
/// Key of the sound settings blob.
pub const SOUND_SETTINGS_KEY: &str = "@RotinaAutoamor:soundSettings";
/// Key of the first-run marker.
pub const HAS_RUN_KEY: &str = "@RotinaAutoamor:hasRun";

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by backing stores and the persistence queue.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite transport or bootstrap failure.
    Db(DbError),
    /// Backend refused the operation (used by non-SQLite backends).
    Backend(String),
    /// The writer thread is gone; nothing can be read or persisted.
    WriterUnavailable,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
            Self::WriterUnavailable => write!(f, "persistence writer is not running"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) | Self::WriterUnavailable => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed blob store.
///
/// Implementations are owned by the persistence writer thread, hence `Send`.
pub trait KvStore: Send {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Inserts or replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes `key`; removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
    /// Removes every key.
    fn clear(&mut self) -> StorageResult<()>;
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn clear(&mut self) -> StorageResult<()> {
        (**self).clear()
    }
}
