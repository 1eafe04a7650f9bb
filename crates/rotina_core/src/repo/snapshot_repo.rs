//! Versioned JSON snapshot repository.
//!
//! Envelope shape: `{"schemaVersion": N, "data": <snapshot>}`. Blobs written
//! before envelopes existed are bare snapshots and count as version 0.

use crate::storage::{PersistQueue, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

const ENVELOPE_VERSION_FIELD: &str = "schemaVersion";
const ENVELOPE_DATA_FIELD: &str = "data";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors raised while reading, migrating or writing a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    Storage(StorageError),
    Json(serde_json::Error),
    UnsupportedSchemaVersion {
        data_set: &'static str,
        stored: u32,
        latest_supported: u32,
    },
    /// Blob parsed as JSON but does not have the expected structure.
    InvalidShape(String),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid snapshot json: {err}"),
            Self::UnsupportedSchemaVersion {
                data_set,
                stored,
                latest_supported,
            } => write!(
                f,
                "{data_set} schema version {stored} is newer than supported {latest_supported}"
            ),
            Self::InvalidShape(message) => write!(f, "invalid snapshot shape: {message}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidShape(_) => None,
        }
    }
}

impl From<StorageError> for SnapshotError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// One upgrade step over the raw JSON snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotMigration {
    /// Version produced by this step.
    pub version: u32,
    pub apply: fn(&mut Value) -> SnapshotResult<()>,
}

/// Storage key plus the ordered migration chain of one data set.
#[derive(Debug)]
pub struct SnapshotSchema {
    pub data_set: &'static str,
    pub key: &'static str,
    /// Strictly increasing by `version`.
    pub migrations: &'static [SnapshotMigration],
}

impl SnapshotSchema {
    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map_or(0, |migration| migration.version)
    }

    /// Upgrades `data` from `stored` to the latest version.
    ///
    /// Returns whether any migration step ran.
    pub fn migrate(&self, stored: u32, data: &mut Value) -> SnapshotResult<bool> {
        let latest = self.latest_version();
        if stored > latest {
            return Err(SnapshotError::UnsupportedSchemaVersion {
                data_set: self.data_set,
                stored,
                latest_supported: latest,
            });
        }

        let mut migrated = false;
        for migration in self.migrations {
            if migration.version <= stored {
                continue;
            }
            (migration.apply)(data)?;
            migrated = true;
        }
        Ok(migrated)
    }
}

/// Snapshot read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot<T> {
    pub data: T,
    /// Stored version when migrations ran; `None` when already current.
    pub migrated_from: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a, T> {
    schema_version: u32,
    data: &'a T,
}

/// Reads and writes one data set as a whole-value versioned blob.
pub struct SnapshotRepository<T> {
    schema: &'static SnapshotSchema,
    queue: PersistQueue,
    _snapshot: PhantomData<fn() -> T>,
}

impl<T> SnapshotRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(schema: &'static SnapshotSchema, queue: PersistQueue) -> Self {
        Self {
            schema,
            queue,
            _snapshot: PhantomData,
        }
    }

    /// Loads and migrates the stored snapshot; `Ok(None)` when absent.
    ///
    /// Migrated data is returned, not written; callers decide when to persist.
    pub fn load(&self) -> SnapshotResult<Option<LoadedSnapshot<T>>> {
        let Some(raw) = self.queue.read(self.schema.key)? else {
            return Ok(None);
        };
        let parsed: Value = serde_json::from_str(&raw)?;
        let (stored_version, mut data) = split_envelope(parsed)?;
        let migrated = self.schema.migrate(stored_version, &mut data)?;
        let snapshot = serde_json::from_value(data)?;
        Ok(Some(LoadedSnapshot {
            data: snapshot,
            migrated_from: migrated.then_some(stored_version),
        }))
    }

    /// Schedules a write of the full snapshot at the latest schema version.
    ///
    /// # Errors
    /// - Returns `Json` when the snapshot cannot be serialized. Storage
    ///   failures surface through `flush()`.
    pub fn save(&self, snapshot: &T) -> SnapshotResult<()> {
        let envelope = EnvelopeRef {
            schema_version: self.schema.latest_version(),
            data: snapshot,
        };
        let serialized = serde_json::to_string(&envelope)?;
        self.queue.schedule_set(self.schema.key, serialized);
        Ok(())
    }

    /// Blocks until every scheduled write has reached the backing store.
    pub fn flush(&self) -> StorageResult<()> {
        self.queue.flush()
    }
}

fn split_envelope(parsed: Value) -> SnapshotResult<(u32, Value)> {
    match parsed {
        Value::Object(mut object)
            if object.contains_key(ENVELOPE_VERSION_FIELD)
                && object.contains_key(ENVELOPE_DATA_FIELD) =>
        {
            let version = object
                .get(ENVELOPE_VERSION_FIELD)
                .and_then(Value::as_u64)
                .and_then(|version| u32::try_from(version).ok())
                .ok_or_else(|| {
                    SnapshotError::InvalidShape(format!(
                        "`{ENVELOPE_VERSION_FIELD}` must be a non-negative integer"
                    ))
                })?;
            let data = object.remove(ENVELOPE_DATA_FIELD).unwrap_or(Value::Null);
            Ok((version, data))
        }
        legacy => Ok((0, legacy)),
    }
}

#[cfg(test)]
mod tests {
    use super::{split_envelope, SnapshotError, SnapshotMigration, SnapshotSchema};
    use serde_json::{json, Value};

    fn add_marker(data: &mut Value) -> super::SnapshotResult<()> {
        if let Some(object) = data.as_object_mut() {
            object.insert("marker".to_string(), json!(true));
        }
        Ok(())
    }

    static TEST_SCHEMA: SnapshotSchema = SnapshotSchema {
        data_set: "test",
        key: "test-key",
        migrations: &[SnapshotMigration {
            version: 1,
            apply: add_marker,
        }],
    };

    #[test]
    fn bare_blob_is_version_zero() {
        let (version, data) = split_envelope(json!({"a": 1})).unwrap();
        assert_eq!(version, 0);
        assert_eq!(data, json!({"a": 1}));
    }

    #[test]
    fn envelope_is_unwrapped() {
        let (version, data) = split_envelope(json!({"schemaVersion": 1, "data": [1, 2]})).unwrap();
        assert_eq!(version, 1);
        assert_eq!(data, json!([1, 2]));
    }

    #[test]
    fn negative_envelope_version_is_invalid() {
        let err = split_envelope(json!({"schemaVersion": -1, "data": {}})).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidShape(_)));
    }

    #[test]
    fn migrate_runs_only_newer_steps() {
        let mut legacy = json!({});
        assert!(TEST_SCHEMA.migrate(0, &mut legacy).unwrap());
        assert_eq!(legacy, json!({"marker": true}));

        let mut current = json!({});
        assert!(!TEST_SCHEMA.migrate(1, &mut current).unwrap());
        assert_eq!(current, json!({}));
    }

    #[test]
    fn migrate_rejects_future_versions() {
        let mut data = json!({});
        let err = TEST_SCHEMA.migrate(7, &mut data).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedSchemaVersion {
                stored: 7,
                latest_supported: 1,
                ..
            }
        ));
    }
}
