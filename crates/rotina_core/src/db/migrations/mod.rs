//! Schema steps for the key-value backing table.
//!
//! # Invariants
//! - Step versions start at 1 and grow by exactly one.
//! - `PRAGMA user_version` holds the last applied step.
//! - Pending steps run in one transaction; a failed step leaves the
//!   database at its previous version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    label: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    label: "kv_entries",
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Schema version written by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to `latest_version` and returns how many steps ran.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Sqlite` when a step fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = pending_steps(from_version);
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} step={}",
            step.version, step.label
        );
    }
    tx.commit()?;

    Ok(latest - from_version)
}

fn pending_steps(from_version: u32) -> &'static [SchemaStep] {
    let applied = SCHEMA_STEPS
        .iter()
        .take_while(|step| step.version <= from_version)
        .count();
    &SCHEMA_STEPS[applied..]
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
