//! Snapshot repositories over the key-value backing store.
//!
//! # Responsibility
//! - Serialize whole data sets into versioned JSON envelopes.
//! - Upgrade older blobs through ordered, per-data-set migrations.
//!
//! # Invariants
//! - Writes always carry the latest schema version.
//! - A blob newer than this binary is rejected, never rewritten.

pub mod schemas;
pub mod snapshot_repo;
