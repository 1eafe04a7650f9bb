//! Domain model for the board, prayer and profile data sets.
//!
//! # Responsibility
//! - Define the wire shapes persisted to the backing store.
//! - Provide pure derivations (filtering, expiry, theme resolution).
//!
//! # Invariants
//! - Wire names are camelCase to stay compatible with existing blobs.
//! - Derived values (`activeThemeColors`, filtered views) are never persisted.

pub mod board;
pub mod defaults;
pub mod prayer;
pub mod profile;
pub mod settings;

use uuid::Uuid;

/// Generates a fresh identifier for lists, tasks and tags.
///
/// Ids are opaque strings; ids created by older builds (timestamps, `tag-1`)
/// remain valid.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
