//! Stores exposed to the UI layer.
//!
//! # Responsibility
//! - Hold the in-memory snapshot of each data set behind a mutation API.
//! - Schedule whole-snapshot persistence after every mutation.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod board_service;
pub mod prayer_service;
pub mod profile_service;
pub mod settings_service;
pub mod sweep_worker;
