//! Local state layer of the Rotina de Autoamor app.
//!
//! Owns the board (lists, tasks, tags), the prayer catalog with per-user
//! tracking, the user profile and app settings, all persisted as whole
//! snapshots into an on-device key-value store.

pub mod app;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use app::RotinaCore;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::board::{
    BoardData, ListId, NewTask, Tag, TagId, TagPatch, Task, TaskId, TaskList, TaskPatch,
};
pub use model::prayer::{
    ActiveTimer, Prayer, PrayerId, PrayerWithUserData, TimerTick, UserPrayerData,
};
pub use model::profile::{ThemeColors, ThemeColorsPatch, ThemePreset, UserProfile};
pub use model::settings::{SoundSettings, SoundSettingsPatch};
pub use repo::snapshot_repo::{LoadedSnapshot, SnapshotError, SnapshotRepository};
pub use service::board_service::{BoardError, BoardResult, BoardStore};
pub use service::prayer_service::{PrayerError, PrayerStore};
pub use service::profile_service::{ProfileError, ProfileStore};
pub use service::settings_service::SettingsStore;
pub use service::sweep_worker::SweepWorker;
pub use storage::{
    KvStore, MemoryKvStore, PersistQueue, SqliteKvStore, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
