//! Prayer catalog entries, per-user tracking and meditation timer state.
//!
//! # Invariants
//! - Catalog entries are read-only; only `UserPrayerData` is persisted.
//! - `UserPrayerData::completion_count` only grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG_JSON: &str = include_str!("../../assets/prayers.json");

pub type PrayerId = String;

/// Static prayer/meditation entry shipped with the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    pub id: PrayerId,
    pub title: String,
    pub text: String,
    pub category: String,
    /// Suggested meditation length in minutes.
    pub duration: u32,
}

impl Prayer {
    pub fn duration_seconds(&self) -> u32 {
        self.duration.saturating_mul(60)
    }
}

/// Mutable per-prayer user state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPrayerData {
    pub favorite: bool,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<DateTime<Utc>>,
    pub completion_count: u32,
}

/// Catalog entry merged with the user's tracking data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerWithUserData {
    #[serde(flatten)]
    pub prayer: Prayer,
    pub user_data: UserPrayerData,
}

/// Countdown of an in-progress meditation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    pub prayer_id: PrayerId,
    /// Seconds left.
    pub time_remaining: u32,
    /// Total seconds.
    pub duration: u32,
}

/// Outcome of one timer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerTick {
    /// No timer is running; the tick was ignored.
    Idle,
    Running { time_remaining: u32 },
    /// The countdown reached zero and the prayer was marked completed.
    Completed { prayer_id: PrayerId },
}

/// Parses the catalog embedded in the binary.
pub fn builtin_catalog() -> Result<Vec<Prayer>, serde_json::Error> {
    serde_json::from_str(BUILTIN_CATALOG_JSON)
}

#[cfg(test)]
mod tests {
    use super::builtin_catalog;
    use std::collections::HashSet;

    #[test]
    fn builtin_catalog_parses_with_unique_ids() {
        let catalog = builtin_catalog().unwrap();
        assert!(!catalog.is_empty());
        let ids = catalog.iter().map(|p| p.id.as_str()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.iter().all(|p| p.duration > 0));
    }
}
