//! Prayer store: static catalog merged with persisted user tracking, plus
//! the meditation countdown.
//!
//! # Invariants
//! - Only the id -> `UserPrayerData` map is persisted, never the catalog.
//! - Catalog order is preserved by every view.
//! - Timer state lives in memory only; a restart always starts idle.

use crate::clock::Clock;
use crate::model::prayer::{
    builtin_catalog, ActiveTimer, Prayer, PrayerId, PrayerWithUserData, TimerTick,
    UserPrayerData,
};
use crate::repo::schemas::PRAYERS_SCHEMA;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::storage::{PersistQueue, StorageResult};
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

type UserDataMap = BTreeMap<PrayerId, UserPrayerData>;

/// Errors from prayer store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrayerError {
    PrayerNotFound(PrayerId),
}

impl Display for PrayerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrayerNotFound(id) => write!(f, "prayer not found: {id}"),
        }
    }
}

impl Error for PrayerError {}

pub struct PrayerStore {
    repo: SnapshotRepository<UserDataMap>,
    clock: Arc<dyn Clock>,
    catalog: Vec<Prayer>,
    prayers: Vec<PrayerWithUserData>,
    categories: Vec<String>,
    selected_category: Option<String>,
    show_favorites_only: bool,
    timer: Option<ActiveTimer>,
    is_loading: bool,
}

impl PrayerStore {
    /// Creates an unloaded store over an explicit catalog.
    pub fn new(queue: PersistQueue, clock: Arc<dyn Clock>, catalog: Vec<Prayer>) -> Self {
        Self {
            repo: SnapshotRepository::new(&PRAYERS_SCHEMA, queue),
            clock,
            catalog,
            prayers: Vec::new(),
            categories: Vec::new(),
            selected_category: None,
            show_favorites_only: false,
            timer: None,
            is_loading: true,
        }
    }

    /// Creates and loads a store over the catalog shipped with the app.
    pub fn open_builtin(queue: PersistQueue, clock: Arc<dyn Clock>) -> Self {
        let catalog = builtin_catalog().unwrap_or_else(|err| {
            error!(
                "event=prayer_catalog module=prayer status=error fallback=empty error={}",
                err
            );
            Vec::new()
        });
        let mut store = Self::new(queue, clock, catalog);
        store.load();
        store
    }

    /// Merges the catalog with persisted user data.
    ///
    /// Unreadable user data is treated as empty; unseen prayers start zeroed.
    pub fn load(&mut self) {
        let (mut user_data, migrated) = match self.repo.load() {
            Ok(Some(loaded)) => {
                let migrated = loaded.migrated_from.is_some();
                (loaded.data, migrated)
            }
            Ok(None) => (UserDataMap::new(), false),
            Err(err) => {
                error!(
                    "event=prayer_load module=prayer status=error fallback=empty error={}",
                    err
                );
                (UserDataMap::new(), false)
            }
        };

        self.prayers = self
            .catalog
            .iter()
            .map(|prayer| PrayerWithUserData {
                prayer: prayer.clone(),
                user_data: user_data.remove(&prayer.id).unwrap_or_default(),
            })
            .collect();
        self.categories = self
            .catalog
            .iter()
            .map(|prayer| prayer.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.timer = None;
        self.is_loading = false;
        info!(
            "event=prayer_load module=prayer status=ok prayers={} categories={}",
            self.prayers.len(),
            self.categories.len()
        );

        if migrated {
            info!("event=prayer_load module=prayer status=migrated");
            self.persist();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Every prayer in catalog order.
    pub fn prayers(&self) -> &[PrayerWithUserData] {
        &self.prayers
    }

    pub fn prayer(&self, prayer_id: &str) -> Option<&PrayerWithUserData> {
        self.prayers.iter().find(|entry| entry.prayer.id == prayer_id)
    }

    /// Sorted, de-duplicated catalog categories.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    pub fn set_selected_category(&mut self, category: Option<String>) {
        self.selected_category = category;
    }

    pub fn show_favorites_only(&self) -> bool {
        self.show_favorites_only
    }

    pub fn set_show_favorites_only(&mut self, favorites_only: bool) {
        self.show_favorites_only = favorites_only;
    }

    /// Prayers matching the category and favorites filters, catalog order.
    pub fn filtered_prayers(&self) -> Vec<&PrayerWithUserData> {
        self.prayers
            .iter()
            .filter(|entry| {
                self.selected_category
                    .as_deref()
                    .map_or(true, |category| entry.prayer.category == category)
            })
            .filter(|entry| !self.show_favorites_only || entry.user_data.favorite)
            .collect()
    }

    pub fn favorites(&self) -> Vec<&PrayerWithUserData> {
        self.prayers
            .iter()
            .filter(|entry| entry.user_data.favorite)
            .collect()
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self, prayer_id: &str) -> Result<bool, PrayerError> {
        let entry = self.entry_mut(prayer_id)?;
        entry.user_data.favorite = !entry.user_data.favorite;
        let favorite = entry.user_data.favorite;
        self.persist();
        Ok(favorite)
    }

    /// Records one completion; repeatable, no dedup window.
    pub fn mark_completed(&mut self, prayer_id: &str) -> Result<(), PrayerError> {
        let now = self.clock.now();
        let entry = self.entry_mut(prayer_id)?;
        entry.user_data.completed = true;
        entry.user_data.last_completed = Some(now);
        entry.user_data.completion_count = entry.user_data.completion_count.saturating_add(1);
        debug!(
            "event=prayer_completed module=prayer status=ok completion_count={}",
            entry.user_data.completion_count
        );
        self.persist();
        Ok(())
    }

    /// Starts (or restarts) the countdown for `prayer_id`.
    pub fn start_timer(&mut self, prayer_id: &str) -> Result<ActiveTimer, PrayerError> {
        let duration = self
            .prayer(prayer_id)
            .map(|entry| entry.prayer.duration_seconds())
            .ok_or_else(|| PrayerError::PrayerNotFound(prayer_id.to_string()))?;
        if self.timer.is_some() {
            debug!("event=prayer_timer module=prayer status=replaced");
        }
        let timer = ActiveTimer {
            prayer_id: prayer_id.to_string(),
            time_remaining: duration,
            duration,
        };
        self.timer = Some(timer.clone());
        Ok(timer)
    }

    /// Feeds one tick from the UI countdown driver.
    ///
    /// A value of zero or less completes the timer.
    pub fn update_timer(&mut self, seconds_remaining: i64) -> TimerTick {
        if seconds_remaining <= 0 {
            return match self.complete_timer() {
                Some(prayer_id) => TimerTick::Completed { prayer_id },
                None => TimerTick::Idle,
            };
        }
        let Some(timer) = self.timer.as_mut() else {
            return TimerTick::Idle;
        };
        timer.time_remaining = u32::try_from(seconds_remaining).unwrap_or(u32::MAX);
        TimerTick::Running {
            time_remaining: timer.time_remaining,
        }
    }

    /// Ends the active countdown and marks its prayer completed.
    ///
    /// Returns the completed prayer id, or `None` when no timer was running.
    pub fn complete_timer(&mut self) -> Option<PrayerId> {
        let timer = self.timer.take()?;
        if let Err(err) = self.mark_completed(&timer.prayer_id) {
            warn!(
                "event=prayer_timer module=prayer status=error op=complete error={}",
                err
            );
        }
        Some(timer.prayer_id)
    }

    /// Drops the active countdown without recording a completion.
    pub fn cancel_timer(&mut self) {
        if self.timer.take().is_some() {
            debug!("event=prayer_timer module=prayer status=cancelled");
        }
    }

    pub fn current_timer(&self) -> Option<&ActiveTimer> {
        self.timer.as_ref()
    }

    pub fn timer_active(&self) -> bool {
        self.timer.is_some()
    }

    pub fn flush(&self) -> StorageResult<()> {
        self.repo.flush()
    }

    fn entry_mut(&mut self, prayer_id: &str) -> Result<&mut PrayerWithUserData, PrayerError> {
        self.prayers
            .iter_mut()
            .find(|entry| entry.prayer.id == prayer_id)
            .ok_or_else(|| PrayerError::PrayerNotFound(prayer_id.to_string()))
    }

    fn persist(&self) {
        let user_data = self
            .prayers
            .iter()
            .map(|entry| (entry.prayer.id.clone(), entry.user_data.clone()))
            .collect::<UserDataMap>();
        if let Err(err) = self.repo.save(&user_data) {
            warn!(
                "event=prayer_persist module=prayer status=error error={}",
                err
            );
        }
    }
}
