//! Wiring of clock, persistence, stores and the sweep worker.
//!
//! # Invariants
//! - All stores share one persistence queue, so writes across data sets
//!   are applied in issuance order.
//! - The board store is shared with the sweep worker behind a mutex.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::service::board_service::BoardStore;
use crate::service::prayer_service::PrayerStore;
use crate::service::profile_service::ProfileStore;
use crate::service::settings_service::SettingsStore;
use crate::service::sweep_worker::SweepWorker;
use crate::storage::{KvStore, PersistQueue, SqliteKvStore, StorageError, StorageResult};
use log::info;
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the UI layer talks to.
pub struct RotinaCore {
    queue: PersistQueue,
    board: Arc<Mutex<BoardStore>>,
    prayers: PrayerStore,
    profile: ProfileStore,
    settings: SettingsStore,
    sweep: Option<SweepWorker>,
}

impl RotinaCore {
    /// Opens the SQLite store from `config` and loads every data set.
    pub fn open(config: &CoreConfig) -> StorageResult<Self> {
        let store = match config.db_path.as_ref() {
            Some(path) => SqliteKvStore::open(path)?,
            None => SqliteKvStore::open_in_memory()?,
        };
        let mut core = Self::with_store(store, Arc::new(SystemClock))?;
        core.start_sweep(config)?;
        Ok(core)
    }

    /// Loads every data set from `store` without starting the sweep worker.
    pub fn with_store<S: KvStore + 'static>(
        store: S,
        clock: Arc<dyn Clock>,
    ) -> StorageResult<Self> {
        let queue = PersistQueue::spawn(store)?;
        let board = BoardStore::open(queue.clone(), Arc::clone(&clock));
        let prayers = PrayerStore::open_builtin(queue.clone(), clock);
        let profile = ProfileStore::open(queue.clone());
        let settings = SettingsStore::new(queue.clone());
        info!("event=core_open module=app status=ok");

        Ok(Self {
            queue,
            board: Arc::new(Mutex::new(board)),
            prayers,
            profile,
            settings,
            sweep: None,
        })
    }

    /// Starts the periodic sweep; restarting replaces the running worker.
    pub fn start_sweep(&mut self, config: &CoreConfig) -> StorageResult<()> {
        let worker = SweepWorker::spawn(Arc::clone(&self.board), config.sweep_interval)
            .map_err(|err| StorageError::Backend(format!("failed to spawn sweep worker: {err}")))?;
        self.sweep = Some(worker);
        Ok(())
    }

    pub fn sweep_running(&self) -> bool {
        self.sweep.as_ref().is_some_and(SweepWorker::is_running)
    }

    /// Locks the board store. A poisoned lock is recovered because every
    /// board mutation swaps the snapshot in a single assignment.
    pub fn board(&self) -> MutexGuard<'_, BoardStore> {
        self.board
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn prayers(&self) -> &PrayerStore {
        &self.prayers
    }

    pub fn prayers_mut(&mut self) -> &mut PrayerStore {
        &mut self.prayers
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileStore {
        &mut self.profile
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Blocks until every scheduled write reached the backing store.
    pub fn flush(&self) -> StorageResult<()> {
        self.queue.flush()
    }

    /// Clears the backing store, then reloads every data set from defaults.
    pub fn reset_all_data(&mut self) -> StorageResult<()> {
        self.settings.reset_all_data()?;
        self.board().load();
        self.prayers.load();
        self.profile.load();
        Ok(())
    }
}
