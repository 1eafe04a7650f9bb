//! App settings: sound preferences, first-run marker and full data reset.

use crate::model::settings::{SoundSettings, SoundSettingsPatch};
use crate::repo::schemas::SOUND_SETTINGS_SCHEMA;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::storage::{PersistQueue, StorageResult, HAS_RUN_KEY};
use log::{error, info, warn};

const HAS_RUN_VALUE: &str = "true";

pub struct SettingsStore {
    sound: SnapshotRepository<SoundSettings>,
    queue: PersistQueue,
}

impl SettingsStore {
    pub fn new(queue: PersistQueue) -> Self {
        Self {
            sound: SnapshotRepository::new(&SOUND_SETTINGS_SCHEMA, queue.clone()),
            queue,
        }
    }

    /// Current sound settings; defaults are written when none are stored.
    pub fn sound_settings(&self) -> SoundSettings {
        match self.sound.load() {
            Ok(Some(loaded)) => {
                if loaded.migrated_from.is_some() {
                    self.save_sound(&loaded.data);
                }
                loaded.data
            }
            Ok(None) => {
                let defaults = SoundSettings::default();
                self.save_sound(&defaults);
                defaults
            }
            Err(err) => {
                error!(
                    "event=sound_settings_load module=settings status=error fallback=default error={}",
                    err
                );
                SoundSettings::default()
            }
        }
    }

    /// Merges `patch` into the stored settings and returns the result.
    pub fn update_sound_settings(&self, patch: SoundSettingsPatch) -> SoundSettings {
        let updated = self.sound_settings().merged(patch);
        self.save_sound(&updated);
        updated
    }

    /// Returns `true` exactly once per installation (until data is reset).
    ///
    /// Storage failures answer `false`.
    pub fn is_first_run(&self) -> bool {
        match self.queue.read(HAS_RUN_KEY) {
            Ok(Some(_)) => false,
            Ok(None) => {
                self.queue
                    .schedule_set(HAS_RUN_KEY, HAS_RUN_VALUE.to_string());
                info!("event=first_run module=settings status=ok");
                true
            }
            Err(err) => {
                error!(
                    "event=first_run module=settings status=error error={}",
                    err
                );
                false
            }
        }
    }

    /// Removes every key from the backing store and waits for completion.
    ///
    /// In-memory stores keep their state; callers reload them afterwards.
    pub fn reset_all_data(&self) -> StorageResult<()> {
        self.queue.schedule_clear();
        let result = self.queue.flush();
        match &result {
            Ok(()) => info!("event=data_reset module=settings status=ok"),
            Err(err) => error!("event=data_reset module=settings status=error error={}", err),
        }
        result
    }

    fn save_sound(&self, settings: &SoundSettings) {
        if let Err(err) = self.sound.save(settings) {
            warn!(
                "event=sound_settings_persist module=settings status=error error={}",
                err
            );
        }
    }
}
