//! User profile store: display name, photo reference and theme selection.
//!
//! # Invariants
//! - `active_theme_colors` is always derived from preset + custom colors.
//! - Switching to `Custom` without saved colors seeds them from the palette
//!   that was active right before the switch.

use crate::model::board::is_hex_color;
use crate::model::profile::{ThemeColors, ThemeColorsPatch, ThemePreset, UserProfile};
use crate::repo::schemas::PROFILE_SCHEMA;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::storage::{PersistQueue, StorageResult};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures for profile updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    BlankName,
    InvalidColor(String),
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidColor(color) => write!(f, "invalid theme color: `{color}`"),
        }
    }
}

impl Error for ProfileError {}

pub struct ProfileStore {
    repo: SnapshotRepository<UserProfile>,
    profile: UserProfile,
    is_loading: bool,
}

impl ProfileStore {
    pub fn new(queue: PersistQueue) -> Self {
        Self {
            repo: SnapshotRepository::new(&PROFILE_SCHEMA, queue),
            profile: UserProfile::default(),
            is_loading: true,
        }
    }

    pub fn open(queue: PersistQueue) -> Self {
        let mut store = Self::new(queue);
        store.load();
        store
    }

    /// Loads the persisted profile; missing or unreadable data yields defaults.
    pub fn load(&mut self) {
        match self.repo.load() {
            Ok(Some(loaded)) => {
                self.profile = loaded.data;
                if loaded.migrated_from.is_some() {
                    info!("event=profile_load module=profile status=migrated");
                    self.persist();
                } else {
                    info!("event=profile_load module=profile status=ok source=storage");
                }
            }
            Ok(None) => {
                self.profile = UserProfile::default();
                info!("event=profile_load module=profile status=ok source=default");
            }
            Err(err) => {
                self.profile = UserProfile::default();
                error!(
                    "event=profile_load module=profile status=error fallback=default error={}",
                    err
                );
            }
        }
        self.is_loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Palette derived from the current preset and custom colors.
    pub fn active_theme_colors(&self) -> ThemeColors {
        self.profile.active_theme_colors()
    }

    /// The four built-in palettes in display order.
    pub fn theme_presets(&self) -> Vec<(ThemePreset, ThemeColors)> {
        ThemePreset::BUILT_IN
            .into_iter()
            .filter_map(|preset| preset.palette().map(|colors| (preset, colors)))
            .collect()
    }

    /// Renames the user; blank names are rejected without mutation.
    pub fn update_name(&mut self, name: impl Into<String>) -> Result<(), ProfileError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProfileError::BlankName);
        }
        self.profile.name = name;
        self.persist();
        Ok(())
    }

    /// Stores an opaque photo reference; `None` removes the photo.
    pub fn update_photo(&mut self, photo_uri: Option<String>) {
        self.profile.photo_uri = photo_uri;
        self.persist();
    }

    pub fn change_theme_preset(&mut self, preset: ThemePreset) {
        self.switch_preset(preset);
        self.persist();
    }

    /// Merges `patch` into the custom palette, switching to `Custom` first
    /// when another preset is active. Preset and colors are saved together.
    pub fn update_custom_colors(
        &mut self,
        patch: &ThemeColorsPatch,
    ) -> Result<(), ProfileError> {
        if let Some(invalid) = patch.values().find(|color| !is_hex_color(color)) {
            return Err(ProfileError::InvalidColor(invalid.to_string()));
        }
        if self.profile.theme_preset != ThemePreset::Custom {
            self.switch_preset(ThemePreset::Custom);
        }
        let base = self
            .profile
            .custom_colors
            .clone()
            .unwrap_or_else(|| self.profile.active_theme_colors());
        self.profile.custom_colors = Some(patch.merged_into(&base));
        self.persist();
        Ok(())
    }

    /// Switches back to the default preset; saved custom colors are kept.
    pub fn reset_theme(&mut self) {
        self.change_theme_preset(ThemePreset::Default);
    }

    pub fn flush(&self) -> StorageResult<()> {
        self.repo.flush()
    }

    fn switch_preset(&mut self, preset: ThemePreset) {
        if preset == ThemePreset::Custom && self.profile.custom_colors.is_none() {
            self.profile.custom_colors = Some(self.profile.active_theme_colors());
        }
        self.profile.theme_preset = preset;
        info!(
            "event=theme_change module=profile status=ok preset={}",
            preset.as_str()
        );
    }

    fn persist(&self) {
        if let Err(err) = self.repo.save(&self.profile) {
            warn!(
                "event=profile_persist module=profile status=error error={}",
                err
            );
        }
    }
}
