//! App-level settings persisted next to the data sets.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SOUND_VOLUME: f32 = 0.7;

/// Sound effect preferences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    pub enabled: bool,
    /// Playback volume in `[0, 1]`.
    pub volume: f32,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_SOUND_VOLUME,
        }
    }
}

/// Partial sound settings update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SoundSettingsPatch {
    pub enabled: Option<bool>,
    pub volume: Option<f32>,
}

impl SoundSettings {
    /// Applies `patch`, clamping volume into `[0, 1]`; NaN keeps the old volume.
    pub fn merged(self, patch: SoundSettingsPatch) -> Self {
        let volume = match patch.volume {
            Some(volume) if !volume.is_nan() => volume.clamp(0.0, 1.0),
            _ => self.volume,
        };
        Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SoundSettings, SoundSettingsPatch};

    #[test]
    fn merge_clamps_volume() {
        let merged = SoundSettings::default().merged(SoundSettingsPatch {
            enabled: Some(false),
            volume: Some(3.5),
        });
        assert!(!merged.enabled);
        assert_eq!(merged.volume, 1.0);

        let kept = merged.merged(SoundSettingsPatch {
            volume: Some(f32::NAN),
            ..SoundSettingsPatch::default()
        });
        assert_eq!(kept.volume, 1.0);
    }
}
