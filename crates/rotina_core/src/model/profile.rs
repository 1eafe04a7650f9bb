//! User profile and theme palettes.
//!
//! # Invariants
//! - The active palette is derived from `theme_preset` + `custom_colors`;
//!   it is not part of the persisted shape.
//! - Switching to `Custom` never yields an empty palette.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE_NAME: &str = "Usuário";

/// Theme selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    #[default]
    Default,
    Blue,
    Green,
    Purple,
    Custom,
}

impl ThemePreset {
    /// Built-in presets, in display order.
    pub const BUILT_IN: [ThemePreset; 4] = [
        ThemePreset::Default,
        ThemePreset::Blue,
        ThemePreset::Green,
        ThemePreset::Purple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Custom => "custom",
        }
    }

    /// Parses the wire name; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "purple" => Some(Self::Purple),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Fixed palette of a built-in preset; `None` for `Custom`.
    pub fn palette(self) -> Option<ThemeColors> {
        let seed = match self {
            Self::Default => DEFAULT_SEED,
            Self::Blue => ("#E6F2FF", "#B3D9FF", "#4D94FF", "#1A75FF"),
            Self::Green => ("#E6FFF2", "#B3FFD9", "#4DFFB8", "#1AFF93"),
            Self::Purple => ("#F0E6FF", "#D9B3FF", "#9966FF", "#7F33FF"),
            Self::Custom => return None,
        };
        Some(ThemeColors::from_seed(seed))
    }
}

/// `(background, list header, primary button, secondary button)`.
type PaletteSeed = (&'static str, &'static str, &'static str, &'static str);

const DEFAULT_SEED: PaletteSeed = ("#FFF0F5", "#FFDAB9", "#FFB6C1", "#FFB6C1");

/// Full color palette used by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background: String,
    pub list_header: String,
    pub card: String,
    pub primary_button: String,
    pub secondary_button: String,
    pub delete_button: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub checkbox_border: String,
    pub checkbox_fill: String,
    pub checkbox_check: String,
    pub input_focus_border: String,
}

impl ThemeColors {
    fn from_seed((background, list_header, primary, secondary): PaletteSeed) -> Self {
        Self {
            background: background.to_string(),
            list_header: list_header.to_string(),
            card: "#FFFFFF".to_string(),
            primary_button: primary.to_string(),
            secondary_button: secondary.to_string(),
            delete_button: "#FF6347".to_string(),
            text_primary: "#333333".to_string(),
            text_secondary: "#666666".to_string(),
            checkbox_border: "#FFF".to_string(),
            checkbox_fill: primary.to_string(),
            checkbox_check: "#FFF".to_string(),
            input_focus_border: primary.to_string(),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::from_seed(DEFAULT_SEED)
    }
}

/// Partial palette update; `None` keeps the current color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeColorsPatch {
    pub background: Option<String>,
    pub list_header: Option<String>,
    pub card: Option<String>,
    pub primary_button: Option<String>,
    pub secondary_button: Option<String>,
    pub delete_button: Option<String>,
    pub text_primary: Option<String>,
    pub text_secondary: Option<String>,
    pub checkbox_border: Option<String>,
    pub checkbox_fill: Option<String>,
    pub checkbox_check: Option<String>,
    pub input_focus_border: Option<String>,
}

impl ThemeColorsPatch {
    /// Every color value carried by the patch.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        [
            &self.background,
            &self.list_header,
            &self.card,
            &self.primary_button,
            &self.secondary_button,
            &self.delete_button,
            &self.text_primary,
            &self.text_secondary,
            &self.checkbox_border,
            &self.checkbox_fill,
            &self.checkbox_check,
            &self.input_focus_border,
        ]
        .into_iter()
        .filter_map(|value| value.as_deref())
    }

    /// Returns `base` with every color present in the patch replaced.
    pub fn merged_into(&self, base: &ThemeColors) -> ThemeColors {
        fn pick(patch: &Option<String>, current: &str) -> String {
            patch.clone().unwrap_or_else(|| current.to_string())
        }

        ThemeColors {
            background: pick(&self.background, &base.background),
            list_header: pick(&self.list_header, &base.list_header),
            card: pick(&self.card, &base.card),
            primary_button: pick(&self.primary_button, &base.primary_button),
            secondary_button: pick(&self.secondary_button, &base.secondary_button),
            delete_button: pick(&self.delete_button, &base.delete_button),
            text_primary: pick(&self.text_primary, &base.text_primary),
            text_secondary: pick(&self.text_secondary, &base.text_secondary),
            checkbox_border: pick(&self.checkbox_border, &base.checkbox_border),
            checkbox_fill: pick(&self.checkbox_fill, &base.checkbox_fill),
            checkbox_check: pick(&self.checkbox_check, &base.checkbox_check),
            input_focus_border: pick(&self.input_focus_border, &base.input_focus_border),
        }
    }
}

/// Persisted user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub photo_uri: Option<String>,
    pub theme_preset: ThemePreset,
    pub custom_colors: Option<ThemeColors>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE_NAME.to_string(),
            photo_uri: None,
            theme_preset: ThemePreset::Default,
            custom_colors: None,
        }
    }
}

impl UserProfile {
    /// Palette the UI should render with.
    ///
    /// `Custom` without saved colors falls back to the default palette.
    pub fn active_theme_colors(&self) -> ThemeColors {
        match (self.theme_preset, self.custom_colors.as_ref()) {
            (ThemePreset::Custom, Some(custom)) => custom.clone(),
            (preset, _) => preset.palette().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ThemeColors, ThemeColorsPatch, ThemePreset, UserProfile};

    #[test]
    fn every_built_in_preset_has_a_palette() {
        for preset in ThemePreset::BUILT_IN {
            assert!(preset.palette().is_some(), "{} missing", preset.as_str());
        }
        assert!(ThemePreset::Custom.palette().is_none());
    }

    #[test]
    fn custom_without_colors_falls_back_to_default_palette() {
        let profile = UserProfile {
            theme_preset: ThemePreset::Custom,
            ..UserProfile::default()
        };
        assert_eq!(profile.active_theme_colors(), ThemeColors::default());
    }

    #[test]
    fn patch_merge_only_touches_present_fields() {
        let base = ThemeColors::default();
        let patch = ThemeColorsPatch {
            card: Some("#000000".to_string()),
            ..ThemeColorsPatch::default()
        };
        let merged = patch.merged_into(&base);
        assert_eq!(merged.card, "#000000");
        assert_eq!(merged.background, base.background);
        assert_eq!(patch.values().count(), 1);
    }

    #[test]
    fn preset_parse_round_trips_wire_names() {
        for preset in ThemePreset::BUILT_IN {
            assert_eq!(ThemePreset::parse(preset.as_str()), Some(preset));
        }
        assert_eq!(ThemePreset::parse("CUSTOM"), Some(ThemePreset::Custom));
        assert_eq!(ThemePreset::parse("neon"), None);
    }
}
