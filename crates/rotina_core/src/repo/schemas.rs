//! Schemas and migration chains of every persisted data set.

use crate::model::defaults::default_tags;
use crate::model::profile::ThemeColors;
use crate::repo::snapshot_repo::{
    SnapshotError, SnapshotMigration, SnapshotResult, SnapshotSchema,
};
use crate::storage::{BOARD_DATA_KEY, PRAYERS_KEY, PROFILE_KEY, SOUND_SETTINGS_KEY};
use serde_json::{Map, Value};

const PRIMARY_BUTTON_FIELD: &str = "primaryButton";
const SECONDARY_BUTTON_FIELD: &str = "secondaryButton";

pub static BOARD_SCHEMA: SnapshotSchema = SnapshotSchema {
    data_set: "board",
    key: BOARD_DATA_KEY,
    migrations: &[SnapshotMigration {
        version: 1,
        apply: board_v1_tags,
    }],
};

pub static PRAYERS_SCHEMA: SnapshotSchema = SnapshotSchema {
    data_set: "prayers",
    key: PRAYERS_KEY,
    migrations: &[SnapshotMigration {
        version: 1,
        apply: prayers_v1_envelope,
    }],
};

pub static PROFILE_SCHEMA: SnapshotSchema = SnapshotSchema {
    data_set: "profile",
    key: PROFILE_KEY,
    migrations: &[SnapshotMigration {
        version: 1,
        apply: profile_v1_drop_active_colors,
    }],
};

pub static SOUND_SETTINGS_SCHEMA: SnapshotSchema = SnapshotSchema {
    data_set: "sound_settings",
    key: SOUND_SETTINGS_KEY,
    migrations: &[SnapshotMigration {
        version: 1,
        apply: require_object_v1,
    }],
};

fn as_object<'a>(
    data: &'a mut Value,
    data_set: &str,
) -> SnapshotResult<&'a mut Map<String, Value>> {
    data.as_object_mut()
        .ok_or_else(|| SnapshotError::InvalidShape(format!("{data_set} blob must be an object")))
}

/// Boards saved before tags existed get the default tag set, no active
/// filter, and an empty tag list on every task.
fn board_v1_tags(data: &mut Value) -> SnapshotResult<()> {
    let board = as_object(data, "board")?;

    if !matches!(board.get("tags"), Some(Value::Array(_))) {
        board.insert("tags".to_string(), serde_json::to_value(default_tags())?);
        board.insert("activeFilter".to_string(), Value::Null);
    }
    board
        .entry("activeFilter".to_string())
        .or_insert(Value::Null);

    let lists = board
        .get_mut("lists")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| SnapshotError::InvalidShape("board `lists` must be an array".to_string()))?;
    for list in lists {
        let Some(tasks) = list.get_mut("tasks").and_then(Value::as_array_mut) else {
            continue;
        };
        for task in tasks.iter_mut().filter_map(Value::as_object_mut) {
            if !matches!(task.get("tags"), Some(Value::Array(_))) {
                task.insert("tags".to_string(), Value::Array(Vec::new()));
            }
        }
    }

    Ok(())
}

/// Legacy prayer blobs already are an id -> user-data map.
fn prayers_v1_envelope(data: &mut Value) -> SnapshotResult<()> {
    as_object(data, "prayers").map(|_| ())
}

/// `activeThemeColors` is derived on read and no longer stored.
///
/// Palettes saved by older builds may lack `secondaryButton` (or other
/// fields); they are completed so the rest of the profile survives.
fn profile_v1_drop_active_colors(data: &mut Value) -> SnapshotResult<()> {
    let profile = as_object(data, "profile")?;
    profile.remove("activeThemeColors");
    profile.entry("photoUri".to_string()).or_insert(Value::Null);

    let custom = profile
        .entry("customColors".to_string())
        .or_insert(Value::Null);
    match custom {
        Value::Object(colors) => complete_palette(colors)?,
        Value::Null => {}
        _ => *custom = Value::Null,
    }
    Ok(())
}

/// Fills missing palette fields: `secondaryButton` mirrors `primaryButton`,
/// anything else comes from the default palette.
fn complete_palette(colors: &mut Map<String, Value>) -> SnapshotResult<()> {
    if !colors.contains_key(SECONDARY_BUTTON_FIELD) {
        if let Some(primary) = colors.get(PRIMARY_BUTTON_FIELD).cloned() {
            colors.insert(SECONDARY_BUTTON_FIELD.to_string(), primary);
        }
    }
    if let Value::Object(defaults) = serde_json::to_value(ThemeColors::default())? {
        for (field, value) in defaults {
            colors.entry(field).or_insert(value);
        }
    }
    Ok(())
}

fn require_object_v1(data: &mut Value) -> SnapshotResult<()> {
    as_object(data, "sound_settings").map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::{board_v1_tags, profile_v1_drop_active_colors};
    use serde_json::json;

    #[test]
    fn board_migration_injects_tags_and_task_tag_lists() {
        let mut legacy = json!({
            "title": "t",
            "description": "d",
            "lists": [{
                "id": "1",
                "title": "L",
                "tasks": [{"id": "a", "title": "x", "completed": false}]
            }]
        });
        board_v1_tags(&mut legacy).unwrap();

        assert_eq!(legacy["tags"].as_array().map(Vec::len), Some(6));
        assert!(legacy["activeFilter"].is_null());
        assert_eq!(legacy["lists"][0]["tasks"][0]["tags"], json!([]));
    }

    #[test]
    fn board_migration_keeps_existing_tags_and_filter() {
        let mut current = json!({
            "title": "t",
            "description": "d",
            "tags": [{"id": "x", "name": "X", "color": "#000"}],
            "activeFilter": "x",
            "lists": []
        });
        board_v1_tags(&mut current).unwrap();
        assert_eq!(current["tags"].as_array().map(Vec::len), Some(1));
        assert_eq!(current["activeFilter"], json!("x"));
    }

    #[test]
    fn profile_migration_drops_cached_palette() {
        let mut legacy = json!({
            "name": "Ana",
            "themePreset": "blue",
            "activeThemeColors": {"background": "#000"}
        });
        profile_v1_drop_active_colors(&mut legacy).unwrap();
        assert!(legacy.get("activeThemeColors").is_none());
        assert!(legacy["customColors"].is_null());
    }

    #[test]
    fn profile_migration_completes_legacy_custom_palette() {
        let mut legacy = json!({
            "name": "Ana",
            "themePreset": "custom",
            "customColors": {"primaryButton": "#123456", "card": "#EEEEEE"}
        });
        profile_v1_drop_active_colors(&mut legacy).unwrap();

        let colors = &legacy["customColors"];
        assert_eq!(colors["secondaryButton"], json!("#123456"));
        assert_eq!(colors["card"], json!("#EEEEEE"));
        assert_eq!(colors["background"], json!("#FFF0F5"));
        assert_eq!(colors.as_object().map(|map| map.len()), Some(12));
    }

    #[test]
    fn profile_migration_discards_malformed_custom_palette() {
        let mut legacy = json!({
            "name": "Ana",
            "themePreset": "default",
            "customColors": "pink"
        });
        profile_v1_drop_active_colors(&mut legacy).unwrap();
        assert!(legacy["customColors"].is_null());
    }
}
