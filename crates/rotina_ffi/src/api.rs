//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board, prayer, profile and settings operations to Dart via FRB.
//! - Own the process-wide `RotinaCore` instance.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Snapshots cross the boundary as JSON strings in the persisted camelCase
//!   shape; commands return flat response envelopes.
//! - The core is opened lazily on first use when `core_init` was not called.

use chrono::{DateTime, Utc};
use log::{error, info};
use rotina_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, logging_status,
    ping as ping_inner, CoreConfig, NewTask, RotinaCore, SoundSettingsPatch, TagPatch, TaskPatch,
    ThemeColorsPatch, ThemePreset, TimerTick,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const CORE_DB_FILE_NAME: &str = "rotina.sqlite3";
static CORE: OnceLock<Mutex<RotinaCore>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the on-device store at `db_path` and loads every data set.
///
/// A blank `db_path` falls back to `ROTINA_DB_PATH`, then to a file in the
/// system temp directory.
///
/// # FFI contract
/// - Only the first successful call opens a store; later calls are no-ops.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn core_init(db_path: String) -> String {
    let trimmed = db_path.trim();
    let path = if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    };
    match ensure_core(path) {
        Ok(_) => String::new(),
        Err(err) => err,
    }
}

/// Command outcome envelope shared by every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created entity, when the command creates one.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            id: None,
            message: message.into(),
        }
    }

    fn created(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result(op: &str, result: Result<String, String>) -> Self {
        match result {
            Ok(message) => Self::success(message),
            Err(err) => Self::failure(format!("{op} failed: {err}")),
        }
    }
}

/// Countdown state after a timer command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerResponse {
    /// `idle|running|completed`.
    pub state: String,
    pub prayer_id: Option<String>,
    /// Seconds left; zero when idle or completed.
    pub time_remaining: u32,
    /// Total seconds of the running countdown; zero when idle or completed.
    pub duration: u32,
    pub message: String,
}

impl TimerResponse {
    fn idle(message: impl Into<String>) -> Self {
        Self {
            state: "idle".to_string(),
            prayer_id: None,
            time_remaining: 0,
            duration: 0,
            message: message.into(),
        }
    }
}

/// Sound preferences as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundSettingsResponse {
    pub enabled: bool,
    pub volume: f32,
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Full board snapshot as JSON; empty string when the core is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot_json() -> String {
    read_json("board_snapshot_json", |core| {
        serde_json::to_string(core.board().board()).map_err(|err| err.to_string())
    })
}

/// Lists narrowed to the active tag filter as a JSON array.
#[flutter_rust_bridge::frb(sync)]
pub fn board_filtered_lists_json() -> String {
    read_json("board_filtered_lists_json", |core| {
        serde_json::to_string(&core.board().filtered_lists()).map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_info(title: String, description: String) -> ActionResponse {
    ActionResponse::from_result(
        "board_update_info",
        with_core(|core| {
            core.board().update_board_info(title, description);
            Ok("Board updated.".to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_add_list(title: String) -> ActionResponse {
    match with_core(|core| core.board().add_list(title).map_err(|err| err.to_string())) {
        Ok(list_id) => ActionResponse::created("List created.", list_id),
        Err(err) => ActionResponse::failure(format!("board_add_list failed: {err}")),
    }
}

/// Creates a list pre-filled with one task per title, all or nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_template_list(title: String, task_titles: Vec<String>) -> ActionResponse {
    let drafts = task_titles.into_iter().map(NewTask::titled).collect();
    match with_core(|core| {
        core.board()
            .add_template_list(title, drafts)
            .map(|(list_id, _)| list_id)
            .map_err(|err| err.to_string())
    }) {
        Ok(list_id) => ActionResponse::created("Template list created.", list_id),
        Err(err) => ActionResponse::failure(format!("board_add_template_list failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_list_title(list_id: String, title: String) -> ActionResponse {
    ActionResponse::from_result(
        "board_update_list_title",
        with_core(|core| {
            core.board()
                .update_list_title(&list_id, title)
                .map(|()| "List renamed.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_list(list_id: String) -> ActionResponse {
    ActionResponse::from_result(
        "board_delete_list",
        with_core(|core| {
            core.board()
                .delete_list(&list_id)
                .map(|()| "List deleted.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Adds a task. `due_date_epoch_ms` is milliseconds since the Unix epoch.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(
    list_id: String,
    title: String,
    description: Option<String>,
    due_date_epoch_ms: Option<i64>,
    image_uri: Option<String>,
    tags: Vec<String>,
) -> ActionResponse {
    let due_date = match due_date_epoch_ms.map(epoch_ms_to_utc).transpose() {
        Ok(due_date) => due_date,
        Err(err) => return ActionResponse::failure(format!("board_add_task failed: {err}")),
    };
    let draft = NewTask {
        title,
        description: normalize_optional(description),
        due_date,
        image_uri: normalize_optional(image_uri),
        tags,
    };
    match with_core(|core| {
        core.board()
            .add_task(&list_id, draft)
            .map_err(|err| err.to_string())
    }) {
        Ok(task_id) => ActionResponse::created("Task created.", task_id),
        Err(err) => ActionResponse::failure(format!("board_add_task failed: {err}")),
    }
}

/// Updates title, completion and/or tags; `None` leaves a field untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update_task(
    list_id: String,
    task_id: String,
    title: Option<String>,
    completed: Option<bool>,
    tags: Option<Vec<String>>,
) -> ActionResponse {
    let patch = TaskPatch {
        title,
        completed,
        tags,
        ..TaskPatch::default()
    };
    ActionResponse::from_result(
        "board_update_task",
        with_core(|core| {
            core.board()
                .update_task(&list_id, &task_id, patch)
                .map(|()| "Task updated.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Replaces description, due date and image; `None` (or blank) clears each.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_task_details(
    list_id: String,
    task_id: String,
    description: Option<String>,
    due_date_epoch_ms: Option<i64>,
    image_uri: Option<String>,
) -> ActionResponse {
    let due_date = match due_date_epoch_ms.map(epoch_ms_to_utc).transpose() {
        Ok(due_date) => due_date,
        Err(err) => {
            return ActionResponse::failure(format!("board_set_task_details failed: {err}"))
        }
    };
    let patch = TaskPatch {
        description: Some(normalize_optional(description)),
        due_date: Some(due_date),
        image_uri: Some(normalize_optional(image_uri)),
        ..TaskPatch::default()
    };
    ActionResponse::from_result(
        "board_set_task_details",
        with_core(|core| {
            core.board()
                .update_task(&list_id, &task_id, patch)
                .map(|()| "Task updated.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(list_id: String, task_id: String) -> ActionResponse {
    ActionResponse::from_result(
        "board_delete_task",
        with_core(|core| {
            core.board()
                .delete_task(&list_id, &task_id)
                .map(|()| "Task deleted.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_add_tag(name: String, color: String) -> ActionResponse {
    match with_core(|core| core.board().add_tag(name, color).map_err(|err| err.to_string())) {
        Ok(tag_id) => ActionResponse::created("Tag created.", tag_id),
        Err(err) => ActionResponse::failure(format!("board_add_tag failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_update_tag(
    tag_id: String,
    name: Option<String>,
    color: Option<String>,
) -> ActionResponse {
    ActionResponse::from_result(
        "board_update_tag",
        with_core(|core| {
            core.board()
                .update_tag(&tag_id, TagPatch { name, color })
                .map(|()| "Tag updated.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Deletes a tag and detaches it from every task.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_tag(tag_id: String) -> ActionResponse {
    ActionResponse::from_result(
        "board_delete_tag",
        with_core(|core| {
            core.board()
                .delete_tag(&tag_id)
                .map(|()| "Tag deleted.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Sets the active tag filter; `None` clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn board_set_tag_filter(tag_id: Option<String>) -> ActionResponse {
    ActionResponse::from_result(
        "board_set_tag_filter",
        with_core(|core| {
            core.board()
                .set_tag_filter(tag_id)
                .map(|()| "Filter updated.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Runs the completed-task sweep now.
#[flutter_rust_bridge::frb(sync)]
pub fn board_sweep_expired_tasks() -> ActionResponse {
    ActionResponse::from_result(
        "board_sweep_expired_tasks",
        with_core(|core| {
            let removed = core.board().sweep_expired_tasks();
            Ok(format!("Removed {removed} expired task(s)."))
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_reset_to_default() -> ActionResponse {
    ActionResponse::from_result(
        "board_reset_to_default",
        with_core(|core| {
            core.board().reset_to_default();
            Ok("Board reset.".to_string())
        }),
    )
}

// ---------------------------------------------------------------------------
// Prayers
// ---------------------------------------------------------------------------

/// Every prayer merged with user data, catalog order, as a JSON array.
#[flutter_rust_bridge::frb(sync)]
pub fn prayers_json() -> String {
    read_json("prayers_json", |core| {
        serde_json::to_string(core.prayers().prayers()).map_err(|err| err.to_string())
    })
}

/// Prayers matching the current category/favorites filters as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn prayers_filtered_json() -> String {
    read_json("prayers_filtered_json", |core| {
        serde_json::to_string(&core.prayers().filtered_prayers()).map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn prayer_categories() -> Vec<String> {
    with_core(|core| Ok(core.prayers().categories().to_vec())).unwrap_or_default()
}

/// Sets both prayer list filters at once.
#[flutter_rust_bridge::frb(sync)]
pub fn prayer_set_filters(category: Option<String>, favorites_only: bool) -> ActionResponse {
    ActionResponse::from_result(
        "prayer_set_filters",
        with_core(|core| {
            let prayers = core.prayers_mut();
            prayers.set_selected_category(normalize_optional(category));
            prayers.set_show_favorites_only(favorites_only);
            Ok("Filters updated.".to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn prayer_toggle_favorite(prayer_id: String) -> ActionResponse {
    ActionResponse::from_result(
        "prayer_toggle_favorite",
        with_core(|core| {
            core.prayers_mut()
                .toggle_favorite(&prayer_id)
                .map(|favorite| {
                    if favorite {
                        "Added to favorites.".to_string()
                    } else {
                        "Removed from favorites.".to_string()
                    }
                })
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn prayer_mark_completed(prayer_id: String) -> ActionResponse {
    ActionResponse::from_result(
        "prayer_mark_completed",
        with_core(|core| {
            core.prayers_mut()
                .mark_completed(&prayer_id)
                .map(|()| "Prayer completed.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn prayer_start_timer(prayer_id: String) -> TimerResponse {
    match with_core(|core| {
        core.prayers_mut()
            .start_timer(&prayer_id)
            .map_err(|err| err.to_string())
    }) {
        Ok(timer) => TimerResponse {
            state: "running".to_string(),
            prayer_id: Some(timer.prayer_id),
            time_remaining: timer.time_remaining,
            duration: timer.duration,
            message: "Timer started.".to_string(),
        },
        Err(err) => TimerResponse::idle(format!("prayer_start_timer failed: {err}")),
    }
}

/// Feeds one countdown tick; zero or less completes the running prayer.
#[flutter_rust_bridge::frb(sync)]
pub fn prayer_update_timer(seconds_remaining: i64) -> TimerResponse {
    let outcome = with_core(|core| {
        let prayers = core.prayers_mut();
        let tick = prayers.update_timer(seconds_remaining);
        Ok((tick, prayers.current_timer().cloned()))
    });
    match outcome {
        Ok((TimerTick::Running { time_remaining }, timer)) => TimerResponse {
            state: "running".to_string(),
            prayer_id: timer.as_ref().map(|timer| timer.prayer_id.clone()),
            time_remaining,
            duration: timer.map_or(0, |timer| timer.duration),
            message: String::new(),
        },
        Ok((TimerTick::Completed { prayer_id }, _)) => TimerResponse {
            state: "completed".to_string(),
            prayer_id: Some(prayer_id),
            time_remaining: 0,
            duration: 0,
            message: "Prayer completed.".to_string(),
        },
        Ok((TimerTick::Idle, _)) => TimerResponse::idle("No timer running."),
        Err(err) => TimerResponse::idle(format!("prayer_update_timer failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn prayer_cancel_timer() -> TimerResponse {
    match with_core(|core| {
        core.prayers_mut().cancel_timer();
        Ok(())
    }) {
        Ok(()) => TimerResponse::idle("Timer cancelled."),
        Err(err) => TimerResponse::idle(format!("prayer_cancel_timer failed: {err}")),
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView<'a> {
    #[serde(flatten)]
    profile: &'a rotina_core::UserProfile,
    active_theme_colors: rotina_core::ThemeColors,
}

/// Profile with the derived `activeThemeColors` as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_json() -> String {
    read_json("profile_json", |core| {
        let store = core.profile();
        let view = ProfileView {
            profile: store.profile(),
            active_theme_colors: store.active_theme_colors(),
        };
        serde_json::to_string(&view).map_err(|err| err.to_string())
    })
}

#[derive(Serialize)]
struct PresetView {
    preset: &'static str,
    colors: rotina_core::ThemeColors,
}

/// Built-in palettes in display order as a JSON array of
/// `{ "preset": ..., "colors": {...} }`.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_presets_json() -> String {
    read_json("theme_presets_json", |core| {
        let presets = core
            .profile()
            .theme_presets()
            .into_iter()
            .map(|(preset, colors)| PresetView {
                preset: preset.as_str(),
                colors,
            })
            .collect::<Vec<_>>();
        serde_json::to_string(&presets).map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn profile_update_name(name: String) -> ActionResponse {
    ActionResponse::from_result(
        "profile_update_name",
        with_core(|core| {
            core.profile_mut()
                .update_name(name)
                .map(|()| "Name updated.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Stores the photo reference; `None` or blank removes the photo.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_update_photo(photo_uri: Option<String>) -> ActionResponse {
    ActionResponse::from_result(
        "profile_update_photo",
        with_core(|core| {
            core.profile_mut()
                .update_photo(normalize_optional(photo_uri));
            Ok("Photo updated.".to_string())
        }),
    )
}

/// Switches the theme preset (`default|blue|green|purple|custom`).
#[flutter_rust_bridge::frb(sync)]
pub fn profile_change_theme_preset(preset: String) -> ActionResponse {
    let Some(parsed) = ThemePreset::parse(&preset) else {
        return ActionResponse::failure(format!(
            "profile_change_theme_preset failed: unknown preset `{preset}`"
        ));
    };
    ActionResponse::from_result(
        "profile_change_theme_preset",
        with_core(|core| {
            core.profile_mut().change_theme_preset(parsed);
            Ok(format!("Theme set to {}.", parsed.as_str()))
        }),
    )
}

/// Merges a camelCase JSON object of colors into the custom palette.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_update_custom_colors(colors_json: String) -> ActionResponse {
    let patch: ThemeColorsPatch = match serde_json::from_str(&colors_json) {
        Ok(patch) => patch,
        Err(err) => {
            return ActionResponse::failure(format!(
                "profile_update_custom_colors failed: invalid colors JSON: {err}"
            ))
        }
    };
    ActionResponse::from_result(
        "profile_update_custom_colors",
        with_core(|core| {
            core.profile_mut()
                .update_custom_colors(&patch)
                .map(|()| "Custom colors updated.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn profile_reset_theme() -> ActionResponse {
    ActionResponse::from_result(
        "profile_reset_theme",
        with_core(|core| {
            core.profile_mut().reset_theme();
            Ok("Theme reset.".to_string())
        }),
    )
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// `true` exactly once per installation; `false` when storage is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn is_first_run() -> bool {
    with_core(|core| Ok(core.settings().is_first_run())).unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn sound_settings() -> SoundSettingsResponse {
    let settings = with_core(|core| Ok(core.settings().sound_settings())).unwrap_or_default();
    SoundSettingsResponse {
        enabled: settings.enabled,
        volume: settings.volume,
    }
}

/// Merges the given fields; volume is clamped to `[0, 1]`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_sound_settings(enabled: Option<bool>, volume: Option<f32>) -> SoundSettingsResponse {
    let patch = SoundSettingsPatch { enabled, volume };
    let settings =
        with_core(|core| Ok(core.settings().update_sound_settings(patch))).unwrap_or_default();
    SoundSettingsResponse {
        enabled: settings.enabled,
        volume: settings.volume,
    }
}

/// Wipes every stored key and reloads all data sets from defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn reset_all_data() -> ActionResponse {
    ActionResponse::from_result(
        "reset_all_data",
        with_core(|core| {
            core.reset_all_data()
                .map(|()| "All data reset.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

/// Blocks until pending writes reached storage; call before app suspension.
#[flutter_rust_bridge::frb(sync)]
pub fn flush() -> ActionResponse {
    ActionResponse::from_result(
        "flush",
        with_core(|core| {
            core.flush()
                .map(|()| "Flushed.".to_string())
                .map_err(|err| err.to_string())
        }),
    )
}

fn ensure_core(db_path: Option<PathBuf>) -> Result<&'static Mutex<RotinaCore>, String> {
    if let Some(core) = CORE.get() {
        return Ok(core);
    }

    let mut config = CoreConfig::from_env();
    if let Some(path) = db_path {
        config.db_path = Some(path);
    }
    if config.db_path.is_none() {
        config.db_path = Some(std::env::temp_dir().join(CORE_DB_FILE_NAME));
    }
    // Explicit `init_logging` calls take precedence over ROTINA_LOG_DIR.
    if logging_status().is_none() {
        if let Err(err) = config.init_logging() {
            eprintln!("rotina_ffi logging disabled: {err}");
        }
    }

    let core = RotinaCore::open(&config).map_err(|err| {
        error!("event=core_init module=ffi status=error error={}", err);
        format!("core open failed: {err}")
    })?;
    if CORE.set(Mutex::new(core)).is_ok() {
        info!("event=core_init module=ffi status=ok");
    }
    CORE.get()
        .ok_or_else(|| "core open failed: instance unavailable".to_string())
}

fn lock_core() -> Result<MutexGuard<'static, RotinaCore>, String> {
    let core = ensure_core(None)?;
    Ok(core
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()))
}

fn with_core<T>(f: impl FnOnce(&mut RotinaCore) -> Result<T, String>) -> Result<T, String> {
    let mut guard = lock_core()?;
    f(&mut guard)
}

fn read_json(op: &str, f: impl FnOnce(&mut RotinaCore) -> Result<String, String>) -> String {
    with_core(f).unwrap_or_else(|err| {
        error!("event=ffi_read module=ffi status=error op={} error={}", op, err);
        String::new()
    })
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn epoch_ms_to_utc(epoch_ms: i64) -> Result<DateTime<Utc>, String> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .ok_or_else(|| format!("due date out of range: {epoch_ms}"))
}
