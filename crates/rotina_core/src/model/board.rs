//! Board, list, task and tag records.
//!
//! # Invariants
//! - `Task::completed_at` is set iff `Task::completed` is true (for tasks
//!   touched by this crate; legacy tasks may be completed without a stamp).
//! - A task belongs to exactly one list.
//! - Task tag ids are unique within a task.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("valid hex color regex")
});

/// How long a completed task survives before the sweep removes it.
pub const COMPLETED_TASK_RETENTION_HOURS: i64 = 24;

pub type TagId = String;
pub type ListId = String;
pub type TaskId = String;

/// User-defined colored label shared by many tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// `#RGB` or `#RRGGBB`.
    pub color: String,
}

/// One actionable item inside a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Stamped by the store on the false -> true transition of `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<TagId>,
}

impl Task {
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|id| id == tag_id)
    }

    /// Returns whether the task was completed at least 24h before `now`.
    ///
    /// Completed tasks without a `completed_at` stamp never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match (self.completed, self.completed_at) {
            (true, Some(completed_at)) => {
                now - completed_at >= Duration::hours(COMPLETED_TASK_RETENTION_HOURS)
            }
            _ => false,
        }
    }
}

/// Named, ordered group of tasks ("column").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: ListId,
    pub title: String,
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }
}

/// The single top-level board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardData {
    pub title: String,
    pub description: String,
    pub lists: Vec<TaskList>,
    pub tags: Vec<Tag>,
    pub active_filter: Option<TagId>,
}

impl BoardData {
    pub fn list(&self, list_id: &str) -> Option<&TaskList> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    pub fn tag(&self, tag_id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == tag_id)
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag(tag_id).is_some()
    }

    /// Lists with tasks narrowed to the active filter, order preserved.
    ///
    /// Without an active filter every list is returned unchanged.
    pub fn filtered_lists(&self) -> Vec<TaskList> {
        let Some(filter) = self.active_filter.as_deref() else {
            return self.lists.clone();
        };

        self.lists
            .iter()
            .map(|list| TaskList {
                id: list.id.clone(),
                title: list.title.clone(),
                tasks: list
                    .tasks
                    .iter()
                    .filter(|task| task.has_tag(filter))
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Returns a copy without tasks that expired before `now`, plus the
    /// number of removed tasks.
    pub fn without_expired_tasks(&self, now: DateTime<Utc>) -> (BoardData, usize) {
        let mut removed = 0;
        let lists = self
            .lists
            .iter()
            .map(|list| {
                let tasks = list
                    .tasks
                    .iter()
                    .filter(|task| {
                        let expired = task.is_expired(now);
                        if expired {
                            removed += 1;
                        }
                        !expired
                    })
                    .cloned()
                    .collect();
                TaskList {
                    id: list.id.clone(),
                    title: list.title.clone(),
                    tasks,
                }
            })
            .collect();

        (
            BoardData {
                lists,
                ..self.clone()
            },
            removed,
        )
    }

    /// Total number of tasks across all lists.
    pub fn task_count(&self) -> usize {
        self.lists.iter().map(|list| list.tasks.len()).sum()
    }
}

/// Input for creating a task; the store assigns id and completion fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub image_uri: Option<String>,
    pub tags: Vec<TagId>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<TagId>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partial task update. Outer `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub completed: Option<bool>,
    pub image_uri: Option<Option<String>>,
    pub tags: Option<Vec<TagId>>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

/// Partial tag update; the id is immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Returns whether `value` is a `#RGB` or `#RRGGBB` color.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

/// Collapses duplicate tag ids, keeping the first occurrence.
pub fn dedup_tag_ids(tags: Vec<TagId>) -> Vec<TagId> {
    let mut unique: Vec<TagId> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}
