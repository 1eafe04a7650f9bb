//! Board store: owns the in-memory board snapshot and its persistence.
//!
//! # Responsibility
//! - Apply CRUD mutations as functional updates of `BoardData`.
//! - Persist the full snapshot after every mutation (write-behind).
//! - Serve derived views (tag filter, per-list tasks, tag lookup).
//! - Remove tasks completed 24h or more ago.
//!
//! # Invariants
//! - Every mutation replaces the snapshot before persistence is scheduled;
//!   a failed write never rolls the snapshot back.
//! - `completed_at` is stamped exactly on a false -> true completion and
//!   cleared when a task is reopened.
//! - Task tag lists only reference tags in the global tag set.
//! - Deleting a tag removes it from every task and clears it as filter.

use crate::clock::Clock;
use crate::model::board::{
    dedup_tag_ids, is_hex_color, BoardData, ListId, NewTask, Tag, TagId, TagPatch, Task,
    TaskId, TaskList, TaskPatch,
};
use crate::model::defaults::default_board;
use crate::model::new_id;
use crate::repo::schemas::BOARD_SCHEMA;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::storage::{PersistQueue, StorageResult};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type BoardResult<T> = Result<T, BoardError>;

/// Rejections raised before a board mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// List or task title is blank after trim.
    BlankTitle,
    /// Tag name is blank after trim.
    BlankTagName,
    /// Tag color is not `#RGB`/`#RRGGBB`.
    InvalidColor(String),
    /// Referenced tag id is not in the global tag set.
    UnknownTag(TagId),
    ListNotFound(ListId),
    TaskNotFound { list_id: ListId, task_id: TaskId },
    TagNotFound(TagId),
}

impl BoardError {
    /// Whether the failure is an input validation problem (vs. missing target).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::BlankTitle | Self::BlankTagName | Self::InvalidColor(_) | Self::UnknownTag(_)
        )
    }
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::BlankTagName => write!(f, "tag name must not be blank"),
            Self::InvalidColor(color) => write!(f, "invalid tag color: `{color}`"),
            Self::UnknownTag(id) => write!(f, "unknown tag id: {id}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::TaskNotFound { list_id, task_id } => {
                write!(f, "task not found: {task_id} in list {list_id}")
            }
            Self::TagNotFound(id) => write!(f, "tag not found: {id}"),
        }
    }
}

impl Error for BoardError {}

/// Single-writer owner of the board snapshot.
pub struct BoardStore {
    repo: SnapshotRepository<BoardData>,
    clock: Arc<dyn Clock>,
    board: Arc<BoardData>,
    is_loading: bool,
}

impl BoardStore {
    /// Creates an unloaded store holding the built-in default board.
    pub fn new(queue: PersistQueue, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo: SnapshotRepository::new(&BOARD_SCHEMA, queue),
            clock,
            board: Arc::new(default_board()),
            is_loading: true,
        }
    }

    /// Creates the store and loads the persisted board.
    pub fn open(queue: PersistQueue, clock: Arc<dyn Clock>) -> Self {
        let mut store = Self::new(queue, clock);
        store.load();
        store
    }

    /// Loads the persisted board, then runs one expiry sweep.
    ///
    /// Absent or unreadable data falls back to the default board. Migrated
    /// legacy data is written back immediately.
    pub fn load(&mut self) {
        match self.repo.load() {
            Ok(Some(loaded)) => {
                self.board = Arc::new(loaded.data);
                if let Some(from_version) = loaded.migrated_from {
                    info!(
                        "event=board_load module=board status=migrated from_version={} to_version={}",
                        from_version,
                        BOARD_SCHEMA.latest_version()
                    );
                    self.persist();
                } else {
                    info!("event=board_load module=board status=ok source=storage");
                }
            }
            Ok(None) => {
                self.board = Arc::new(default_board());
                info!("event=board_load module=board status=ok source=default");
            }
            Err(err) => {
                self.board = Arc::new(default_board());
                error!(
                    "event=board_load module=board status=error fallback=default error={}",
                    err
                );
            }
        }
        self.is_loading = false;
        self.sweep_expired_tasks();
    }

    /// `true` until the first `load` finished.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Current immutable snapshot.
    pub fn snapshot(&self) -> Arc<BoardData> {
        Arc::clone(&self.board)
    }

    pub fn board(&self) -> &BoardData {
        &self.board
    }

    /// Blocks until every scheduled board write reached storage.
    pub fn flush(&self) -> StorageResult<()> {
        self.repo.flush()
    }

    pub fn update_board_info(&mut self, title: impl Into<String>, description: impl Into<String>) {
        let mut next = self.next();
        next.title = title.into();
        next.description = description.into();
        self.commit(next, "update_board_info");
    }

    /// Appends an empty list and returns its id.
    pub fn add_list(&mut self, title: impl Into<String>) -> BoardResult<ListId> {
        let title = require_title(title.into())?;
        let list_id = new_id();
        let mut next = self.next();
        next.lists.push(TaskList {
            id: list_id.clone(),
            title,
            tasks: Vec::new(),
        });
        self.commit(next, "add_list");
        Ok(list_id)
    }

    /// Appends a list pre-filled with `tasks` as one snapshot and one write.
    ///
    /// Either the whole list is inserted or nothing is.
    pub fn add_template_list(
        &mut self,
        title: impl Into<String>,
        tasks: Vec<NewTask>,
    ) -> BoardResult<(ListId, Vec<TaskId>)> {
        let title = require_title(title.into())?;
        let built = tasks
            .into_iter()
            .map(|draft| self.build_task(draft))
            .collect::<BoardResult<Vec<_>>>()?;
        let task_ids = built.iter().map(|task| task.id.clone()).collect();

        let list_id = new_id();
        let mut next = self.next();
        next.lists.push(TaskList {
            id: list_id.clone(),
            title,
            tasks: built,
        });
        self.commit(next, "add_template_list");
        Ok((list_id, task_ids))
    }

    pub fn update_list_title(
        &mut self,
        list_id: &str,
        title: impl Into<String>,
    ) -> BoardResult<()> {
        let title = require_title(title.into())?;
        let mut next = self.next();
        list_mut(&mut next, list_id)?.title = title;
        self.commit(next, "update_list_title");
        Ok(())
    }

    /// Deletes a list together with all of its tasks.
    pub fn delete_list(&mut self, list_id: &str) -> BoardResult<()> {
        let mut next = self.next();
        let before = next.lists.len();
        next.lists.retain(|list| list.id != list_id);
        if next.lists.len() == before {
            return Err(BoardError::ListNotFound(list_id.to_string()));
        }
        self.commit(next, "delete_list");
        Ok(())
    }

    /// Appends a new, uncompleted task to `list_id` and returns its id.
    pub fn add_task(&mut self, list_id: &str, draft: NewTask) -> BoardResult<TaskId> {
        let task = self.build_task(draft)?;
        let task_id = task.id.clone();
        let mut next = self.next();
        list_mut(&mut next, list_id)?.tasks.push(task);
        self.commit(next, "add_task");
        Ok(task_id)
    }

    /// Applies a partial update; completion transitions manage `completed_at`.
    pub fn update_task(
        &mut self,
        list_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> BoardResult<()> {
        let TaskPatch {
            title,
            description,
            due_date,
            completed,
            image_uri,
            tags,
        } = patch;
        let title = title.map(require_title).transpose()?;
        let tags = tags.map(|tags| self.validated_tags(tags)).transpose()?;
        let now = self.clock.now();

        let mut next = self.next();
        let task = task_mut(&mut next, list_id, task_id)?;
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        if let Some(image_uri) = image_uri {
            task.image_uri = image_uri;
        }
        if let Some(tags) = tags {
            task.tags = tags;
        }
        if let Some(completed) = completed {
            if completed && !task.completed {
                task.completed_at = Some(now);
            } else if !completed {
                task.completed_at = None;
            }
            task.completed = completed;
        }
        self.commit(next, "update_task");
        Ok(())
    }

    /// Replaces the whole tag list of one task.
    pub fn update_task_tags(
        &mut self,
        list_id: &str,
        task_id: &str,
        tags: Vec<TagId>,
    ) -> BoardResult<()> {
        let tags = self.validated_tags(tags)?;
        let mut next = self.next();
        task_mut(&mut next, list_id, task_id)?.tags = tags;
        self.commit(next, "update_task_tags");
        Ok(())
    }

    pub fn delete_task(&mut self, list_id: &str, task_id: &str) -> BoardResult<()> {
        require_task(&self.board, list_id, task_id)?;
        let mut next = self.next();
        list_mut(&mut next, list_id)?
            .tasks
            .retain(|task| task.id != task_id);
        self.commit(next, "delete_task");
        Ok(())
    }

    /// Adds a global tag and returns its id.
    pub fn add_tag(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> BoardResult<TagId> {
        let name = require_tag_name(name.into())?;
        let color = require_color(color.into())?;
        let tag_id = new_id();
        let mut next = self.next();
        next.tags.push(Tag {
            id: tag_id.clone(),
            name,
            color,
        });
        self.commit(next, "add_tag");
        Ok(tag_id)
    }

    pub fn update_tag(&mut self, tag_id: &str, patch: TagPatch) -> BoardResult<()> {
        let name = patch.name.map(require_tag_name).transpose()?;
        let color = patch.color.map(require_color).transpose()?;
        let mut next = self.next();
        let tag = next
            .tags
            .iter_mut()
            .find(|tag| tag.id == tag_id)
            .ok_or_else(|| BoardError::TagNotFound(tag_id.to_string()))?;
        if let Some(name) = name {
            tag.name = name;
        }
        if let Some(color) = color {
            tag.color = color;
        }
        self.commit(next, "update_tag");
        Ok(())
    }

    /// Deletes a tag, detaching it from every task and from the filter.
    pub fn delete_tag(&mut self, tag_id: &str) -> BoardResult<()> {
        let mut next = self.next();
        let before = next.tags.len();
        next.tags.retain(|tag| tag.id != tag_id);
        if next.tags.len() == before {
            return Err(BoardError::TagNotFound(tag_id.to_string()));
        }
        for task in next.lists.iter_mut().flat_map(|list| list.tasks.iter_mut()) {
            task.tags.retain(|id| id != tag_id);
        }
        if next.active_filter.as_deref() == Some(tag_id) {
            next.active_filter = None;
        }
        self.commit(next, "delete_tag");
        Ok(())
    }

    /// Sets or clears (`None`) the active tag filter.
    pub fn set_tag_filter(&mut self, tag_id: Option<TagId>) -> BoardResult<()> {
        if let Some(id) = tag_id.as_deref() {
            if !self.board.has_tag(id) {
                return Err(BoardError::UnknownTag(id.to_string()));
            }
        }
        let mut next = self.next();
        next.active_filter = tag_id;
        self.commit(next, "set_tag_filter");
        Ok(())
    }

    /// All lists, tasks narrowed to the active filter when one is set.
    pub fn filtered_lists(&self) -> Vec<TaskList> {
        self.board.filtered_lists()
    }

    /// Tasks of one list (unfiltered); empty when the list does not exist.
    pub fn tasks_for_list(&self, list_id: &str) -> Vec<Task> {
        self.board
            .list(list_id)
            .map(|list| list.tasks.clone())
            .unwrap_or_default()
    }

    pub fn tag_by_id(&self, tag_id: &str) -> Option<Tag> {
        self.board.tag(tag_id).cloned()
    }

    /// Removes tasks completed 24h or more ago and returns how many went away.
    ///
    /// Persists only when the board actually changed.
    pub fn sweep_expired_tasks(&mut self) -> usize {
        let (next, removed) = self.board.without_expired_tasks(self.clock.now());
        if next == *self.board {
            debug!("event=board_sweep module=board status=noop");
            return 0;
        }
        info!(
            "event=board_sweep module=board status=ok removed_tasks={}",
            removed
        );
        self.commit(next, "sweep");
        removed
    }

    /// Replaces the board with the built-in default board.
    pub fn reset_to_default(&mut self) {
        self.commit(default_board(), "reset_to_default");
    }

    fn next(&self) -> BoardData {
        BoardData::clone(&self.board)
    }

    fn commit(&mut self, next: BoardData, op: &'static str) {
        self.board = Arc::new(next);
        debug!(
            "event=board_mutation module=board status=ok op={} lists={} tasks={} tags={}",
            op,
            self.board.lists.len(),
            self.board.task_count(),
            self.board.tags.len()
        );
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.repo.save(&self.board) {
            warn!(
                "event=board_persist module=board status=error error={}",
                err
            );
        }
    }

    fn build_task(&self, draft: NewTask) -> BoardResult<Task> {
        let NewTask {
            title,
            description,
            due_date,
            image_uri,
            tags,
        } = draft;
        Ok(Task {
            id: new_id(),
            title: require_title(title)?,
            description,
            due_date,
            completed: false,
            image_uri,
            completed_at: None,
            tags: self.validated_tags(tags)?,
        })
    }

    fn validated_tags(&self, tags: Vec<TagId>) -> BoardResult<Vec<TagId>> {
        if let Some(unknown) = tags.iter().find(|id| !self.board.has_tag(id)) {
            return Err(BoardError::UnknownTag(unknown.clone()));
        }
        Ok(dedup_tag_ids(tags))
    }
}

fn require_title(title: String) -> BoardResult<String> {
    if title.trim().is_empty() {
        return Err(BoardError::BlankTitle);
    }
    Ok(title)
}

fn require_tag_name(name: String) -> BoardResult<String> {
    if name.trim().is_empty() {
        return Err(BoardError::BlankTagName);
    }
    Ok(name)
}

fn require_color(color: String) -> BoardResult<String> {
    let trimmed = color.trim();
    if !is_hex_color(trimmed) {
        return Err(BoardError::InvalidColor(color));
    }
    Ok(trimmed.to_string())
}

fn list_mut<'a>(board: &'a mut BoardData, list_id: &str) -> BoardResult<&'a mut TaskList> {
    board
        .lists
        .iter_mut()
        .find(|list| list.id == list_id)
        .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))
}

fn require_task<'a>(board: &'a BoardData, list_id: &str, task_id: &str) -> BoardResult<&'a Task> {
    board
        .list(list_id)
        .ok_or_else(|| BoardError::ListNotFound(list_id.to_string()))?
        .task(task_id)
        .ok_or_else(|| BoardError::TaskNotFound {
            list_id: list_id.to_string(),
            task_id: task_id.to_string(),
        })
}

fn task_mut<'a>(
    board: &'a mut BoardData,
    list_id: &str,
    task_id: &str,
) -> BoardResult<&'a mut Task> {
    list_mut(board, list_id)?
        .tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| BoardError::TaskNotFound {
            list_id: list_id.to_string(),
            task_id: task_id.to_string(),
        })
}
