use chrono::{Duration, TimeZone, Utc};
use rotina_core::model::defaults::default_board;
use rotina_core::storage::BOARD_DATA_KEY;
use rotina_core::{
    BoardData, BoardError, BoardStore, Clock, KvStore, ManualClock, MemoryKvStore, NewTask,
    PersistQueue, TagPatch, TaskPatch,
};
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    inspector: MemoryKvStore,
    queue: PersistQueue,
    clock: Arc<ManualClock>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(MemoryKvStore::new())
    }

    fn with_store(inspector: MemoryKvStore) -> Self {
        let queue = PersistQueue::spawn(inspector.clone()).unwrap();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap(),
        ));
        Self {
            inspector,
            queue,
            clock,
        }
    }

    fn open(&self) -> BoardStore {
        let clock: Arc<dyn Clock> = self.clock.clone();
        BoardStore::open(self.queue.clone(), clock)
    }

    fn stored_blob(&self) -> Value {
        self.queue.flush().unwrap();
        let raw = self.inspector.get(BOARD_DATA_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn reloaded(&self) -> BoardData {
        self.queue.flush().unwrap();
        self.open().board().clone()
    }
}

fn empty_board(store: &mut BoardStore) {
    for list in store.board().lists.clone() {
        store.delete_list(&list.id).unwrap();
    }
}

#[test]
fn fresh_install_uses_default_board_without_writing() {
    let harness = Harness::new();
    let store = harness.open();

    assert!(!store.is_loading());
    assert_eq!(store.board().title, "Rotina de Autoamor");
    assert_eq!(store.board().lists.len(), 6);
    assert!(store.board().active_filter.is_none());
    harness.queue.flush().unwrap();
    assert_eq!(harness.inspector.set_count(), 0);
}

#[test]
fn unloaded_store_reports_loading() {
    let harness = Harness::new();
    let clock: Arc<dyn Clock> = harness.clock.clone();
    let mut store = BoardStore::new(harness.queue.clone(), clock);
    assert!(store.is_loading());
    store.load();
    assert!(!store.is_loading());
}

#[test]
fn add_list_add_task_complete_and_reload_scenario() {
    let harness = Harness::new();
    let mut store = harness.open();

    let list_id = store.add_list("Manhã").unwrap();
    let task_id = store
        .add_task(&list_id, NewTask::titled("Beber água"))
        .unwrap();

    let task = store.board().list(&list_id).unwrap().task(&task_id).unwrap().clone();
    assert!(task.tags.is_empty());
    assert!(!task.completed);
    assert!(task.completed_at.is_none());

    store
        .update_task(&list_id, &task_id, TaskPatch::completed(true))
        .unwrap();
    let completed = store.board().list(&list_id).unwrap().task(&task_id).unwrap().clone();
    assert!(completed.completed);
    assert_eq!(completed.completed_at, Some(harness.clock.now()));

    let reloaded = harness.reloaded();
    assert_eq!(&reloaded, store.board());
    let persisted = reloaded.list(&list_id).unwrap().task(&task_id).unwrap();
    assert!(persisted.completed);
}

#[test]
fn persisted_blob_is_versioned_envelope() {
    let harness = Harness::new();
    let mut store = harness.open();
    store.update_board_info("Minha rotina", "descrição");

    let blob = harness.stored_blob();
    assert_eq!(blob["schemaVersion"], json!(1));
    assert_eq!(blob["data"]["title"], json!("Minha rotina"));
    assert!(blob["data"]["activeFilter"].is_null());
}

#[test]
fn every_mutation_round_trips_through_storage() {
    let harness = Harness::new();
    let mut store = harness.open();

    let tag_id = store.add_tag("Urgente", "#FF0000").unwrap();
    let list_id = store.add_list("Semana").unwrap();
    assert_eq!(harness.reloaded(), *store.board());

    let task_id = store
        .add_task(
            &list_id,
            NewTask {
                title: "Planejar".to_string(),
                description: Some("domingo".to_string()),
                due_date: Some(Utc.with_ymd_and_hms(2026, 5, 10, 18, 0, 0).unwrap()),
                image_uri: Some("file:///img.png".to_string()),
                tags: vec![tag_id.clone()],
            },
        )
        .unwrap();
    assert_eq!(harness.reloaded(), *store.board());

    store.set_tag_filter(Some(tag_id.clone())).unwrap();
    store.update_list_title(&list_id, "Semana 2").unwrap();
    store
        .update_tag(
            &tag_id,
            TagPatch {
                color: Some("#00F".to_string()),
                ..TagPatch::default()
            },
        )
        .unwrap();
    assert_eq!(harness.reloaded(), *store.board());

    store.delete_task(&list_id, &task_id).unwrap();
    store.delete_list(&list_id).unwrap();
    assert_eq!(harness.reloaded(), *store.board());
}

#[test]
fn deleting_unknown_task_leaves_board_untouched() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let task_id = store.add_task(&list_id, NewTask::titled("T")).unwrap();
    harness.queue.flush().unwrap();
    let writes = harness.inspector.set_count();
    let before = store.board().clone();

    assert_eq!(
        store.delete_task(&list_id, "missing"),
        Err(BoardError::TaskNotFound {
            list_id: list_id.clone(),
            task_id: "missing".to_string(),
        })
    );
    assert_eq!(
        store.delete_task("nope", &task_id),
        Err(BoardError::ListNotFound("nope".to_string()))
    );

    assert_eq!(*store.board(), before);
    harness.queue.flush().unwrap();
    assert_eq!(harness.inspector.set_count(), writes);
    assert!(store.board().list(&list_id).unwrap().task(&task_id).is_some());
}

#[test]
fn reopening_a_task_clears_completed_at() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let task_id = store.add_task(&list_id, NewTask::titled("T")).unwrap();

    store
        .update_task(&list_id, &task_id, TaskPatch::completed(true))
        .unwrap();
    store
        .update_task(&list_id, &task_id, TaskPatch::completed(false))
        .unwrap();

    let task = store.board().list(&list_id).unwrap().task(&task_id).unwrap();
    assert!(!task.completed);
    assert!(task.completed_at.is_none());
}

#[test]
fn completed_at_is_stamped_only_on_transition() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let task_id = store.add_task(&list_id, NewTask::titled("T")).unwrap();

    store
        .update_task(&list_id, &task_id, TaskPatch::completed(true))
        .unwrap();
    let first_stamp = harness.clock.now();

    harness.clock.advance(Duration::hours(2));
    store
        .update_task(&list_id, &task_id, TaskPatch::completed(true))
        .unwrap();
    store
        .update_task(
            &list_id,
            &task_id,
            TaskPatch {
                title: Some("T renamed".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let task = store.board().list(&list_id).unwrap().task(&task_id).unwrap();
    assert_eq!(task.completed_at, Some(first_stamp));
    assert_eq!(task.title, "T renamed");
}

#[test]
fn task_patch_can_clear_optional_fields() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let task_id = store
        .add_task(
            &list_id,
            NewTask {
                description: Some("d".to_string()),
                image_uri: Some("uri".to_string()),
                ..NewTask::titled("T")
            },
        )
        .unwrap();

    store
        .update_task(
            &list_id,
            &task_id,
            TaskPatch {
                description: Some(None),
                image_uri: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let task = store.board().list(&list_id).unwrap().task(&task_id).unwrap();
    assert_eq!(task.description, None);
    assert_eq!(task.image_uri, None);
}

#[test]
fn delete_tag_cascades_across_lists_and_clears_filter() {
    let harness = Harness::new();
    let mut store = harness.open();
    let urgent = store.add_tag("Urgente", "#FF0000").unwrap();
    let keep = store.add_tag("Casa", "#00FF00").unwrap();
    let first = store.add_list("A").unwrap();
    let second = store.add_list("B").unwrap();
    let a_task = store
        .add_task(&first, NewTask::titled("a").with_tags(vec![urgent.clone(), keep.clone()]))
        .unwrap();
    let b_task = store
        .add_task(&second, NewTask::titled("b").with_tags(vec![urgent.clone()]))
        .unwrap();
    store.set_tag_filter(Some(urgent.clone())).unwrap();

    store.delete_tag(&urgent).unwrap();

    let board = store.board();
    assert_eq!(
        board.list(&first).unwrap().task(&a_task).unwrap().tags,
        vec![keep.clone()]
    );
    assert!(board.list(&second).unwrap().task(&b_task).unwrap().tags.is_empty());
    assert!(board.active_filter.is_none());
    assert!(store.tag_by_id(&urgent).is_none());
    assert!(store.tag_by_id(&keep).is_some());
}

#[test]
fn delete_tag_scenario_leaves_task_without_tags() {
    let harness = Harness::new();
    let mut store = harness.open();
    let tag_id = store.add_tag("Urgente", "#FF0000").unwrap();
    let list_id = store.add_list("Hoje").unwrap();
    let task_id = store
        .add_task(&list_id, NewTask::titled("Ligar").with_tags(vec![tag_id.clone()]))
        .unwrap();

    store.delete_tag(&tag_id).unwrap();

    assert!(store.tasks_for_list(&list_id)[0].tags.is_empty());
    assert_eq!(store.tasks_for_list(&list_id)[0].id, task_id);
    assert!(store.tag_by_id(&tag_id).is_none());
}

#[test]
fn filtered_lists_preserve_order_and_narrow_by_active_tag() {
    let harness = Harness::new();
    let mut store = harness.open();
    empty_board(&mut store);
    let x = store.add_tag("X", "#111111").unwrap();
    let first = store.add_list("one").unwrap();
    let second = store.add_list("two").unwrap();
    let t1 = store.add_task(&first, NewTask::titled("1").with_tags(vec![x.clone()])).unwrap();
    store.add_task(&first, NewTask::titled("2")).unwrap();
    let t3 = store.add_task(&first, NewTask::titled("3").with_tags(vec![x.clone()])).unwrap();
    store.add_task(&second, NewTask::titled("4")).unwrap();

    let unfiltered = store.filtered_lists();
    assert_eq!(unfiltered, store.board().lists);

    store.set_tag_filter(Some(x.clone())).unwrap();
    let filtered = store.filtered_lists();
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered[0].id, first);
    assert_eq!(
        filtered[0].tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
        vec![t1, t3]
    );
    assert_eq!(filtered[1].id, second);
    assert!(filtered[1].tasks.is_empty());
    assert_eq!(store.tasks_for_list(&first).len(), 3);

    store.set_tag_filter(None).unwrap();
    assert_eq!(store.filtered_lists(), store.board().lists);
}

#[test]
fn sweep_removes_tasks_completed_24h_ago_and_is_idempotent() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let old = store.add_task(&list_id, NewTask::titled("old")).unwrap();
    let recent = store.add_task(&list_id, NewTask::titled("recent")).unwrap();
    let open = store.add_task(&list_id, NewTask::titled("open")).unwrap();

    store.update_task(&list_id, &old, TaskPatch::completed(true)).unwrap();
    harness.clock.advance(Duration::hours(12));
    store.update_task(&list_id, &recent, TaskPatch::completed(true)).unwrap();
    harness.clock.advance(Duration::hours(12));

    assert_eq!(store.sweep_expired_tasks(), 1);
    let remaining = store
        .tasks_for_list(&list_id)
        .into_iter()
        .map(|t| t.id)
        .collect::<Vec<_>>();
    assert_eq!(remaining, vec![recent, open]);

    harness.queue.flush().unwrap();
    let writes = harness.inspector.set_count();
    assert_eq!(store.sweep_expired_tasks(), 0);
    harness.queue.flush().unwrap();
    assert_eq!(harness.inspector.set_count(), writes);
}

#[test]
fn load_sweeps_expired_tasks_and_persists_once() {
    let harness = Harness::new();
    {
        let mut store = harness.open();
        let list_id = store.add_list("L").unwrap();
        let task_id = store.add_task(&list_id, NewTask::titled("done")).unwrap();
        store
            .update_task(&list_id, &task_id, TaskPatch::completed(true))
            .unwrap();
    }
    harness.queue.flush().unwrap();
    let writes_before = harness.inspector.set_count();

    harness.clock.advance(Duration::hours(30));
    let store = harness.open();
    assert_eq!(store.board().task_count(), default_board().task_count());
    harness.queue.flush().unwrap();
    assert_eq!(harness.inspector.set_count(), writes_before + 1);
}

#[test]
fn validation_rejects_blank_titles_and_bad_colors_without_writing() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    harness.queue.flush().unwrap();
    let writes = harness.inspector.set_count();
    let before = store.board().clone();

    assert_eq!(store.add_list("   ").unwrap_err(), BoardError::BlankTitle);
    assert_eq!(
        store.add_task(&list_id, NewTask::titled("")).unwrap_err(),
        BoardError::BlankTitle
    );
    assert_eq!(store.add_tag(" ", "#FFF").unwrap_err(), BoardError::BlankTagName);
    assert!(matches!(
        store.add_tag("x", "red").unwrap_err(),
        BoardError::InvalidColor(_)
    ));
    assert!(store.add_list("").unwrap_err().is_validation());

    assert_eq!(*store.board(), before);
    harness.queue.flush().unwrap();
    assert_eq!(harness.inspector.set_count(), writes);
}

#[test]
fn unknown_tag_ids_are_rejected_on_insert_and_filter() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();

    let err = store
        .add_task(&list_id, NewTask::titled("t").with_tags(vec!["ghost".to_string()]))
        .unwrap_err();
    assert_eq!(err, BoardError::UnknownTag("ghost".to_string()));
    assert!(store.tasks_for_list(&list_id).is_empty());

    assert_eq!(
        store.set_tag_filter(Some("ghost".to_string())).unwrap_err(),
        BoardError::UnknownTag("ghost".to_string())
    );
}

#[test]
fn update_task_tags_replaces_and_dedups() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let task_id = store
        .add_task(&list_id, NewTask::titled("t").with_tags(vec!["tag-1".to_string()]))
        .unwrap();

    store
        .update_task_tags(
            &list_id,
            &task_id,
            vec!["tag-2".to_string(), "tag-3".to_string(), "tag-2".to_string()],
        )
        .unwrap();

    assert_eq!(
        store.tasks_for_list(&list_id)[0].tags,
        vec!["tag-2".to_string(), "tag-3".to_string()]
    );
}

#[test]
fn missing_targets_report_not_found() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();

    assert_eq!(
        store.delete_list("nope").unwrap_err(),
        BoardError::ListNotFound("nope".to_string())
    );
    assert!(matches!(
        store.update_task(&list_id, "nope", TaskPatch::completed(true)),
        Err(BoardError::TaskNotFound { .. })
    ));
    assert_eq!(
        store.delete_tag("nope").unwrap_err(),
        BoardError::TagNotFound("nope".to_string())
    );
    assert!(store.tasks_for_list("nope").is_empty());
    assert!(store.tag_by_id("nope").is_none());
}

#[test]
fn template_list_is_inserted_atomically() {
    let harness = Harness::new();
    let mut store = harness.open();
    harness.queue.flush().unwrap();
    let writes = harness.inspector.set_count();

    let (list_id, task_ids) = store
        .add_template_list(
            "Noite",
            vec![
                NewTask::titled("Ler"),
                NewTask::titled("Alongar").with_tags(vec!["tag-3".to_string()]),
            ],
        )
        .unwrap();
    assert_eq!(task_ids.len(), 2);
    assert_eq!(store.tasks_for_list(&list_id).len(), 2);
    harness.queue.flush().unwrap();
    assert_eq!(harness.inspector.set_count(), writes + 1);

    let lists_before = store.board().lists.len();
    let err = store
        .add_template_list("Falha", vec![NewTask::titled("ok"), NewTask::titled(" ")])
        .unwrap_err();
    assert_eq!(err, BoardError::BlankTitle);
    assert_eq!(store.board().lists.len(), lists_before);
}

#[test]
fn generated_ids_do_not_collide_under_rapid_calls() {
    let harness = Harness::new();
    let mut store = harness.open();
    let list_id = store.add_list("L").unwrap();
    let ids = (0..200)
        .map(|idx| store.add_task(&list_id, NewTask::titled(format!("t{idx}"))).unwrap())
        .collect::<std::collections::HashSet<_>>();
    assert_eq!(ids.len(), 200);
}

#[test]
fn legacy_blob_without_tags_is_migrated_and_written_back() {
    let mut backing = MemoryKvStore::new();
    let legacy = json!({
        "title": "Antigo",
        "description": "",
        "lists": [{
            "id": "1700000000000",
            "title": "Velha",
            "tasks": [{"id": "1700000000001", "title": "x", "completed": false}]
        }]
    });
    backing.set(BOARD_DATA_KEY, &legacy.to_string()).unwrap();
    let harness = Harness::with_store(backing);

    let store = harness.open();
    assert_eq!(store.board().title, "Antigo");
    assert_eq!(store.board().tags.len(), 6);
    assert!(store.board().active_filter.is_none());
    assert!(store.board().lists[0].tasks[0].tags.is_empty());

    let blob = harness.stored_blob();
    assert_eq!(blob["schemaVersion"], json!(1));
    assert_eq!(blob["data"]["lists"][0]["tasks"][0]["tags"], json!([]));
}

#[test]
fn corrupt_blob_falls_back_to_default_board() {
    let mut backing = MemoryKvStore::new();
    backing.set(BOARD_DATA_KEY, "{not json").unwrap();
    let harness = Harness::with_store(backing);

    let store = harness.open();
    assert_eq!(store.board().lists.len(), 6);
    assert!(!store.is_loading());
}

#[test]
fn future_schema_version_falls_back_without_overwriting() {
    let mut backing = MemoryKvStore::new();
    let future = json!({"schemaVersion": 99, "data": {}}).to_string();
    backing.set(BOARD_DATA_KEY, &future).unwrap();
    let harness = Harness::with_store(backing);

    let store = harness.open();
    assert_eq!(store.board().lists.len(), 6);
    harness.queue.flush().unwrap();
    assert_eq!(
        harness.inspector.get(BOARD_DATA_KEY).unwrap().as_deref(),
        Some(future.as_str())
    );
}

#[test]
fn snapshots_are_immutable_values() {
    let harness = Harness::new();
    let mut store = harness.open();
    let before = store.snapshot();
    store.add_list("novo").unwrap();
    assert_eq!(before.lists.len(), 6);
    assert_eq!(store.snapshot().lists.len(), 7);
}

#[test]
fn reset_to_default_restores_seed_board() {
    let harness = Harness::new();
    let mut store = harness.open();
    empty_board(&mut store);
    store.reset_to_default();
    assert_eq!(store.board().lists.len(), 6);
    assert_eq!(harness.reloaded().lists.len(), 6);
}
