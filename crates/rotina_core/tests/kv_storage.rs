use chrono::{TimeZone, Utc};
use rotina_core::storage::BOARD_DATA_KEY;
use rotina_core::{
    BoardStore, Clock, KvStore, ManualClock, NewTask, PersistQueue, SqliteKvStore, StorageError,
    StorageResult,
};
use std::sync::Arc;

/// Backend that rejects every write.
struct ReadOnlyStore;

impl KvStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Backend(format!("read-only: {key}")))
    }

    fn remove(&mut self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

fn clock() -> Arc<dyn Clock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
    ))
}

#[test]
fn sqlite_store_set_get_remove_clear() {
    let mut store = SqliteKvStore::open_in_memory().unwrap();
    assert_eq!(store.get("a").unwrap(), None);

    store.set("a", "1").unwrap();
    store.set("a", "2").unwrap();
    store.set("b", "3").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("3"));

    store.remove("a").unwrap();
    store.remove("missing").unwrap();
    assert_eq!(store.get("a").unwrap(), None);

    store.clear().unwrap();
    assert_eq!(store.get("b").unwrap(), None);
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rotina.sqlite3");

    {
        let mut store = SqliteKvStore::open(&path).unwrap();
        store.set("@RotinaAutoamor:hasRun", "true").unwrap();
    }

    let store = SqliteKvStore::open(&path).unwrap();
    assert_eq!(
        store.get("@RotinaAutoamor:hasRun").unwrap().as_deref(),
        Some("true")
    );
}

#[test]
fn board_round_trips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rotina.sqlite3");

    let expected = {
        let queue = PersistQueue::spawn(SqliteKvStore::open(&path).unwrap()).unwrap();
        let mut store = BoardStore::open(queue, clock());
        let list_id = store.add_list("Manhã").unwrap();
        store.add_task(&list_id, NewTask::titled("Beber água")).unwrap();
        store.flush().unwrap();
        store.board().clone()
    };

    let queue = PersistQueue::spawn(SqliteKvStore::open(&path).unwrap()).unwrap();
    let store = BoardStore::open(queue.clone(), clock());
    assert_eq!(*store.board(), expected);
    assert!(queue.read(BOARD_DATA_KEY).unwrap().is_some());
}

#[test]
fn failed_writes_keep_memory_state_and_surface_on_flush() {
    let queue = PersistQueue::spawn(ReadOnlyStore).unwrap();
    let mut store = BoardStore::open(queue.clone(), clock());

    let list_id = store.add_list("Mesmo assim").unwrap();
    assert!(store.board().list(&list_id).is_some());

    let err = queue.flush().unwrap_err();
    assert!(matches!(err, StorageError::Backend(_)));
    queue.flush().unwrap();

    store.add_task(&list_id, NewTask::titled("t")).unwrap();
    assert_eq!(store.tasks_for_list(&list_id).len(), 1);
    assert!(store.flush().is_err());
}

#[test]
fn boxed_store_is_a_kv_store() {
    let boxed: Box<dyn KvStore> = Box::new(SqliteKvStore::open_in_memory().unwrap());
    let queue = PersistQueue::spawn(boxed).unwrap();
    queue.schedule_set("k", "v".to_string());
    assert_eq!(queue.read("k").unwrap().as_deref(), Some("v"));
    queue.schedule_clear();
    assert_eq!(queue.read("k").unwrap(), None);
}
