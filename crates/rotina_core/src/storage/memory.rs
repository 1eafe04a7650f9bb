//! In-memory backing store.
//!
//! Clones share the same map, so a test can keep one handle for inspection
//! while the persistence queue owns another.

use super::{KvStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    set_count: u64,
}

/// Shared in-memory `KvStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls since creation.
    pub fn set_count(&self) -> u64 {
        self.lock().map_or(0, |state| state.set_count)
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |state| state.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.lock()?;
        state.entries.insert(key.to_string(), value.to_string());
        state.set_count += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.lock()?.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.lock()?.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::storage::KvStore;

    #[test]
    fn clones_share_entries_and_counters() {
        let inspector = MemoryKvStore::new();
        let mut writer = inspector.clone();

        writer.set("k", "v1").unwrap();
        writer.set("k", "v2").unwrap();

        assert_eq!(inspector.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(inspector.set_count(), 2);
        assert_eq!(inspector.len(), 1);
    }

    #[test]
    fn clear_removes_every_key() {
        let mut store = MemoryKvStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("a").unwrap(), None);
    }
}
