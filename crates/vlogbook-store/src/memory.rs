//! In-memory entry store for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use vlogbook_core::model::Entry;
use vlogbook_core::traits::{sort_by_creation, EntryStore};

/// Entry store that keeps everything in a map and forgets it on drop.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let map = entries.into_iter().map(|e| (e.id.clone(), e)).collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn put(&self, entry: &Entry) -> Result<()> {
        self.guard()?.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Entry>> {
        let mut all: Vec<Entry> = self.guard()?.values().cloned().collect();
        sort_by_creation(&mut all);
        Ok(all)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.guard()?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, created_at: i64) -> Entry {
        Entry {
            id: id.into(),
            created_at,
            source_text: String::new(),
            target_text: String::new(),
            vocabulary: vec![],
            grammar: vec![],
        }
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.put(&entry("b", 2)).await.unwrap();
        store.put(&entry("a", 1)).await.unwrap();
        assert_eq!(store.len(), 2);

        let ids: Vec<_> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, ["a", "b"]);

        store.delete("a").await.unwrap();
        assert!(store.get_by_id("a").await.unwrap().is_none());
        assert!(store.get_by_id("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn with_entries_seeds_store() {
        let store = MemoryStore::with_entries([entry("x", 1), entry("y", 2)]);
        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }
}
