//! JSON file-backed entry store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use vlogbook_core::error::StoreError;
use vlogbook_core::model::Entry;
use vlogbook_core::traits::{sort_by_creation, EntryStore};

/// Stores every entry in a single JSON array on disk.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// store file, so a crash mid-write leaves the previous contents intact.
/// A missing file reads as an empty store.
///
/// Writers are serialised only within one process. Two processes sharing a
/// store file can lose each other's updates, since each `put` or `delete`
/// rewrites the whole file from its own read.
pub struct JsonFileStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Vec<Entry>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    async fn write_entries(&self, entries: &[Entry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl EntryStore for JsonFileStore {
    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn put(&self, entry: &Entry) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => entries.push(entry.clone()),
        }
        sort_by_creation(&mut entries);
        self.write_entries(&entries).await?;
        tracing::debug!(path = %self.path.display(), "saved entry");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Entry>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        sort_by_creation(&mut entries);
        Ok(entries)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Entry>> {
        let _guard = self.lock.lock().await;
        let entries = self.read_entries().await?;
        Ok(entries.into_iter().find(|e| e.id == id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            tracing::debug!("no entry to delete");
            return Ok(());
        }
        self.write_entries(&entries).await?;
        tracing::debug!(path = %self.path.display(), "deleted entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlogbook_core::model::VocabularyItem;

    fn entry(id: &str, created_at: i64, text: &str) -> Entry {
        Entry {
            id: id.into(),
            created_at,
            source_text: "今天".into(),
            target_text: text.into(),
            vocabulary: vec![VocabularyItem::new("hoy", "今天", text)],
            grammar: vec![],
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("entries.json"));
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(store.get_by_id("nope").await.unwrap().is_none());
        store.delete("nope").await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn entries_persist_in_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.json");

        let store = JsonFileStore::new(&path);
        store.put(&entry("second", 200, "Dos")).await.unwrap();
        store.put(&entry("first", 100, "Uno")).await.unwrap();
        store.put(&entry("third", 300, "Tres")).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        let ids: Vec<_> = reopened
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, ["first", "second", "third"]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn put_overwrites_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("entries.json"));
        store.put(&entry("a", 1, "Hola")).await.unwrap();
        store.put(&entry("a", 1, "Hola otra vez")).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].target_text, "Hola otra vez");
        assert_eq!(
            store.get_by_id("a").await.unwrap().unwrap().target_text,
            "Hola otra vez"
        );
    }

    #[tokio::test]
    async fn concurrent_puts_in_one_process_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileStore::new(dir.path().join("entries.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .put(&entry(&format!("e{i}"), i, "Hola"))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_all().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("entries.json"));
        store.put(&entry("a", 1, "Uno")).await.unwrap();
        store.put(&entry("b", 2, "Dos")).await.unwrap();

        store.delete("a").await.unwrap();
        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "b");
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.get_all().await.unwrap_err();
        assert!(err.to_string().contains("corrupt"), "got: {err}");
    }

    #[tokio::test]
    async fn reads_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(
            &path,
            r#"[{
                "id": "x",
                "createdAt": 5,
                "sourceText": "我去了公园",
                "targetText": "Fui al parque",
                "vocabulary": [{"word": "parque", "meaning": "公园", "context": "Fui al parque"}]
            }]"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path);
        let entry = store.get_by_id("x").await.unwrap().unwrap();
        assert_eq!(entry.vocabulary[0].term, "parque");
        assert!(entry.grammar.is_empty());
    }
}
