use async_trait::async_trait;
use parley_contract::storage::{AssistantStore, StorageError, ThreadStore};
use parley_contract::thread::{Assistant, Message, Thread};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// JSON-file storage, one file per record under per-user directories:
/// `<base>/<user_id>/assistants/<assistant_id>.json` and
/// `<base>/<user_id>/threads/<thread_id>.json`.
pub struct FileStore {
    base_path: PathBuf,
}

/// On-disk thread record: metadata plus full message history.
#[derive(Serialize, Deserialize)]
struct ThreadRecord {
    #[serde(flatten)]
    thread: Thread,
    #[serde(default)]
    messages: Vec<Message>,
}

impl FileStore {
    /// Create a new file store rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Validate that an ID is safe for use as a path component.
    /// Rejects path separators, `..`, and control characters.
    fn validate_id(id: &str) -> Result<(), StorageError> {
        if id.is_empty() {
            return Err(StorageError::InvalidId("id cannot be empty".to_string()));
        }
        if id.contains('/') || id.contains('\\') || id.contains("..") || id.contains('\0') {
            return Err(StorageError::InvalidId(format!(
                "id contains invalid characters: {id:?}"
            )));
        }
        if id.chars().any(|c| c.is_control()) {
            return Err(StorageError::InvalidId(format!(
                "id contains control characters: {id:?}"
            )));
        }
        Ok(())
    }

    fn assistant_path(&self, user_id: &str, assistant_id: &str) -> Result<PathBuf, StorageError> {
        Self::validate_id(user_id)?;
        Self::validate_id(assistant_id)?;
        Ok(self
            .base_path
            .join(user_id)
            .join("assistants")
            .join(format!("{assistant_id}.json")))
    }

    fn thread_path(&self, user_id: &str, thread_id: &str) -> Result<PathBuf, StorageError> {
        Self::validate_id(user_id)?;
        Self::validate_id(thread_id)?;
        Ok(self
            .base_path
            .join(user_id)
            .join("threads")
            .join(format!("{thread_id}.json")))
    }

    async fn load_json<T: serde::de::DeserializeOwned>(
        path: &Path,
    ) -> Result<Option<T>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(path).await?;
        let value =
            serde_json::from_str(&content).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(value))
    }

    /// Write a record atomically: tmp file in the target directory, fsync,
    /// then rename over the destination.
    async fn save_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let dir = path
            .parent()
            .ok_or_else(|| StorageError::InvalidId("record path has no parent".to_string()))?;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp_path = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        let write_result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            match tokio::fs::rename(&tmp_path, path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tokio::fs::remove_file(path).await?;
                    tokio::fs::rename(&tmp_path, path).await?;
                }
                Err(e) => return Err(e),
            }
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(e));
        }
        Ok(())
    }

    /// Collect the JSON record stems in one directory, sorted.
    async fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn load_thread_record(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> Result<ThreadRecord, StorageError> {
        let path = self.thread_path(user_id, thread_id)?;
        Self::load_json::<ThreadRecord>(&path)
            .await?
            .ok_or_else(|| StorageError::NotFound(thread_id.to_string()))
    }
}

#[async_trait]
impl AssistantStore for FileStore {
    async fn list_assistants(&self, user_id: &str) -> Result<Vec<Assistant>, StorageError> {
        Self::validate_id(user_id)?;
        let dir = self.base_path.join(user_id).join("assistants");
        let mut items = Vec::new();
        for path in Self::list_record_files(&dir).await? {
            if let Some(assistant) = Self::load_json::<Assistant>(&path).await? {
                items.push(assistant);
            }
        }
        Ok(items)
    }

    async fn get_assistant(
        &self,
        user_id: &str,
        assistant_id: &str,
    ) -> Result<Assistant, StorageError> {
        let path = self.assistant_path(user_id, assistant_id)?;
        Self::load_json::<Assistant>(&path)
            .await?
            .ok_or_else(|| StorageError::NotFound(assistant_id.to_string()))
    }

    async fn put_assistant(
        &self,
        user_id: &str,
        assistant: Assistant,
    ) -> Result<Assistant, StorageError> {
        let path = self.assistant_path(user_id, &assistant.assistant_id)?;
        self.save_json(&path, &assistant).await?;
        Ok(assistant)
    }

    async fn list_public_assistants(
        &self,
        assistant_ids: &[String],
    ) -> Result<Vec<Assistant>, StorageError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let mut items = Vec::new();
        let mut users = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(user_dir) = users.next_entry().await? {
            if !user_dir.path().is_dir() {
                continue;
            }
            let dir = user_dir.path().join("assistants");
            for path in Self::list_record_files(&dir).await? {
                let Some(assistant) = Self::load_json::<Assistant>(&path).await? else {
                    continue;
                };
                if assistant.public && assistant_ids.contains(&assistant.assistant_id) {
                    items.push(assistant);
                }
            }
        }
        items.sort_by(|a, b| a.assistant_id.cmp(&b.assistant_id));
        Ok(items)
    }
}

#[async_trait]
impl ThreadStore for FileStore {
    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>, StorageError> {
        Self::validate_id(user_id)?;
        let dir = self.base_path.join(user_id).join("threads");
        let mut items = Vec::new();
        for path in Self::list_record_files(&dir).await? {
            if let Some(record) = Self::load_json::<ThreadRecord>(&path).await? {
                items.push(record.thread);
            }
        }
        Ok(items)
    }

    async fn get_thread(&self, user_id: &str, thread_id: &str) -> Result<Thread, StorageError> {
        Ok(self.load_thread_record(user_id, thread_id).await?.thread)
    }

    async fn get_thread_messages(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> Result<Vec<Message>, StorageError> {
        Ok(self.load_thread_record(user_id, thread_id).await?.messages)
    }

    async fn put_thread(&self, user_id: &str, thread: Thread) -> Result<Thread, StorageError> {
        let path = self.thread_path(user_id, &thread.thread_id)?;
        let messages = match Self::load_json::<ThreadRecord>(&path).await? {
            Some(existing) => existing.messages,
            None => Vec::new(),
        };
        let record = ThreadRecord {
            thread: thread.clone(),
            messages,
        };
        self.save_json(&path, &record).await?;
        Ok(thread)
    }

    async fn put_thread_messages(
        &self,
        user_id: &str,
        thread_id: &str,
        messages: Vec<Message>,
    ) -> Result<(), StorageError> {
        let mut record = self.load_thread_record(user_id, thread_id).await?;
        record.messages = messages;
        let path = self.thread_path(user_id, thread_id)?;
        self.save_json(&path, &record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn assistant_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        let assistant = Assistant::new("a1", "Research", serde_json::json!({ "model": "demo" }));
        store.put_assistant("u1", assistant).await.unwrap();

        let loaded = store.get_assistant("u1", "a1").await.unwrap();
        assert_eq!(loaded.name, "Research");
        assert_eq!(loaded.config["model"], "demo");

        // Scoped to the owning user.
        assert!(matches!(
            store.get_assistant("u2", "a1").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn thread_metadata_update_preserves_messages() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store
            .put_thread("u1", Thread::new("t1", "First"))
            .await
            .unwrap();
        store
            .put_thread_messages("u1", "t1", vec![Message::user("hello")])
            .await
            .unwrap();

        store
            .put_thread("u1", Thread::new("t1", "Renamed").with_assistant("a1"))
            .await
            .unwrap();

        let thread = store.get_thread("u1", "t1").await.unwrap();
        assert_eq!(thread.name, "Renamed");
        assert_eq!(thread.assistant_id.as_deref(), Some("a1"));
        let messages = store.get_thread_messages("u1", "t1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hello");
    }

    #[tokio::test]
    async fn public_assistants_span_users() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());

        store
            .put_assistant(
                "u1",
                Assistant::new("shared", "Shared", serde_json::json!({})).with_public(true),
            )
            .await
            .unwrap();
        store
            .put_assistant("u2", Assistant::new("private", "Private", serde_json::json!({})))
            .await
            .unwrap();

        let public = store
            .list_public_assistants(&["shared".to_string(), "private".to_string()])
            .await
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].assistant_id, "shared");
    }

    #[test]
    fn rejects_path_traversal() {
        let store = FileStore::new("/base/path");
        assert!(store.thread_path("u1", "../../etc/passwd").is_err());
        assert!(store.thread_path("../u1", "t1").is_err());
        assert!(store.assistant_path("u1", "foo/bar").is_err());
        assert!(store.assistant_path("u1", "foo\\bar").is_err());
        assert!(store.assistant_path("", "a1").is_err());
        assert!(store.assistant_path("u1", "foo\0bar").is_err());
    }
}
