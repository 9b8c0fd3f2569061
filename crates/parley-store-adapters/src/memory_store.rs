use async_trait::async_trait;
use parley_contract::storage::{AssistantStore, StorageError, ThreadStore};
use parley_contract::thread::{Assistant, Message, Thread};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct ThreadEntry {
    thread: Thread,
    messages: Vec<Message>,
}

/// In-memory storage for testing and local development.
#[derive(Default)]
pub struct MemoryStore {
    // Keyed by (user_id, record_id).
    assistants: RwLock<HashMap<(String, String), Assistant>>,
    threads: RwLock<HashMap<(String, String), ThreadEntry>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a thread with message history. Test/setup convenience.
    pub async fn seed_thread(&self, user_id: &str, thread: Thread, messages: Vec<Message>) {
        let key = (user_id.to_string(), thread.thread_id.clone());
        self.threads
            .write()
            .await
            .insert(key, ThreadEntry { thread, messages });
    }
}

#[async_trait]
impl AssistantStore for MemoryStore {
    async fn list_assistants(&self, user_id: &str) -> Result<Vec<Assistant>, StorageError> {
        let assistants = self.assistants.read().await;
        let mut items: Vec<Assistant> = assistants
            .iter()
            .filter(|((uid, _), _)| uid == user_id)
            .map(|(_, a)| a.clone())
            .collect();
        items.sort_by(|a, b| a.assistant_id.cmp(&b.assistant_id));
        Ok(items)
    }

    async fn get_assistant(
        &self,
        user_id: &str,
        assistant_id: &str,
    ) -> Result<Assistant, StorageError> {
        let assistants = self.assistants.read().await;
        assistants
            .get(&(user_id.to_string(), assistant_id.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(assistant_id.to_string()))
    }

    async fn put_assistant(
        &self,
        user_id: &str,
        assistant: Assistant,
    ) -> Result<Assistant, StorageError> {
        let key = (user_id.to_string(), assistant.assistant_id.clone());
        self.assistants.write().await.insert(key, assistant.clone());
        Ok(assistant)
    }

    async fn list_public_assistants(
        &self,
        assistant_ids: &[String],
    ) -> Result<Vec<Assistant>, StorageError> {
        let assistants = self.assistants.read().await;
        let mut items: Vec<Assistant> = assistants
            .iter()
            .filter(|((_, aid), a)| a.public && assistant_ids.contains(aid))
            .map(|(_, a)| a.clone())
            .collect();
        items.sort_by(|a, b| a.assistant_id.cmp(&b.assistant_id));
        Ok(items)
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>, StorageError> {
        let threads = self.threads.read().await;
        let mut items: Vec<Thread> = threads
            .iter()
            .filter(|((uid, _), _)| uid == user_id)
            .map(|(_, e)| e.thread.clone())
            .collect();
        items.sort_by(|a, b| a.thread_id.cmp(&b.thread_id));
        Ok(items)
    }

    async fn get_thread(&self, user_id: &str, thread_id: &str) -> Result<Thread, StorageError> {
        let threads = self.threads.read().await;
        threads
            .get(&(user_id.to_string(), thread_id.to_string()))
            .map(|e| e.thread.clone())
            .ok_or_else(|| StorageError::NotFound(thread_id.to_string()))
    }

    async fn get_thread_messages(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> Result<Vec<Message>, StorageError> {
        let threads = self.threads.read().await;
        threads
            .get(&(user_id.to_string(), thread_id.to_string()))
            .map(|e| e.messages.clone())
            .ok_or_else(|| StorageError::NotFound(thread_id.to_string()))
    }

    async fn put_thread(&self, user_id: &str, thread: Thread) -> Result<Thread, StorageError> {
        let key = (user_id.to_string(), thread.thread_id.clone());
        let mut threads = self.threads.write().await;
        match threads.get_mut(&key) {
            Some(entry) => entry.thread = thread.clone(),
            None => {
                threads.insert(
                    key,
                    ThreadEntry {
                        thread: thread.clone(),
                        messages: Vec::new(),
                    },
                );
            }
        }
        Ok(thread)
    }

    async fn put_thread_messages(
        &self,
        user_id: &str,
        thread_id: &str,
        messages: Vec<Message>,
    ) -> Result<(), StorageError> {
        let mut threads = self.threads.write().await;
        let entry = threads
            .get_mut(&(user_id.to_string(), thread_id.to_string()))
            .ok_or_else(|| StorageError::NotFound(thread_id.to_string()))?;
        entry.messages = messages;
        Ok(())
    }
}
