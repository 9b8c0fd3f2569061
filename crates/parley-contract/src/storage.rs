//! Storage collaborator contract.
//!
//! The backend treats persistence as a user-scoped key-value lookup/write
//! service; schema design belongs to the adapter crates.

use async_trait::async_trait;
use thiserror::Error;

use crate::thread::{Assistant, Message, Thread};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Record not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid record ID (path traversal, control chars, etc.).
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// Assistant persistence, scoped to the owning user.
#[async_trait]
pub trait AssistantStore: Send + Sync {
    /// List all assistants owned by `user_id`.
    async fn list_assistants(&self, user_id: &str) -> Result<Vec<Assistant>, StorageError>;

    /// Load one assistant. Fails with `NotFound` if it does not exist or is
    /// owned by another user.
    async fn get_assistant(
        &self,
        user_id: &str,
        assistant_id: &str,
    ) -> Result<Assistant, StorageError>;

    /// Create or replace an assistant for `user_id`.
    async fn put_assistant(
        &self,
        user_id: &str,
        assistant: Assistant,
    ) -> Result<Assistant, StorageError>;

    /// Load the public assistants among `assistant_ids`, across all users.
    /// Unknown ids are skipped, not an error.
    async fn list_public_assistants(
        &self,
        assistant_ids: &[String],
    ) -> Result<Vec<Assistant>, StorageError>;
}

/// Thread persistence, scoped to the owning user.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// List all threads owned by `user_id`.
    async fn list_threads(&self, user_id: &str) -> Result<Vec<Thread>, StorageError>;

    /// Load one thread's metadata. Fails with `NotFound`.
    async fn get_thread(&self, user_id: &str, thread_id: &str) -> Result<Thread, StorageError>;

    /// Load one thread's full message history. Fails with `NotFound`.
    async fn get_thread_messages(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> Result<Vec<Message>, StorageError>;

    /// Create or update a thread's metadata, preserving its messages.
    async fn put_thread(&self, user_id: &str, thread: Thread) -> Result<Thread, StorageError>;

    /// Replace a thread's message history. Fails with `NotFound`.
    async fn put_thread_messages(
        &self,
        user_id: &str,
        thread_id: &str,
        messages: Vec<Message>,
    ) -> Result<(), StorageError>;
}

/// Full storage capability.
pub trait Storage: AssistantStore + ThreadStore {}

impl<T: AssistantStore + ThreadStore + ?Sized> Storage for T {}
