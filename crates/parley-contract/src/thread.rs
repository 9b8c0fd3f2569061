//! Conversation domain model: messages, threads, and assistants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Generate a time-ordered UUID v7 message identifier.
pub fn gen_message_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

/// A message in a conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Stable message identifier (UUID v7, auto-generated by constructors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: Some(gen_message_id()),
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Some(gen_message_id()),
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Some(gen_message_id()),
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A configured assistant owned by a user.
///
/// `config` is an opaque configurable map consumed by the agent-execution
/// engine; the backend stores and forwards it without interpreting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub assistant_id: String,
    pub name: String,
    pub config: Value,
    #[serde(default)]
    pub public: bool,
    pub updated_at: DateTime<Utc>,
}

impl Assistant {
    pub fn new(assistant_id: impl Into<String>, name: impl Into<String>, config: Value) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            name: name.into(),
            config,
            public: false,
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

/// Thread metadata. Message history is stored alongside the thread and
/// queried separately via [`crate::storage::ThreadStore::get_thread_messages`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(thread_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            assistant_id: None,
            name: name.into(),
            updated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_assistant(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = Some(assistant_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_assign_ids_and_roles() {
        let m = Message::user("hello");
        assert_eq!(m.role, Role::User);
        assert_eq!(m.content, "hello");
        assert!(m.id.is_some());

        let m = Message::assistant("hi");
        assert_eq!(m.role, Role::Assistant);
    }

    #[test]
    fn message_serde_roundtrip_skips_missing_id() {
        let raw = serde_json::json!({ "role": "user", "content": "hi" });
        let m: Message = serde_json::from_value(raw).unwrap();
        assert!(m.id.is_none());
        let v = serde_json::to_value(&m).unwrap();
        assert!(v.get("id").is_none());
    }
}
