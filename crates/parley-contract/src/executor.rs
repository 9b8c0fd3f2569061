//! Boundary with the agent-execution engine.
//!
//! The engine is an opaque async producer: given an immutable input and a
//! request-scoped context, it pushes incremental [`OutputChunk`]s into a
//! [`ChunkSink`] in production order, reports run metadata through a
//! [`RunObserver`], and may fail with an [`ExecutionError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::thread::Message;

/// One opaque, serializable unit of incremental agent output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputChunk(pub Value);

impl OutputChunk {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }
}

/// Terminal failure raised while running the agent.
///
/// The message text may contain sensitive internal detail; it is logged
/// server-side and must never be forwarded to a client verbatim.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("model call failed: {0}")]
    Model(String),

    #[error("execution timed out: {0}")]
    Timeout(String),

    #[error("tool call failed: {0}")]
    Tool(String),

    #[error("{0}")]
    Other(String),
}

/// Run input failed the executor's schema. Validation detail is structured
/// and safe to return to the client.
#[derive(Debug, Error)]
#[error("invalid run input: {0}")]
pub struct InputError(pub String);

/// The consuming side of the chunk channel is gone.
#[derive(Debug, Error)]
#[error("chunk sink closed")]
pub struct SinkClosed;

/// Immutable request-scoped context for one run.
///
/// Built once when the run request is resolved and passed by reference;
/// nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct RunContext {
    user_id: String,
    assistant_id: String,
    thread_id: String,
    config: Value,
}

impl RunContext {
    pub fn new(
        user_id: impl Into<String>,
        assistant_id: impl Into<String>,
        thread_id: impl Into<String>,
        config: Value,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            assistant_id: assistant_id.into(),
            thread_id: thread_id.into(),
            config,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Opaque assistant configuration, forwarded to the engine uninterpreted.
    pub fn config(&self) -> &Value {
        &self.config
    }
}

/// Sink for incremental output. Exactly one sink per run.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Push one chunk, in production order. Suspends while the channel is at
    /// capacity (natural backpressure); returns [`SinkClosed`] once the
    /// consumer is gone.
    async fn on_chunk(&self, chunk: OutputChunk) -> Result<(), SinkClosed>;
}

/// Observes run metadata produced as a side effect of execution,
/// independently of the chunk stream.
pub trait RunObserver: Send + Sync {
    /// Record the engine-assigned run identifier. The first write wins;
    /// later writes are ignored.
    fn record_run_id(&self, run_id: &str);
}

/// The agent-execution engine.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Validate raw request input against the executor's expected schema.
    fn validate_input(&self, ctx: &RunContext, raw: &Value) -> Result<Vec<Message>, InputError>;

    /// Run the agent over `input`, pushing each produced chunk into `sink`.
    async fn execute(
        &self,
        input: &[Message],
        ctx: &RunContext,
        observer: &dyn RunObserver,
        sink: &dyn ChunkSink,
    ) -> Result<(), ExecutionError>;
}

#[derive(Deserialize)]
struct MessagesInput {
    messages: Vec<Message>,
}

/// Parse the canonical `{"messages": [...]}` input shape.
///
/// Executors with this input schema can use it to implement
/// [`AgentExecutor::validate_input`].
pub fn parse_messages_input(raw: &Value) -> Result<Vec<Message>, InputError> {
    let input: MessagesInput =
        serde_json::from_value(raw.clone()).map_err(|e| InputError(e.to_string()))?;
    if input.messages.is_empty() {
        return Err(InputError("messages cannot be empty".to_string()));
    }
    Ok(input.messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_messages_input_accepts_canonical_shape() {
        let raw = serde_json::json!({
            "messages": [{ "role": "user", "content": "hello" }]
        });
        let messages = parse_messages_input(&raw).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hello");
    }

    #[test]
    fn parse_messages_input_rejects_missing_and_empty() {
        assert!(parse_messages_input(&serde_json::json!({})).is_err());
        assert!(parse_messages_input(&serde_json::json!({ "messages": [] })).is_err());
        assert!(
            parse_messages_input(&serde_json::json!({ "messages": [{ "role": "nope" }] }))
                .is_err()
        );
    }

    #[test]
    fn run_context_is_read_only() {
        let ctx = RunContext::new("u1", "a1", "t1", serde_json::json!({ "model": "demo" }));
        assert_eq!(ctx.user_id(), "u1");
        assert_eq!(ctx.assistant_id(), "a1");
        assert_eq!(ctx.thread_id(), "t1");
        assert_eq!(ctx.config()["model"], "demo");
    }
}
