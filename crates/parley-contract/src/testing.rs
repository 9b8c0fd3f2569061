//! Shared test fixtures for crates that depend on `parley-contract`.
//!
//! Gated behind the `test-support` cargo feature so production builds are
//! unaffected. Enable via
//! `[dev-dependencies] parley-contract = { ..., features = ["test-support"] }`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use crate::executor::{
    parse_messages_input, AgentExecutor, ChunkSink, ExecutionError, InputError, OutputChunk,
    RunContext, RunObserver,
};
use crate::thread::Message;

/// Executor that replays a fixed script: each chunk in order, then either
/// success or a terminal failure. Records every input it was invoked with.
pub struct ScriptedAgent {
    run_id: Option<String>,
    chunks: Vec<Value>,
    failure: Option<ExecutionError>,
    pub seen_inputs: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedAgent {
    /// Script that emits `chunks` and finishes successfully.
    pub fn new(chunks: Vec<Value>) -> Self {
        Self {
            run_id: None,
            chunks,
            failure: None,
            seen_inputs: Mutex::new(Vec::new()),
        }
    }

    /// Record `run_id` with the observer before producing any chunk.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Fail with `failure` after all scripted chunks have been emitted.
    #[must_use]
    pub fn with_failure(mut self, failure: ExecutionError) -> Self {
        self.failure = Some(failure);
        self
    }
}

#[async_trait]
impl AgentExecutor for ScriptedAgent {
    fn validate_input(&self, _ctx: &RunContext, raw: &Value) -> Result<Vec<Message>, InputError> {
        parse_messages_input(raw)
    }

    async fn execute(
        &self,
        input: &[Message],
        _ctx: &RunContext,
        observer: &dyn RunObserver,
        sink: &dyn ChunkSink,
    ) -> Result<(), ExecutionError> {
        self.seen_inputs.lock().unwrap().push(input.to_vec());
        if let Some(ref run_id) = self.run_id {
            observer.record_run_id(run_id);
        }
        for chunk in &self.chunks {
            if sink.on_chunk(OutputChunk::new(chunk.clone())).await.is_err() {
                // Consumer is gone; production stops, which is not a failure.
                return Ok(());
            }
        }
        match self.failure {
            Some(ref failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}
