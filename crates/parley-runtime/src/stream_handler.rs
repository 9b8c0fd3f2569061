//! Producer-side handle for one streaming run.

use async_trait::async_trait;
use parley_contract::executor::{ChunkSink, ExecutionError, OutputChunk, SinkClosed};
use parley_contract::thread::Message;
use tokio::sync::mpsc;

use crate::handoff::HandoffItem;

/// Owns the producer side of a run: the resolved input and the sending half
/// of the handoff channel.
///
/// Dropping the handler closes the channel, so the consumer observes
/// end-of-stream exactly once on every exit path of the execution task.
pub struct StreamHandler {
    input: Vec<Message>,
    tx: mpsc::Sender<HandoffItem>,
}

impl StreamHandler {
    /// Assemble the run input: persisted history first, then the new
    /// messages from the request, order preserved within each part.
    pub(crate) fn new(
        history: Vec<Message>,
        new_messages: Vec<Message>,
        tx: mpsc::Sender<HandoffItem>,
    ) -> Self {
        let mut input = history;
        input.extend(new_messages);
        Self { input, tx }
    }

    /// The full input the executor runs over.
    pub fn input(&self) -> &[Message] {
        &self.input
    }

    /// Place the terminal failure marker. Best-effort: the consumer may
    /// already be gone, in which case the marker is dropped silently.
    pub(crate) async fn fail(&self, error: ExecutionError) {
        let _ = self.tx.send(HandoffItem::Failed(error)).await;
    }
}

#[async_trait]
impl ChunkSink for StreamHandler {
    async fn on_chunk(&self, chunk: OutputChunk) -> Result<(), SinkClosed> {
        self.tx
            .send(HandoffItem::Chunk(chunk))
            .await
            .map_err(|_| SinkClosed)
    }
}
