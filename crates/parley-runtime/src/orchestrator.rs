//! Wires an executor run to an outbound event sequence.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use parley_contract::executor::{
    AgentExecutor, ChunkSink, OutputChunk, RunContext, SinkClosed,
};
use parley_contract::thread::Message;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::aggregator::EventAggregator;
use crate::events::StreamEvent;
use crate::handoff::{self, HandoffItem};
use crate::stream_handler::StreamHandler;
use crate::supervisor::{spawn_supervised, TaskCompletion};

/// The stream was cut short by an execution failure. The public `error`
/// event has already been yielded and the internal detail logged at the
/// failure site; this sentinel tells the transport to drop the connection
/// instead of closing it cleanly.
#[derive(Debug, Error)]
#[error("run aborted after execution failure")]
pub struct RunAborted;

/// Live event sequence for one streaming run.
pub struct RunStream {
    pub thread_id: String,
    pub events: BoxStream<'static, Result<StreamEvent, RunAborted>>,
}

/// Entry point for starting agent runs.
#[derive(Clone)]
pub struct AgentRuntime {
    executor: Arc<dyn AgentExecutor>,
}

impl AgentRuntime {
    pub fn new(executor: Arc<dyn AgentExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Arc<dyn AgentExecutor> {
        &self.executor
    }

    /// Start a run whose output is streamed to the caller.
    ///
    /// Execution happens on a supervised background task; the returned
    /// stream yields events in production order. If the caller drops the
    /// stream early, the executor observes a closed sink on its next push
    /// and stops, and the supervisor still records the task outcome.
    pub fn start_streaming_run(
        &self,
        ctx: RunContext,
        history: Vec<Message>,
        new_messages: Vec<Message>,
    ) -> RunStream {
        let thread_id = ctx.thread_id().to_string();
        let (tx, rx) = handoff::channel();
        let handler = StreamHandler::new(history, new_messages, tx);
        let aggregator = Arc::new(EventAggregator::new());

        let executor = Arc::clone(&self.executor);
        let observer = Arc::clone(&aggregator);
        let task = spawn_supervised("streaming-run", async move {
            run_to_completion(executor, ctx, handler, observer).await;
        });

        RunStream {
            thread_id,
            events: sequence_events(rx, aggregator, task).boxed(),
        }
    }

    /// Start a run nobody is watching. Returns as soon as the task is
    /// spawned; output is discarded and failures are only logged.
    pub fn start_detached_run(
        &self,
        ctx: RunContext,
        history: Vec<Message>,
        new_messages: Vec<Message>,
    ) -> TaskCompletion {
        let executor = Arc::clone(&self.executor);
        spawn_supervised("detached-run", async move {
            let mut input = history;
            input.extend(new_messages);
            let observer = EventAggregator::new();
            if let Err(error) = executor
                .execute(&input, &ctx, &observer, &DiscardSink)
                .await
            {
                tracing::error!(
                    thread_id = %ctx.thread_id(),
                    error = %error,
                    "detached agent run failed"
                );
            }
        })
    }
}

/// Sink for detached runs.
struct DiscardSink;

#[async_trait::async_trait]
impl ChunkSink for DiscardSink {
    async fn on_chunk(&self, _chunk: OutputChunk) -> Result<(), SinkClosed> {
        Ok(())
    }
}

/// Body of the background execution task. The handler drops on every exit
/// path, closing the handoff channel exactly once.
async fn run_to_completion(
    executor: Arc<dyn AgentExecutor>,
    ctx: RunContext,
    handler: StreamHandler,
    observer: Arc<EventAggregator>,
) {
    if let Err(error) = executor
        .execute(handler.input(), &ctx, observer.as_ref(), &handler)
        .await
    {
        // Full detail stays in the server log; the client only ever sees
        // the fixed public error event.
        tracing::error!(
            thread_id = %ctx.thread_id(),
            error = %error,
            "agent run failed"
        );
        handler.fail(error).await;
    }
}

/// Turn handoff items into the client event sequence.
///
/// On the success path the channel closing is not enough to declare the run
/// over: the supervised task's completion is confirmed first, and only then
/// is the `end` event yielded. On the failure path the fixed `error` event
/// is yielded, followed by [`RunAborted`]; no `end` event is produced.
fn sequence_events(
    mut rx: mpsc::Receiver<HandoffItem>,
    aggregator: Arc<EventAggregator>,
    task: TaskCompletion,
) -> impl futures::Stream<Item = Result<StreamEvent, RunAborted>> + Send + 'static {
    async_stream::stream! {
        let mut metadata_sent = false;
        while let Some(item) = rx.recv().await {
            match item {
                HandoffItem::Chunk(chunk) => {
                    if !metadata_sent {
                        if let Some(run_id) = aggregator.run_id() {
                            yield Ok(StreamEvent::metadata(run_id));
                            metadata_sent = true;
                        }
                    }
                    yield Ok(StreamEvent::data(chunk));
                }
                HandoffItem::Failed(_) => {
                    yield Ok(StreamEvent::internal_error());
                    yield Err(RunAborted);
                    return;
                }
            }
        }
        task.finished().await;
        yield Ok(StreamEvent::End);
    }
}
