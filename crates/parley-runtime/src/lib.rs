//! Run orchestration: background agent execution relayed to an ordered,
//! sanitized client event stream.
//!
//! A run is two halves joined by a bounded handoff channel. The producer
//! half ([`StreamHandler`] plus a supervised background task) drives the
//! [`AgentExecutor`](parley_contract::executor::AgentExecutor) and pushes
//! its output into the channel; the consumer half
//! ([`orchestrator::sequence_events`]) turns channel items into the
//! [`StreamEvent`] sequence a transport delivers to the client.

pub mod aggregator;
pub mod events;
pub mod handoff;
pub mod orchestrator;
pub mod stream_handler;
pub mod supervisor;

pub use aggregator::EventAggregator;
pub use events::{PublicError, StreamEvent};
pub use handoff::{HandoffItem, HANDOFF_CAPACITY};
pub use orchestrator::{AgentRuntime, RunAborted, RunStream};
pub use stream_handler::StreamHandler;
pub use supervisor::{spawn_supervised, TaskCompletion};
