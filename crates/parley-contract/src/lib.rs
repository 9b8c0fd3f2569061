//! Shared contracts for the parley agent-serving backend: the conversation
//! model, the storage collaborator, the agent-executor boundary, and the
//! document-ingestion boundary.

pub mod executor;
pub mod ingest;
pub mod storage;
pub mod thread;

#[cfg(feature = "test-support")]
pub mod testing;

pub use executor::{
    parse_messages_input, AgentExecutor, ChunkSink, ExecutionError, InputError, OutputChunk,
    RunContext, RunObserver, SinkClosed,
};
pub use ingest::{DocumentIngestor, IngestError, UploadedDocument};
pub use storage::{AssistantStore, Storage, StorageError, ThreadStore};
pub use thread::{Assistant, Message, Role, Thread};
