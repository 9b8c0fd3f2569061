//! Client-facing stream events and their payloads.

use parley_contract::executor::OutputChunk;
use serde::Serialize;

/// Fixed public payload for an internal execution failure.
///
/// Only the [`PublicError::INTERNAL`] value can be constructed, so internal
/// error detail cannot leak through this type no matter what failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicError {
    pub status_code: u16,
    pub message: &'static str,
}

impl PublicError {
    pub const INTERNAL: PublicError = PublicError {
        status_code: 500,
        message: "Internal Server Error",
    };
}

/// One event in the outbound sequence of a streaming run.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Run metadata. Emitted at most once, before any data event.
    Metadata { run_id: String },
    /// One unit of incremental agent output.
    Data(OutputChunk),
    /// The run failed; this is the final event of an aborted stream.
    Error(PublicError),
    /// The run completed; this is the final event of a successful stream.
    End,
}

impl StreamEvent {
    pub fn metadata(run_id: impl Into<String>) -> Self {
        Self::Metadata {
            run_id: run_id.into(),
        }
    }

    pub fn data(chunk: OutputChunk) -> Self {
        Self::Data(chunk)
    }

    pub fn internal_error() -> Self {
        Self::Error(PublicError::INTERNAL)
    }

    /// Wire-level event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Metadata { .. } => "metadata",
            Self::Data(_) => "data",
            Self::Error(_) => "error",
            Self::End => "end",
        }
    }

    /// Serialized JSON payload. `end` carries none.
    pub fn payload_json(&self) -> Option<String> {
        match self {
            Self::Metadata { run_id } => {
                Some(serde_json::json!({ "run_id": run_id }).to_string())
            }
            Self::Data(chunk) => Some(chunk.0.to_string()),
            Self::Error(error) => serde_json::to_string(error).ok(),
            Self::End => None,
        }
    }
}
