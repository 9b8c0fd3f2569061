//! Boundary with the document-ingestion pipeline.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// One uploaded document, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Ingestion errors.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid ingest config: {0}")]
    InvalidConfig(String),

    #[error("unsupported document: {0}")]
    Unsupported(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The ingestion pipeline. Receives one document plus the opaque per-request
/// config and returns a serializable ingestion result.
#[async_trait]
pub trait DocumentIngestor: Send + Sync {
    async fn ingest(&self, document: UploadedDocument, config: &Value)
        -> Result<Value, IngestError>;
}
