//! Multipart document ingest.

use std::path::PathBuf;

use async_trait::async_trait;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use parley_contract::ingest::{DocumentIngestor, IngestError, UploadedDocument};
use serde_json::Value;

use crate::service::{ApiError, AppState};

pub const INGEST_PATH: &str = "/ingest";

pub fn ingest_routes() -> Router<AppState> {
    Router::new().route(INGEST_PATH, post(ingest))
}

/// Accept a multipart upload: one `config` field holding JSON, plus one or
/// more file fields. Each file is handed to the ingestor with the shared
/// config; the response lists one result per file, in upload order.
async fn ingest(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<Value>>, ApiError> {
    let mut config: Option<Value> = None;
    let mut documents: Vec<UploadedDocument> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        if name.as_deref() == Some("config") {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("unreadable config field: {e}")))?;
            let value = serde_json::from_str(&text)
                .map_err(|e| ApiError::BadRequest(format!("config is not valid JSON: {e}")))?;
            config = Some(value);
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| ApiError::BadRequest("file field is missing a filename".to_string()))?;
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("unreadable file field: {e}")))?;
        documents.push(UploadedDocument {
            filename,
            content_type,
            bytes,
        });
    }

    let config = config
        .ok_or_else(|| ApiError::BadRequest("missing config field".to_string()))?;
    if documents.is_empty() {
        return Err(ApiError::BadRequest("no files uploaded".to_string()));
    }

    let mut results = Vec::with_capacity(documents.len());
    for document in documents {
        let result = state
            .ingestor
            .ingest(document, &config)
            .await
            .map_err(|e| match e {
                IngestError::InvalidConfig(msg) | IngestError::Unsupported(msg) => {
                    ApiError::BadRequest(msg)
                }
                IngestError::Io(io) => ApiError::Internal(io.to_string()),
            })?;
        results.push(result);
    }
    Ok(Json(results))
}

/// Ingestor that persists uploads under a local directory, one subdirectory
/// per assistant, and returns file metadata as the ingestion result.
pub struct UploadDirIngestor {
    base_path: PathBuf,
}

impl UploadDirIngestor {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

/// Reject names that could escape the upload directory.
fn validate_component(value: &str) -> Result<(), IngestError> {
    if value.is_empty()
        || value.contains('/')
        || value.contains('\\')
        || value.contains("..")
        || value.contains('\0')
    {
        return Err(IngestError::Unsupported(format!(
            "unsafe path component: {value:?}"
        )));
    }
    Ok(())
}

#[async_trait]
impl DocumentIngestor for UploadDirIngestor {
    async fn ingest(
        &self,
        document: UploadedDocument,
        config: &Value,
    ) -> Result<Value, IngestError> {
        let assistant_id = config
            .get("assistant_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                IngestError::InvalidConfig("config must carry an assistant_id".to_string())
            })?;
        validate_component(assistant_id)?;
        validate_component(&document.filename)?;

        let dir = self.base_path.join(assistant_id);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&document.filename);
        tokio::fs::write(&path, &document.bytes).await?;

        tracing::info!(
            assistant_id,
            filename = %document.filename,
            bytes = document.bytes.len(),
            "document ingested"
        );
        Ok(serde_json::json!({
            "assistant_id": assistant_id,
            "filename": document.filename,
            "content_type": document.content_type,
            "bytes": document.bytes.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tempfile::TempDir;

    #[tokio::test]
    async fn stores_upload_under_assistant_directory() {
        let temp_dir = TempDir::new().unwrap();
        let ingestor = UploadDirIngestor::new(temp_dir.path());

        let result = ingestor
            .ingest(
                UploadedDocument {
                    filename: "notes.txt".to_string(),
                    content_type: Some("text/plain".to_string()),
                    bytes: Bytes::from_static(b"hello"),
                },
                &serde_json::json!({ "assistant_id": "a1" }),
            )
            .await
            .unwrap();

        assert_eq!(result["filename"], "notes.txt");
        assert_eq!(result["bytes"], 5);
        let stored = std::fs::read(temp_dir.path().join("a1/notes.txt")).unwrap();
        assert_eq!(stored, b"hello");
    }

    #[tokio::test]
    async fn rejects_config_without_assistant_id() {
        let temp_dir = TempDir::new().unwrap();
        let ingestor = UploadDirIngestor::new(temp_dir.path());

        let result = ingestor
            .ingest(
                UploadedDocument {
                    filename: "notes.txt".to_string(),
                    content_type: None,
                    bytes: Bytes::from_static(b"hello"),
                },
                &serde_json::json!({}),
            )
            .await;
        assert!(matches!(result, Err(IngestError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn rejects_traversal_in_filename() {
        let temp_dir = TempDir::new().unwrap();
        let ingestor = UploadDirIngestor::new(temp_dir.path());

        let result = ingestor
            .ingest(
                UploadedDocument {
                    filename: "../escape.txt".to_string(),
                    content_type: None,
                    bytes: Bytes::from_static(b"hello"),
                },
                &serde_json::json!({ "assistant_id": "a1" }),
            )
            .await;
        assert!(matches!(result, Err(IngestError::Unsupported(_))));
    }
}
