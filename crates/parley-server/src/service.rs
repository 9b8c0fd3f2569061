//! Shared request state, API error mapping, and the cookie identity
//! extractor.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parley_contract::ingest::DocumentIngestor;
use parley_contract::storage::{Storage, StorageError};
use parley_runtime::AgentRuntime;
use thiserror::Error;

/// Cookie carrying the opaque caller identity. Every user-scoped route
/// requires it; there is no session management beyond this value.
pub const USER_ID_COOKIE: &str = "parley_user_id";

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: AgentRuntime,
    pub storage: Arc<dyn Storage>,
    pub ingestor: Arc<dyn DocumentIngestor>,
    /// Assistant ids surfaced on the public listing alongside explicitly
    /// shared ones.
    pub featured_assistants: Arc<Vec<String>>,
}

/// API-level errors, mapped to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing {USER_ID_COOKIE} cookie")]
    MissingIdentity,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    /// Internal detail is logged, never returned to the client.
    #[error("Internal Server Error")]
    Internal(String),
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound(id) => ApiError::NotFound(id),
            StorageError::InvalidId(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingIdentity => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Caller identity, extracted from the [`USER_ID_COOKIE`] cookie.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|cookies| cookie_value(cookies, USER_ID_COOKIE))
            .filter(|value| !value.is_empty())
            .map(|value| UserId(value.to_string()))
            .ok_or(ApiError::MissingIdentity)
    }
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "theme=dark; parley_user_id=u-123; lang=en";
        assert_eq!(cookie_value(header, USER_ID_COOKIE), Some("u-123"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_value_handles_single_cookie_without_spaces() {
        assert_eq!(
            cookie_value("parley_user_id=u-9", USER_ID_COOKIE),
            Some("u-9")
        );
    }
}
