//! HTTP surface: assistant/thread CRUD, run creation with SSE streaming,
//! and multipart document ingest.

use axum::Router;

pub mod http;
pub mod ingest;
pub mod runs;
pub mod service;
pub mod sse;

pub use service::{ApiError, AppState, UserId, USER_ID_COOKIE};

/// Assemble the full API router over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(http::health_routes())
        .merge(http::assistant_routes())
        .merge(http::thread_routes())
        .merge(runs::run_routes())
        .merge(ingest::ingest_routes())
        .with_state(state)
}
