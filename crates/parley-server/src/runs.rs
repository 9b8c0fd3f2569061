//! Run creation: the one route where HTTP hands off to the runtime.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parley_contract::executor::RunContext;
use serde::Deserialize;
use serde_json::Value;

use crate::service::{ApiError, AppState, UserId};
use crate::sse;

pub const RUNS_PATH: &str = "/runs";

pub fn run_routes() -> Router<AppState> {
    Router::new().route(RUNS_PATH, post(create_run))
}

#[derive(Debug, Deserialize)]
struct CreateRunRequest {
    assistant_id: String,
    thread_id: String,
    /// Raw run input; its schema belongs to the executor.
    input: Value,
    #[serde(default = "default_stream")]
    stream: bool,
}

fn default_stream() -> bool {
    true
}

/// Start a run against an assistant on a thread.
///
/// With `stream: true` the response is a live SSE stream of run events.
/// With `stream: false` the run is detached: the response acknowledges that
/// the run was started, and its outcome is only recorded in the server log.
async fn create_run(
    State(state): State<AppState>,
    user: UserId,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: CreateRunRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid run request: {e}")))?;

    let (assistant, history) = tokio::try_join!(
        state.storage.get_assistant(&user.0, &request.assistant_id),
        state
            .storage
            .get_thread_messages(&user.0, &request.thread_id),
    )?;

    let ctx = RunContext::new(
        user.0,
        request.assistant_id,
        request.thread_id,
        assistant.config,
    );
    let new_messages = state
        .runtime
        .executor()
        .validate_input(&ctx, &request.input)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if request.stream {
        let run = state.runtime.start_streaming_run(ctx, history, new_messages);
        Ok(sse::run_stream_response(run))
    } else {
        state.runtime.start_detached_run(ctx, history, new_messages);
        Ok(Json(serde_json::json!({ "status": "ok" })).into_response())
    }
}
