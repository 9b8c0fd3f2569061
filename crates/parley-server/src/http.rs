//! Assistant and thread CRUD routes.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use parley_contract::thread::{Assistant, Message, Thread};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::{ApiError, AppState, UserId};

pub const HEALTH_PATH: &str = "/health";
pub const ASSISTANTS_PATH: &str = "/assistants";
pub const PUBLIC_ASSISTANTS_PATH: &str = "/assistants/public";
pub const ASSISTANT_PATH: &str = "/assistants/{aid}";
pub const THREADS_PATH: &str = "/threads";
pub const THREAD_PATH: &str = "/threads/{tid}";
pub const THREAD_MESSAGES_PATH: &str = "/threads/{tid}/messages";

pub fn health_routes() -> Router<AppState> {
    Router::new().route(HEALTH_PATH, get(health))
}

pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route(ASSISTANTS_PATH, get(list_assistants))
        .route(PUBLIC_ASSISTANTS_PATH, get(list_public_assistants))
        .route(ASSISTANT_PATH, put(put_assistant))
}

pub fn thread_routes() -> Router<AppState> {
    Router::new()
        .route(THREADS_PATH, get(list_threads))
        .route(THREAD_PATH, put(put_thread))
        .route(THREAD_MESSAGES_PATH, get(get_thread_messages))
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_assistants(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<Assistant>>, ApiError> {
    Ok(Json(state.storage.list_assistants(&user.0).await?))
}

#[derive(Debug, Deserialize)]
struct PublicAssistantsQuery {
    shared_id: Option<String>,
}

/// Public listing: the configured featured assistants plus, when given, one
/// explicitly shared id. No identity cookie required.
async fn list_public_assistants(
    State(state): State<AppState>,
    Query(query): Query<PublicAssistantsQuery>,
) -> Result<Json<Vec<Assistant>>, ApiError> {
    let mut ids: Vec<String> = state.featured_assistants.as_ref().clone();
    if let Some(shared_id) = query.shared_id {
        if !ids.contains(&shared_id) {
            ids.push(shared_id);
        }
    }
    Ok(Json(state.storage.list_public_assistants(&ids).await?))
}

#[derive(Debug, Deserialize)]
struct AssistantPayload {
    name: String,
    config: Value,
    #[serde(default)]
    public: bool,
}

async fn put_assistant(
    State(state): State<AppState>,
    user: UserId,
    Path(aid): Path<String>,
    Json(payload): Json<AssistantPayload>,
) -> Result<Json<Assistant>, ApiError> {
    let assistant =
        Assistant::new(aid, payload.name, payload.config).with_public(payload.public);
    Ok(Json(state.storage.put_assistant(&user.0, assistant).await?))
}

async fn list_threads(
    State(state): State<AppState>,
    user: UserId,
) -> Result<Json<Vec<Thread>>, ApiError> {
    Ok(Json(state.storage.list_threads(&user.0).await?))
}

#[derive(Debug, Deserialize)]
struct ThreadPayload {
    name: String,
    assistant_id: Option<String>,
}

async fn put_thread(
    State(state): State<AppState>,
    user: UserId,
    Path(tid): Path<String>,
    Json(payload): Json<ThreadPayload>,
) -> Result<Json<Thread>, ApiError> {
    let mut thread = Thread::new(tid, payload.name);
    if let Some(assistant_id) = payload.assistant_id {
        thread = thread.with_assistant(assistant_id);
    }
    Ok(Json(state.storage.put_thread(&user.0, thread).await?))
}

#[derive(Debug, Serialize)]
struct MessagesResponse {
    messages: Vec<Message>,
}

async fn get_thread_messages(
    State(state): State<AppState>,
    user: UserId,
    Path(tid): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = state.storage.get_thread_messages(&user.0, &tid).await?;
    Ok(Json(MessagesResponse { messages }))
}
