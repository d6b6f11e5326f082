//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ChatStateResponse, ErrorResponse, ResetResponse, WebhookConfig,
};
use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", get(get_chat).post(send_chat))
        .route("/api/chat/reset", post(reset_chat))
        .route("/api/chat/stream", get(stream_chat))
        .route(
            "/api/config/webhook",
            get(get_webhook_config).put(put_webhook_config),
        )
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation
// ============================================================

async fn get_chat(State(state): State<AppState>) -> Result<Json<ChatStateResponse>, AppError> {
    let controller = &state.controller;
    let session = controller
        .session_state()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ChatStateResponse {
        messages: controller.messages(),
        loading: controller.is_loading(),
        state: controller.send_state(),
        session,
    }))
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    // Run on its own task so a client disconnect cannot abandon the send
    // halfway through its retries.
    let controller = state.controller.clone();
    let outcome = tokio::spawn(async move { controller.send_message(&req.text).await })
        .await
        .map_err(|e| AppError::Internal(format!("Send task failed: {e}")))?;

    Ok(Json(ChatResponse {
        outcome,
        messages: state.controller.messages(),
    }))
}

async fn reset_chat(State(state): State<AppState>) -> Result<Json<ResetResponse>, AppError> {
    let session_id = state
        .controller
        .reset_chat()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ResetResponse { session_id }))
}

async fn stream_chat(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let controller = &state.controller;
    // Subscribe before taking the snapshot so no event falls in between
    let rx = controller.subscribe();
    let session = controller
        .session_state()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let init = json!({
        "type": "init",
        "messages": controller.messages(),
        "loading": controller.is_loading(),
        "state": controller.send_state(),
        "session": session,
    });

    Ok(sse_stream(init, rx))
}

// ============================================================
// Settings
// ============================================================

async fn get_webhook_config(
    State(state): State<AppState>,
) -> Result<Json<WebhookConfig>, AppError> {
    let url = state
        .controller
        .webhook_url()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(WebhookConfig { url }))
}

async fn put_webhook_config(
    State(state): State<AppState>,
    Json(req): Json<WebhookConfig>,
) -> Result<Json<WebhookConfig>, AppError> {
    state
        .controller
        .set_webhook_url(&req.url)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let url = state
        .controller
        .webhook_url()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(WebhookConfig { url }))
}

async fn get_version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
