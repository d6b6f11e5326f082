//! webhook-chat - chat backend that relays messages to a webhook
//!
//! Keeps a session (id, message counter, endpoint) in SQLite, forwards each
//! user message to the configured webhook with retry, and serves the
//! transcript over a small JSON/SSE API.

mod api;
mod config;
mod conversation;
mod store;
mod webhook;

use api::{create_router, AppState};
use config::AppConfig;
use conversation::ConversationController;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use store::{SessionStore, SqliteStore};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webhook::{LoggingDispatch, WebhookClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webhook_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path, "Opening session store");
    let store = Arc::new(
        SessionStore::new(SqliteStore::open(&config.db_path)?)
            .with_default_webhook_url(config.default_webhook_url.clone())
            .with_reset_baseline(config.reset_baseline),
    );

    let session = store.snapshot()?;
    tracing::info!(
        session_id = %session.session_id,
        message_count = session.message_count,
        webhook_url = %session.webhook_url,
        max_retries = config.retry.max_retries,
        retry_delay_ms = %config.retry.retry_delay.as_millis(),
        message_cap = ?config.message_cap,
        "Session loaded"
    );

    let client = WebhookClient::new(config.retry)?;
    let controller = ConversationController::new(store, LoggingDispatch::new(client))
        .with_message_cap(config.message_cap);
    let state = AppState::new(controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("webhook-chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
