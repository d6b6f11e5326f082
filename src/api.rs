//! HTTP API for the chat front-end

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::conversation::ConversationController;
use crate::store::SqliteStore;
use crate::webhook::{LoggingDispatch, WebhookClient};
use std::sync::Arc;

/// Controller type wired up in production
pub type ProductionController = ConversationController<SqliteStore, LoggingDispatch<WebhookClient>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ProductionController>,
}

impl AppState {
    pub fn new(controller: ProductionController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
