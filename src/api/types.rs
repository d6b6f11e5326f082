//! API request and response types

use crate::conversation::{Message, SendOutcome, SendState};
use crate::store::SessionState;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Current conversation view
#[derive(Debug, Serialize)]
pub struct ChatStateResponse {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub state: SendState,
    pub session: SessionState,
}

/// Result of a send
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub outcome: SendOutcome,
    pub messages: Vec<Message>,
}

/// Response for a conversation reset
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session_id: String,
}

/// Webhook endpoint setting, used for both reads and updates
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
