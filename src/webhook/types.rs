//! Wire and normalized payload types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound payload, one per user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub input: String,
    pub idsession: String,
    pub nrmessage: u64,
}

/// Upstream reply reduced to a single shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookResponse {
    pub status: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl WebhookResponse {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            output: output.into(),
            data: None,
        }
    }

    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }
}
