//! Webhook error types

use thiserror::Error;

/// Failure of a single delivery attempt
#[derive(Debug, Error)]
#[error("{message}")]
pub struct WebhookError {
    pub kind: WebhookErrorKind,
    pub message: String,
    /// HTTP status, when the endpoint answered
    pub status: Option<u16>,
}

impl WebhookError {
    pub fn new(kind: WebhookErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(WebhookErrorKind::Network, message)
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        let mut err = Self::new(
            WebhookErrorKind::HttpStatus,
            format!("HTTP {status}: {body}"),
        );
        err.status = Some(status);
        err
    }

    pub fn empty_response() -> Self {
        Self::new(WebhookErrorKind::EmptyResponse, "Empty response from webhook")
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::new(WebhookErrorKind::MalformedPayload, message)
    }
}

/// Error classification. Every kind counts against the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookErrorKind {
    /// DNS, connection refused, transport timeout, unreadable body
    Network,
    /// Endpoint answered outside 2xx
    HttpStatus,
    /// 2xx with an empty or whitespace-only body
    EmptyResponse,
    /// JSON body with no usable shape (e.g. `null`)
    MalformedPayload,
}

impl WebhookErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::HttpStatus => "http_status",
            Self::EmptyResponse => "empty_response",
            Self::MalformedPayload => "malformed_payload",
        }
    }
}

/// Retry budget exhausted
#[derive(Debug, Error)]
#[error("webhook delivery failed after {attempts} attempt(s): {last}")]
pub struct DeliveryError {
    pub attempts: u32,
    #[source]
    pub last: WebhookError,
}
