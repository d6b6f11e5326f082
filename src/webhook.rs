//! Webhook delivery
//!
//! Sends one user message to the configured endpoint, retries failed
//! attempts and reduces whatever comes back to a `WebhookResponse`.

mod client;
mod error;
mod normalize;
mod retry;
mod types;

#[cfg(test)]
mod proptests;

pub use client::WebhookClient;
pub use error::{DeliveryError, WebhookError};
#[cfg(test)]
pub use error::WebhookErrorKind;
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
#[cfg(test)]
pub use retry::RecordingSleeper;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Delivers a request to a webhook URL, retries included
#[async_trait]
pub trait WebhookDispatch: Send + Sync {
    async fn deliver(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, DeliveryError>;
}

#[async_trait]
impl<T: WebhookDispatch + ?Sized> WebhookDispatch for Arc<T> {
    async fn deliver(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, DeliveryError> {
        (**self).deliver(request, url).await
    }
}

/// Logging wrapper for webhook dispatchers
pub struct LoggingDispatch<D> {
    inner: D,
}

impl<D: WebhookDispatch> LoggingDispatch<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: WebhookDispatch> WebhookDispatch for LoggingDispatch<D> {
    async fn deliver(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, DeliveryError> {
        let start = std::time::Instant::now();
        let result = self.inner.deliver(request, url).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    session_id = %request.idsession,
                    nrmessage = request.nrmessage,
                    duration_ms = %duration.as_millis(),
                    output_len = response.output.len(),
                    "Webhook delivery completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    session_id = %request.idsession,
                    nrmessage = request.nrmessage,
                    duration_ms = %duration.as_millis(),
                    attempts = e.attempts,
                    error = %e.last,
                    "Webhook delivery failed"
                );
            }
        }

        result
    }
}
