//! HTTP webhook client with fixed-delay retry

use super::normalize::normalize_body;
use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::{DeliveryError, WebhookDispatch, WebhookError, WebhookRequest, WebhookResponse};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Transport-level timeout for one attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Posts chat messages to a webhook and normalizes the reply
pub struct WebhookClient<S = TokioSleeper> {
    client: Client,
    policy: RetryPolicy,
    sleeper: S,
}

impl WebhookClient<TokioSleeper> {
    pub fn new(policy: RetryPolicy) -> reqwest::Result<Self> {
        Self::with_sleeper(policy, TokioSleeper)
    }
}

impl<S: Sleeper> WebhookClient<S> {
    pub fn with_sleeper(policy: RetryPolicy, sleeper: S) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            policy,
            sleeper,
        })
    }

    /// Deliver one message, retrying any failed attempt until the budget
    /// in `RetryPolicy::max_retries` is spent.
    pub async fn send(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, DeliveryError> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;

        loop {
            tracing::info!(
                attempt,
                max_attempts,
                url = %url,
                session_id = %request.idsession,
                nrmessage = request.nrmessage,
                "Sending message to webhook"
            );

            match self.attempt(request, url).await {
                Ok(response) => {
                    tracing::info!(attempt, status = %response.status, "Webhook replied");
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        kind = e.kind.as_str(),
                        error = %e,
                        "Webhook attempt failed"
                    );

                    if attempt >= max_attempts {
                        tracing::error!(attempts = attempt, url = %url, "Webhook retries exhausted");
                        return Err(DeliveryError { attempts: attempt, last: e });
                    }

                    tracing::debug!(
                        delay_ms = %self.policy.retry_delay.as_millis(),
                        "Retrying webhook"
                    );
                    self.sleeper.sleep(self.policy.retry_delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, WebhookError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WebhookError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    WebhookError::network(format!("Connection failed: {e}"))
                } else {
                    WebhookError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WebhookError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(WebhookError::http_status(status.as_u16(), &body));
        }

        tracing::debug!(body = %body, "Raw webhook response");

        if body.trim().is_empty() {
            return Err(WebhookError::empty_response());
        }

        normalize_body(&body)
    }
}

#[async_trait]
impl<S: Sleeper> WebhookDispatch for WebhookClient<S> {
    async fn deliver(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, DeliveryError> {
        self.send(request, url).await
    }
}
