//! Mock dispatchers for controller tests
//!
//! These stand in for the HTTP webhook client so the send pipeline can be
//! exercised without a network.

use crate::webhook::{
    DeliveryError, WebhookDispatch, WebhookError, WebhookRequest, WebhookResponse,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

// ============================================================================
// Mock Dispatch
// ============================================================================

/// Dispatcher that returns queued results in order
pub struct MockDispatch {
    responses: Mutex<VecDeque<Result<WebhookResponse, DeliveryError>>>,
    /// Every (request, url) pair seen
    pub requests: Mutex<Vec<(WebhookRequest, String)>>,
}

#[allow(dead_code)]
impl MockDispatch {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: WebhookResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a delivery failure
    pub fn queue_error(&self, error: DeliveryError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<(WebhookRequest, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockDispatch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookDispatch for MockDispatch {
    async fn deliver(
        &self,
        request: &WebhookRequest,
        url: &str,
    ) -> Result<WebhookResponse, DeliveryError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.clone(), url.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(DeliveryError {
                    attempts: 1,
                    last: WebhookError::network("No mock response queued"),
                })
            })
    }
}

// ============================================================================
// Gated Dispatch (for in-flight observation)
// ============================================================================

/// Dispatcher that parks until released, so tests can inspect the
/// controller mid-send
pub struct GatedDispatch {
    response: WebhookResponse,
    /// Signalled once `deliver` has been entered
    pub entered: Notify,
    /// Notify to let `deliver` return
    pub release: Notify,
}

impl GatedDispatch {
    pub fn new(response: WebhookResponse) -> Self {
        Self {
            response,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl WebhookDispatch for GatedDispatch {
    async fn deliver(
        &self,
        _request: &WebhookRequest,
        _url: &str,
    ) -> Result<WebhookResponse, DeliveryError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> WebhookRequest {
        WebhookRequest {
            input: "hi".to_string(),
            idsession: "s".to_string(),
            nrmessage: 1,
        }
    }

    #[tokio::test]
    async fn test_mock_dispatch_queue() {
        let mock = MockDispatch::new();
        mock.queue_response(WebhookResponse::success("hello"));

        let response = mock.deliver(&request(), "http://hook").await.unwrap();
        assert_eq!(response.output, "hello");

        // Nothing queued any more
        let err = mock.deliver(&request(), "http://hook").await.unwrap_err();
        assert_eq!(err.attempts, 1);

        assert_eq!(mock.recorded_requests().len(), 2);
    }
}
