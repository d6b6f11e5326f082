//! Message send pipeline

use super::{
    ChatEvent, Message, Notice, SendState, SendTracker, APOLOGY_TEXT, CAP_REACHED_NOTICE,
    RESET_NOTICE, SEND_ERROR_NOTICE,
};
use crate::store::{KeyValueStore, SessionState, SessionStore, StoreError, StoreResult};
use crate::webhook::{WebhookDispatch, WebhookRequest};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result of one `send_message` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// Message cap reached, nothing was sent
    CapReached,
    /// Bot reply appended
    Delivered,
    /// Apology appended (or the message could not be accepted)
    Failed,
}

pub struct ConversationController<K, D> {
    store: Arc<SessionStore<K>>,
    dispatch: D,
    message_cap: Option<u64>,
    transcript: Mutex<Vec<Message>>,
    tracker: Mutex<SendTracker>,
    events: broadcast::Sender<ChatEvent>,
}

impl<K: KeyValueStore, D: WebhookDispatch> ConversationController<K, D> {
    pub fn new(store: Arc<SessionStore<K>>, dispatch: D) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            dispatch,
            message_cap: None,
            transcript: Mutex::new(Vec::new()),
            tracker: Mutex::new(SendTracker::default()),
            events,
        }
    }

    /// Refuse sends once the stored counter reaches `cap`
    pub fn with_message_cap(mut self, cap: Option<u64>) -> Self {
        self.message_cap = cap;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.transcript).clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.tracker).is_loading()
    }

    pub fn send_state(&self) -> SendState {
        lock(&self.tracker).state()
    }

    pub fn session_state(&self) -> StoreResult<SessionState> {
        self.store.snapshot()
    }

    pub fn webhook_url(&self) -> StoreResult<String> {
        self.store.webhook_url()
    }

    pub fn set_webhook_url(&self, url: &str) -> StoreResult<()> {
        self.store.set_webhook_url(url)?;
        tracing::info!(url = %url, "Webhook URL updated");
        Ok(())
    }

    /// Send one user message and append the reply (or an apology).
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        let accepted = match self.accept(text) {
            Ok(Some(accepted)) => accepted,
            Ok(None) => return SendOutcome::CapReached,
            Err(e) => {
                tracing::error!(error = %e, "Session store unavailable, message not sent");
                self.notify(Notice::error(SEND_ERROR_NOTICE));
                return SendOutcome::Failed;
            }
        };

        self.append(Message::user(text));
        self.begin();

        let outcome = match self.dispatch.deliver(&accepted.request, &accepted.url).await {
            Ok(response) if response.has_output() => {
                self.append(Message::bot(response.output));
                SendOutcome::Delivered
            }
            Ok(response) => {
                tracing::error!(status = %response.status, "Webhook reply has no usable output");
                self.fail();
                SendOutcome::Failed
            }
            Err(e) => {
                tracing::error!(attempts = e.attempts, error = %e, "Failed to deliver message");
                self.fail();
                SendOutcome::Failed
            }
        };

        self.settle(outcome == SendOutcome::Delivered);
        outcome
    }

    /// Drop the transcript and start a brand-new session
    pub fn reset_chat(&self) -> StoreResult<String> {
        let session_id = self.store.reset_session()?;
        lock(&self.transcript).clear();

        let _ = self.events.send(ChatEvent::Reset {
            session_id: session_id.clone(),
        });
        self.notify(Notice::success(RESET_NOTICE));
        tracing::info!(session_id = %session_id, "Conversation reset");
        Ok(session_id)
    }

    /// Check the cap, then claim the next message number.
    /// Returns `None` when the cap has been reached.
    fn accept(&self, text: &str) -> Result<Option<Accepted>, StoreError> {
        if let Some(cap) = self.message_cap {
            let count = self.store.message_count()?;
            if count >= cap {
                tracing::warn!(count, cap, "Message cap reached, refusing send");
                self.notify(Notice::error(CAP_REACHED_NOTICE));
                return Ok(None);
            }
        }

        let session_id = self.store.session_id()?;
        let url = self.store.webhook_url()?;
        let nrmessage = self.store.increment_message_count()?;

        tracing::info!(session_id = %session_id, nrmessage, "Message accepted");

        Ok(Some(Accepted {
            request: WebhookRequest {
                input: text.to_string(),
                idsession: session_id,
                nrmessage,
            },
            url,
        }))
    }

    fn append(&self, message: Message) {
        lock(&self.transcript).push(message.clone());
        let _ = self.events.send(ChatEvent::Message { message });
    }

    fn fail(&self) {
        self.append(Message::bot(APOLOGY_TEXT));
        self.notify(Notice::error(SEND_ERROR_NOTICE));
    }

    fn notify(&self, notice: Notice) {
        let _ = self.events.send(ChatEvent::Notice { notice });
    }

    fn begin(&self) {
        lock(&self.tracker).begin();
        let _ = self.events.send(ChatEvent::Loading { loading: true });
    }

    fn settle(&self, delivered: bool) {
        let loading = {
            let mut tracker = lock(&self.tracker);
            tracker.complete(delivered);
            tracker.settle();
            tracker.is_loading()
        };
        let _ = self.events.send(ChatEvent::Loading { loading });
    }
}

struct Accepted {
    request: WebhookRequest,
    url: String,
}

/// Transcript and tracker updates are plain assignments, so a poisoned
/// lock still holds consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
