//! Session state operations over a key-value backend

use super::{
    KeyValueStore, StoreError, StoreResult, DEFAULT_WEBHOOK_URL, MESSAGE_COUNT_KEY,
    SESSION_ID_KEY, WEBHOOK_URL_KEY,
};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

/// Point-in-time view of the persisted session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub session_id: String,
    pub message_count: u64,
    pub webhook_url: String,
}

/// Session id, message counter and webhook URL, persisted in `K`.
///
/// Read-modify-write operations (`increment_message_count`, `reset_session`,
/// lazy id creation) are serialized through an internal lock so they never
/// interleave with one another.
pub struct SessionStore<K> {
    kv: K,
    default_webhook_url: String,
    reset_baseline: u64,
    write_lock: Mutex<()>,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            default_webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            reset_baseline: 0,
            write_lock: Mutex::new(()),
        }
    }

    /// Override the URL returned when none is stored
    pub fn with_default_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.default_webhook_url = url.into();
        self
    }

    /// Counter value written by `reset_session`
    pub fn with_reset_baseline(mut self, baseline: u64) -> Self {
        self.reset_baseline = baseline;
        self
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Current session id, creating and persisting one if absent
    pub fn session_id(&self) -> StoreResult<String> {
        let _guard = self.lock()?;
        if let Some(id) = self.kv.get(SESSION_ID_KEY)?.filter(|id| !id.is_empty()) {
            return Ok(id);
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.kv.set(SESSION_ID_KEY, &id)?;
        tracing::info!(session_id = %id, "Created new session");
        Ok(id)
    }

    /// Persisted message counter, 0 when unset
    pub fn message_count(&self) -> StoreResult<u64> {
        let Some(raw) = self.kv.get(MESSAGE_COUNT_KEY)? else {
            return Ok(0);
        };
        match raw.trim().parse::<u64>() {
            Ok(count) => Ok(count),
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "Unreadable message count, treating as 0");
                Ok(0)
            }
        }
    }

    #[allow(dead_code)] // API completeness
    pub fn set_message_count(&self, count: u64) -> StoreResult<()> {
        let _guard = self.lock()?;
        self.kv.set(MESSAGE_COUNT_KEY, &count.to_string())
    }

    /// Add one to the counter and return the new value. A counter already
    /// at `u64::MAX` is left untouched and reported as an error.
    pub fn increment_message_count(&self) -> StoreResult<u64> {
        let _guard = self.lock()?;
        let current = self.message_count()?;
        let count = current
            .checked_add(1)
            .ok_or(StoreError::CounterOverflow(current))?;
        self.kv.set(MESSAGE_COUNT_KEY, &count.to_string())?;
        Ok(count)
    }

    /// Configured webhook URL, or the default when unset or empty
    pub fn webhook_url(&self) -> StoreResult<String> {
        Ok(self
            .kv
            .get(WEBHOOK_URL_KEY)?
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.default_webhook_url.clone()))
    }

    /// Persist a webhook URL. Not validated; a bad URL fails at send time.
    pub fn set_webhook_url(&self, url: &str) -> StoreResult<()> {
        self.kv.set(WEBHOOK_URL_KEY, url)
    }

    /// Start a new conversation: fresh id, counter back to the baseline
    pub fn reset_session(&self) -> StoreResult<String> {
        let _guard = self.lock()?;
        let id = uuid::Uuid::new_v4().to_string();
        self.kv.set(SESSION_ID_KEY, &id)?;
        self.kv
            .set(MESSAGE_COUNT_KEY, &self.reset_baseline.to_string())?;
        tracing::info!(session_id = %id, baseline = self.reset_baseline, "Session reset");
        Ok(id)
    }

    pub fn snapshot(&self) -> StoreResult<SessionState> {
        Ok(SessionState {
            session_id: self.session_id()?,
            message_count: self.message_count()?,
            webhook_url: self.webhook_url()?,
        })
    }
}
