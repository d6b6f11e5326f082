//! Persistent session store
//!
//! Typed session operations (id, message counter, webhook URL) over a
//! pluggable string key-value backend.

#[cfg(test)]
mod memory;
mod session;
mod sqlite;

#[cfg(test)]
mod proptests;

#[cfg(test)]
pub use memory::MemoryStore;
pub use session::{SessionState, SessionStore};
pub use sqlite::SqliteStore;

use std::sync::Arc;
use thiserror::Error;

/// Key holding the current session identifier
pub const SESSION_ID_KEY: &str = "whatsapp_chatbot_session_id";
/// Key holding the outbound message counter
pub const MESSAGE_COUNT_KEY: &str = "whatsapp_chatbot_message_count";
/// Key holding the configured webhook URL
pub const WEBHOOK_URL_KEY: &str = "whatsapp_webhook_url";

/// Endpoint used when no webhook URL has been configured
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://primary-production-7d89.up.railway.app/webhook/I.Nova%20Hub";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Store lock poisoned")]
    Poisoned,
    #[error("Message counter overflow at {0}")]
    CounterOverflow(u64),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable string key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }
}
