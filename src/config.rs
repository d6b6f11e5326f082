//! Service configuration from the environment

use crate::store::DEFAULT_WEBHOOK_URL;
use crate::webhook::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use std::str::FromStr;
use std::time::Duration;

/// Counter value written when a conversation is reset
pub const DEFAULT_RESET_BASELINE: u64 = 0;
/// Sends refused once the stored counter reaches this value (0 disables)
pub const DEFAULT_MESSAGE_CAP: u64 = 9;
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub port: u16,
    pub default_webhook_url: String,
    pub retry: RetryPolicy,
    pub reset_baseline: u64,
    /// `None` disables the cap
    pub message_cap: Option<u64>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("WEBHOOK_CHAT_DB_PATH").unwrap_or_else(|| {
            let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
            format!("{home}/.webhook-chat/session.db")
        });

        let default_webhook_url = lookup("WEBHOOK_CHAT_DEFAULT_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string());

        let max_retries = parse_or(&lookup, "WEBHOOK_CHAT_MAX_RETRIES", DEFAULT_MAX_RETRIES);
        let retry_delay_ms = parse_or(
            &lookup,
            "WEBHOOK_CHAT_RETRY_DELAY_MS",
            u64::try_from(DEFAULT_RETRY_DELAY.as_millis()).unwrap_or(1500),
        );
        let cap = parse_or(&lookup, "WEBHOOK_CHAT_MESSAGE_CAP", DEFAULT_MESSAGE_CAP);

        Self {
            db_path,
            port: parse_or(&lookup, "WEBHOOK_CHAT_PORT", DEFAULT_PORT),
            default_webhook_url,
            retry: RetryPolicy::new(max_retries, Duration::from_millis(retry_delay_ms)),
            reset_baseline: parse_or(&lookup, "WEBHOOK_CHAT_RESET_BASELINE", DEFAULT_RESET_BASELINE),
            message_cap: (cap > 0).then_some(cap),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
    }
}
