//! Conversation controller
//!
//! Owns the in-memory transcript and turns user input into webhook
//! deliveries, transcript updates and user-facing notices.

mod controller;
mod state;

#[cfg(test)]
pub mod testing;

pub use controller::{ConversationController, SendOutcome};
pub use state::{SendState, SendTracker};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Bot reply appended when a message could not be delivered
pub const APOLOGY_TEXT: &str =
    "Desculpe, houve um erro ao processar sua mensagem. Por favor, tente novamente.";
/// Transient notice raised alongside the apology
pub const SEND_ERROR_NOTICE: &str = "Erro ao enviar mensagem. Tente novamente.";
/// Notice raised after a successful reset
pub const RESET_NOTICE: &str = "Conversa reiniciada com sucesso!";
/// Notice raised when the per-session message cap is reached
pub const CAP_REACHED_NOTICE: &str =
    "Limite de mensagens atingido. Reinicie a conversa para continuar.";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Epoch milliseconds
    pub timestamp: i64,
}

impl Message {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short-lived message for the presentation layer (a toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Events broadcast to subscribers (the SSE stream)
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Message { message: Message },
    Loading { loading: bool },
    Notice { notice: Notice },
    Reset { session_id: String },
}
