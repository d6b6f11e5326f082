//! Server-Sent Events support

use crate::conversation::ChatEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream, starting with an `init` snapshot
pub fn sse_stream(
    init: Value,
    broadcast_rx: tokio::sync::broadcast::Receiver<ChatEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(Event::default().event("init").data(init.to_string()))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(chat_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn chat_event_to_axum(event: ChatEvent) -> Event {
    let (event_type, data) = chat_event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

fn chat_event_payload(event: ChatEvent) -> (&'static str, Value) {
    match event {
        ChatEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        ChatEvent::Loading { loading } => (
            "loading",
            json!({
                "type": "loading",
                "loading": loading
            }),
        ),
        ChatEvent::Notice { notice } => (
            "notice",
            json!({
                "type": "notice",
                "level": notice.level,
                "text": notice.text
            }),
        ),
        ChatEvent::Reset { session_id } => (
            "reset",
            json!({
                "type": "reset",
                "session_id": session_id
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Notice};

    #[test]
    fn test_notice_payload() {
        let (kind, data) = chat_event_payload(ChatEvent::Notice {
            notice: Notice::error("falhou"),
        });
        assert_eq!(kind, "notice");
        assert_eq!(data, json!({ "type": "notice", "level": "error", "text": "falhou" }));
    }

    #[test]
    fn test_message_payload() {
        let message = Message::bot("Oi!");
        let (kind, data) = chat_event_payload(ChatEvent::Message {
            message: message.clone(),
        });
        assert_eq!(kind, "message");
        assert_eq!(data["message"]["id"], message.id);
        assert_eq!(data["message"]["sender"], "bot");
    }
}
