//! Response normalization
//!
//! Upstream workflows answer in several dialects. Detectors run in a fixed
//! order and the first one that matches wins:
//!
//! 1. array: `[{ "output": ... }, ...]`
//! 2. data wrapper: `{ "data": ... }` (n8n style)
//! 3. generic: `{ "status"?, "output" | "message" | "response" }` or a bare JSON string
//!
//! A body that is not JSON at all is used verbatim as the output.
//!
//! A JSON `null` body, or an array whose first element is `null`, is not
//! echoed back as text. It fails the attempt as `MalformedPayload`, so the
//! client retries it like any other bad reply.

use super::{WebhookError, WebhookResponse};
use serde_json::Value;

/// Output used when an array reply carries no `output`
pub const MISSING_OUTPUT_TEXT: &str = "Sem resposta definida";
/// Output used when a reply is accepted but has no recognizable text
pub const RECEIVED_TEXT: &str = "Resposta recebida";

const SUCCESS: &str = "success";

type Detector = fn(&Value) -> Option<Result<WebhookResponse, WebhookError>>;

const DETECTORS: &[(&str, Detector)] = &[
    ("array", detect_array),
    ("data_wrapper", detect_data_wrapper),
    ("generic", detect_generic),
];

/// Normalize a non-blank response body
pub fn normalize_body(body: &str) -> Result<WebhookResponse, WebhookError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize_value(&value),
        Err(e) => {
            tracing::debug!(error = %e, "Webhook body is not JSON, using raw text");
            Ok(WebhookResponse::success(body))
        }
    }
}

/// Normalize an already-parsed JSON body
pub fn normalize_value(value: &Value) -> Result<WebhookResponse, WebhookError> {
    if value.is_null() {
        return Err(WebhookError::malformed_payload("Webhook returned JSON null"));
    }

    for (shape, detect) in DETECTORS {
        if let Some(result) = detect(value) {
            tracing::debug!(shape, "Detected webhook response shape");
            return result;
        }
    }

    Err(WebhookError::malformed_payload(format!(
        "Unrecognized webhook response: {value}"
    )))
}

fn detect_array(value: &Value) -> Option<Result<WebhookResponse, WebhookError>> {
    let first = value.as_array()?.first()?;
    if first.is_null() {
        return Some(Err(WebhookError::malformed_payload(
            "First element of webhook array is null",
        )));
    }

    let output =
        truthy_field(first, "output").map_or_else(|| MISSING_OUTPUT_TEXT.to_string(), render);
    Some(Ok(WebhookResponse::success(output)))
}

fn detect_data_wrapper(value: &Value) -> Option<Result<WebhookResponse, WebhookError>> {
    let data = truthy_field(value, "data")?;

    let output = match data {
        Value::String(text) => text.clone(),
        _ => truthy_field(data, "output")
            .or_else(|| truthy_field(data, "message"))
            .map(render)
            .unwrap_or_else(|| match data {
                Value::Object(_) | Value::Array(_) => data.to_string(),
                _ => RECEIVED_TEXT.to_string(),
            }),
    };

    Some(Ok(WebhookResponse {
        status: SUCCESS.to_string(),
        output,
        data: Some(data.clone()),
    }))
}

fn detect_generic(value: &Value) -> Option<Result<WebhookResponse, WebhookError>> {
    let status = truthy_field(value, "status").map_or_else(|| SUCCESS.to_string(), render);

    let output = ["output", "message", "response"]
        .iter()
        .find_map(|key| truthy_field(value, key))
        .map(render)
        .or_else(|| value.as_str().map(str::to_string))
        .unwrap_or_else(|| RECEIVED_TEXT.to_string());

    Some(Ok(WebhookResponse {
        status,
        output,
        data: None,
    }))
}

fn truthy_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| is_truthy(v))
}

/// Dynamic truthiness: `null`, `false`, `0` and `""` are falsy; every
/// object and array is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
