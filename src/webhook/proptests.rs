//! Property-based tests for response normalization
//!
//! - Non-JSON text always comes back verbatim
//! - Shape priority holds: array over data wrapper over generic fields
//! - Every accepted JSON object yields a non-empty output

use super::normalize::{normalize_body, normalize_value, RECEIVED_TEXT};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,]{1,60}".prop_filter("must contain a non-space", |s| !s.trim().is_empty())
}

/// Flat JSON objects with arbitrary keys and scalar values
fn arb_object() -> impl Strategy<Value = Value> {
    prop::collection::hash_map(
        prop_oneof![
            Just("status".to_string()),
            Just("output".to_string()),
            Just("message".to_string()),
            Just("response".to_string()),
            "[a-z]{1,8}",
        ],
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z ]{0,20}".prop_map(Value::String),
        ],
        0..6,
    )
    .prop_map(|m| Value::Object(m.into_iter().collect()))
}

proptest! {
    #[test]
    fn non_json_text_is_verbatim(text in arb_text()) {
        prop_assume!(serde_json::from_str::<Value>(&text).is_err());
        let resp = normalize_body(&text).unwrap();
        prop_assert_eq!(resp.status, "success");
        prop_assert_eq!(resp.output, text);
    }

    #[test]
    fn array_head_output_wins(head in arb_text(), rest in prop::collection::vec(arb_text(), 0..3)) {
        let mut items = vec![json!({ "output": head.clone(), "data": "ignored" })];
        items.extend(rest.into_iter().map(|r| json!({ "output": r })));
        let resp = normalize_value(&Value::Array(items)).unwrap();
        prop_assert_eq!(resp.output, head);
    }

    #[test]
    fn data_wrapper_wins_over_generic_fields(inner in arb_text(), outer in arb_text()) {
        let body = json!({ "data": { "output": inner.clone() }, "output": outer, "status": "error" });
        let resp = normalize_value(&body).unwrap();
        prop_assert_eq!(resp.status, "success");
        prop_assert_eq!(resp.output, inner);
    }

    #[test]
    fn objects_always_yield_output(body in arb_object()) {
        let resp = normalize_value(&body).unwrap();
        prop_assert!(!resp.status.is_empty());
        prop_assert!(!resp.output.is_empty());
    }

    #[test]
    fn objects_without_text_fields_are_received(extra in "[a-z]{9,12}", value in any::<i64>()) {
        let mut map = serde_json::Map::new();
        map.insert(extra, json!(value));
        let body = Value::Object(map);
        prop_assert_eq!(normalize_value(&body).unwrap().output, RECEIVED_TEXT);
    }
}
