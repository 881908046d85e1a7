//! Unit tests for notification intent validation and wire-request coercion.

use std::collections::HashMap;

use bazaar_push::models::{DispatchRequest, NotificationCategory, NotificationIntent};
use pretty_assertions::assert_eq;
use serde_json::json;

fn valid_intent() -> NotificationIntent {
    NotificationIntent {
        user_id: 1,
        title: "Order #1 Update".to_string(),
        body: "Your order has been placed successfully!".to_string(),
        category: NotificationCategory::OrderUpdate,
        data: HashMap::new(),
    }
}

#[test]
fn test_valid_intent_passes() {
    assert!(valid_intent().validate().is_ok());
}

#[test]
fn test_empty_title_rejected() {
    let mut intent = valid_intent();
    intent.title = String::new();
    assert!(intent.validate().is_err());
}

#[test]
fn test_whitespace_title_rejected() {
    let mut intent = valid_intent();
    intent.title = "   ".to_string();
    assert!(intent.validate().is_err());
}

#[test]
fn test_empty_body_rejected() {
    let mut intent = valid_intent();
    intent.body = String::new();
    assert!(intent.validate().is_err());
}

#[test]
fn test_dispatch_request_deserializes_with_defaults() {
    let request: DispatchRequest = serde_json::from_value(json!({
        "user_id": 9,
        "title": "Hello",
        "message": "World",
    }))
    .unwrap();

    let intent = request.into_intent();
    assert_eq!(intent.category, NotificationCategory::Generic);
    assert!(intent.data.is_empty());
}

#[test]
fn test_dispatch_request_category_wire_names() {
    let request: DispatchRequest = serde_json::from_value(json!({
        "user_id": 9,
        "title": "Hello",
        "message": "World",
        "type": "delivery_assignment",
    }))
    .unwrap();

    assert_eq!(
        request.into_intent().category,
        NotificationCategory::DeliveryAssignment
    );
}

#[test]
fn test_dispatch_request_coerces_data_values_to_strings() {
    // Provider wire formats only accept string data values; numbers and
    // booleans arriving over HTTP must be stringified, strings must stay
    // unquoted.
    let request: DispatchRequest = serde_json::from_value(json!({
        "user_id": 9,
        "title": "Order #42 Update",
        "message": "Confirmed",
        "type": "order_update",
        "data": {
            "orderId": 42,
            "express": true,
            "status": "confirmed",
        },
    }))
    .unwrap();

    let intent = request.into_intent();
    assert_eq!(intent.data["orderId"], "42");
    assert_eq!(intent.data["express"], "true");
    assert_eq!(intent.data["status"], "confirmed");
}

#[test]
fn test_unknown_category_rejected_at_deserialization() {
    let result: Result<DispatchRequest, _> = serde_json::from_value(json!({
        "user_id": 9,
        "title": "Hello",
        "message": "World",
        "type": "carrier_pigeon",
    }));

    assert!(result.is_err());
}
