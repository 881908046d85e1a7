//! Notification templates.
//!
//! Thin translation layer from domain events to notification intents: a
//! lookup table of title/body strings per order status plus the
//! structured-data keys the client apps expect (`orderId`, `status`,
//! deep-link `url`, ...).

use std::collections::HashMap;

use crate::models::{
    DeliveryAssignmentEvent, NotificationCategory, NotificationIntent, OrderStatusEvent,
};

/// Body text for a customer-facing order status change
fn order_status_message(status: &str) -> String {
    match status {
        "placed" => "Your order has been placed successfully!".to_string(),
        "confirmed" => "Your order has been confirmed by the store".to_string(),
        "preparing" => "Your order is being prepared".to_string(),
        "ready_for_pickup" => "Your order is ready for pickup".to_string(),
        "assigned" => "A delivery partner has been assigned to your order".to_string(),
        "picked_up" => "Your order has been picked up for delivery".to_string(),
        "out_for_delivery" => "Your order is out for delivery".to_string(),
        "delivered" => "Your order has been delivered successfully!".to_string(),
        "cancelled" => "Your order has been cancelled".to_string(),
        other => format!("Your order status has been updated: {}", other),
    }
}

/// Builds the intent for an order status change
pub fn order_status_intent(event: &OrderStatusEvent, public_url: &str) -> NotificationIntent {
    let mut data = HashMap::new();
    data.insert("orderId".to_string(), event.order_id.to_string());
    data.insert("status".to_string(), event.status.clone());
    data.insert(
        "url".to_string(),
        format!("{}/orders/{}/tracking", public_url, event.order_id),
    );

    NotificationIntent {
        user_id: event.user_id,
        title: format!("Order #{} Update", event.order_id),
        body: order_status_message(&event.status),
        category: NotificationCategory::OrderUpdate,
        data,
    }
}

/// Builds the intent offering a delivery job to a partner
pub fn delivery_assignment_intent(
    event: &DeliveryAssignmentEvent,
    public_url: &str,
) -> NotificationIntent {
    let mut data = HashMap::new();
    data.insert("orderId".to_string(), event.order_id.to_string());
    data.insert("pickupAddress".to_string(), event.pickup_address.clone());
    data.insert(
        "deliveryAddress".to_string(),
        event.delivery_address.clone(),
    );
    data.insert("earnings".to_string(), event.earnings.to_string());
    data.insert(
        "url".to_string(),
        format!("{}/delivery-partner/dashboard", public_url),
    );

    NotificationIntent {
        user_id: event.user_id,
        title: "New Delivery Assignment".to_string(),
        body: format!(
            "Earn Rs. {} - Pickup from {}",
            event.earnings, event.pickup_address
        ),
        category: NotificationCategory::DeliveryAssignment,
        data,
    }
}

/// Builds the canned test intent used to verify a device's push setup
pub fn test_intent(user_id: i32) -> NotificationIntent {
    NotificationIntent {
        user_id,
        title: "Test from Siraha Bazaar".to_string(),
        body: "Push notifications are working correctly!".to_string(),
        category: NotificationCategory::Test,
        data: HashMap::new(),
    }
}
