//! Domain event DTOs consumed from the order/delivery layer.
//!
//! These arrive over HTTP from the marketplace backend and are translated
//! into notification intents by the template table in
//! `services::templates`.

use serde::Deserialize;

/// An order changed status (placed, confirmed, delivered, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusEvent {
    pub user_id: i32,
    pub order_id: i64,
    pub status: String,
}

/// A delivery partner was offered or assigned a delivery job
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryAssignmentEvent {
    pub user_id: i32,
    pub order_id: i64,
    pub pickup_address: String,
    pub delivery_address: String,
    pub earnings: i64,
}
