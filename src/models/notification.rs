//! Notification models.
//!
//! The `NotificationIntent` is the ephemeral input to a dispatch call; the
//! `NotificationRecord` is the durable in-app log entry written once per
//! dispatch regardless of push outcome. The two are deliberately decoupled:
//! the record is the source of truth for "what the user was told", push
//! delivery is a best-effort enhancement on top.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};
use crate::models::PushProviderKind;

// =============================================================================
// Category Enum
// =============================================================================

/// What kind of event a notification describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    OrderUpdate,
    DeliveryAssignment,
    Promotion,
    Test,
    Generic,
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationCategory::OrderUpdate => write!(f, "order_update"),
            NotificationCategory::DeliveryAssignment => write!(f, "delivery_assignment"),
            NotificationCategory::Promotion => write!(f, "promotion"),
            NotificationCategory::Test => write!(f, "test"),
            NotificationCategory::Generic => write!(f, "generic"),
        }
    }
}

// =============================================================================
// Notification Intent
// =============================================================================

/// Ephemeral description of one notification to deliver.
///
/// `data` is the provider-agnostic key/value payload (order id, deep-link
/// url, ...). Provider wire formats require string values, so anything
/// arriving as non-string JSON is coerced before it gets here.
#[derive(Debug, Clone)]
pub struct NotificationIntent {
    pub user_id: i32,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub data: HashMap<String, String>,
}

impl NotificationIntent {
    /// Validates the intent before any side effect.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation(
                "Notification title must not be empty".to_string(),
            ));
        }
        if self.body.trim().is_empty() {
            return Err(AppError::Validation(
                "Notification body must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// DTO for a raw dispatch request.
///
/// Field names follow the storefront API (`message` for the body text,
/// `type` for the category). `data` accepts arbitrary JSON values and is
/// coerced to the string map providers require.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub user_id: i32,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default = "default_category")]
    pub category: NotificationCategory,
    #[serde(default)]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_category() -> NotificationCategory {
    NotificationCategory::Generic
}

impl DispatchRequest {
    /// Converts the wire request into an intent, stringifying data values.
    pub fn into_intent(self) -> NotificationIntent {
        let data = self
            .data
            .map(|map| {
                map.into_iter()
                    .map(|(key, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (key, value)
                    })
                    .collect()
            })
            .unwrap_or_default();

        NotificationIntent {
            user_id: self.user_id,
            title: self.title,
            body: self.message,
            category: self.category,
            data,
        }
    }
}

// =============================================================================
// Notification Record Model
// =============================================================================

/// Durable in-app notification log entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRecord {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationCategory,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Dispatch Outcome
// =============================================================================

/// Per-provider delivery result for one dispatch call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderDelivery {
    Sent,
    SkippedUnconfigured,
    FailedPermanent,
    FailedTransient,
}

/// Aggregate result of a dispatch call.
///
/// `notification_id` always references a written record; `providers` has
/// one entry per provider the recipient had valid handles on. Push
/// failures appear here and nowhere else; they never fail the call.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub notification_id: i32,
    pub providers: HashMap<PushProviderKind, ProviderDelivery>,
}
