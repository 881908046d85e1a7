//! Device registration models.
//!
//! A device registration maps a (user, device) pair to the opaque handle a
//! push provider uses to reach that device: an FCM registration token, a
//! OneSignal player id, or a serialized Web Push subscription.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// =============================================================================
// Provider Enum
// =============================================================================

/// Push delivery provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PushProviderKind {
    Fcm,
    Onesignal,
    Webpush,
}

impl std::fmt::Display for PushProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushProviderKind::Fcm => write!(f, "fcm"),
            PushProviderKind::Onesignal => write!(f, "onesignal"),
            PushProviderKind::Webpush => write!(f, "webpush"),
        }
    }
}

// =============================================================================
// Device Type Enum
// =============================================================================

/// Kind of client device that registered the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Web,
    Android,
    Ios,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceType::Web => write!(f, "web"),
            DeviceType::Android => write!(f, "android"),
            DeviceType::Ios => write!(f, "ios"),
        }
    }
}

// =============================================================================
// Device Registration Model
// =============================================================================

/// One registered push endpoint for one device of one user.
///
/// `(user_id, provider, handle)` is unique: re-registration from the same
/// device refreshes `last_seen_at` instead of inserting a duplicate row.
/// A registration is never physically deleted here; a provider-reported
/// dead handle gets `invalid = true` and drops out of dispatch lookups.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceRegistration {
    pub id: i32,
    pub user_id: i32,
    pub provider: PushProviderKind,
    pub handle: String,
    pub device_type: DeviceType,
    pub invalid: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// DTO for registering a device endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDevice {
    pub user_id: i32,
    pub provider: PushProviderKind,
    pub handle: String,
    pub device_type: DeviceType,
}
