//! Push provider adapters using the Strategy pattern.
//!
//! Each provider (FCM, OneSignal, Web Push) implements the `PushAdapter`
//! trait: translate a generic intent into the provider's wire payload,
//! perform the HTTP call, and classify the result. Adapters are
//! constructed once from resolved credentials and injected into the
//! dispatcher, which makes the fan-out testable by substituting fakes.

pub mod credentials;
pub mod fcm;
pub mod onesignal;
pub mod webpush;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{NotificationIntent, PushProviderKind};

pub use credentials::{FcmCredentials, OneSignalCredentials, PushCredentials, VapidCredentials};
pub use fcm::FcmAdapter;
pub use onesignal::OneSignalAdapter;
pub use webpush::WebPushAdapter;

/// Per-adapter send timeout. A provider that takes longer than this is
/// classified transient so the caller's retry policy can pick it up.
pub const SEND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

// =============================================================================
// Send Outcome
// =============================================================================

/// Result of one send attempt against one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider accepted the message
    Sent,
    /// The handle is dead (unregistered token, gone subscription); the
    /// registration must be marked invalid so it is not retried
    Permanent(String),
    /// Network error, timeout, rate limit or provider outage; may succeed
    /// on a later attempt
    Transient(String),
}

// =============================================================================
// Push Adapter Trait
// =============================================================================

/// Trait for provider adapters (Strategy pattern)
///
/// `send` never returns an error: every failure is classified into the
/// outcome so one provider's problem cannot abort a sibling send.
#[async_trait]
pub trait PushAdapter: Send + Sync {
    /// The provider this adapter speaks to
    fn provider(&self) -> PushProviderKind;

    /// Deliver one intent to one handle
    async fn send(&self, handle: &str, intent: &NotificationIntent) -> SendOutcome;
}

// =============================================================================
// Handle Validation
// =============================================================================

/// Validates a handle at registration time.
///
/// Static, credential-independent checks only: a device may register for
/// a provider that is currently unconfigured. Whether a handle is *live*
/// is only ever learned from a provider rejection at send time.
pub fn validate_handle(provider: PushProviderKind, handle: &str) -> AppResult<()> {
    if handle.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "Handle for provider '{}' must not be empty",
            provider
        )));
    }

    if provider == PushProviderKind::Webpush {
        webpush::parse_subscription(handle)?;
    }

    Ok(())
}

// =============================================================================
// Adapter Construction
// =============================================================================

/// Builds one adapter per configured provider.
///
/// Unconfigured providers simply get no adapter; the dispatcher reports
/// their registrations as skipped.
pub fn build_adapters(credentials: &PushCredentials) -> Vec<Arc<dyn PushAdapter>> {
    let mut adapters: Vec<Arc<dyn PushAdapter>> = Vec::new();

    if let Some(fcm) = &credentials.fcm {
        adapters.push(Arc::new(FcmAdapter::new(fcm.clone())));
    }
    if let Some(onesignal) = &credentials.onesignal {
        adapters.push(Arc::new(OneSignalAdapter::new(onesignal.clone())));
    }
    if let Some(vapid) = &credentials.vapid {
        adapters.push(Arc::new(WebPushAdapter::new(vapid.clone())));
    }

    adapters
}
