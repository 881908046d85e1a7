//! OneSignal adapter.
//!
//! Talks to the OneSignal REST API, addressing one subscription (player)
//! per send. OneSignal reports dead subscriptions inside a 200 response
//! body as well as via 400s, so classification inspects both.

use async_trait::async_trait;
use serde_json::json;

use super::{OneSignalCredentials, PushAdapter, SendOutcome, SEND_TIMEOUT};
use crate::models::{NotificationIntent, PushProviderKind};

const API_URL: &str = "https://onesignal.com/api/v1/notifications";

/// OneSignal push adapter
pub struct OneSignalAdapter {
    client: reqwest::Client,
    credentials: OneSignalCredentials,
}

impl OneSignalAdapter {
    /// Creates a new OneSignal adapter from resolved credentials
    pub fn new(credentials: OneSignalCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            credentials,
        }
    }

    /// Builds the notification payload addressed to a single player id.
    fn build_payload(&self, handle: &str, intent: &NotificationIntent) -> serde_json::Value {
        let mut payload = json!({
            "app_id": self.credentials.app_id,
            "include_player_ids": [handle],
            "headings": { "en": intent.title },
            "contents": { "en": intent.body },
            "data": intent.data,
            "android_channel_id": "siraha_bazaar",
            "priority": 10,
        });

        // Deep link, when the intent carries one
        if let Some(url) = intent.data.get("url") {
            payload["url"] = json!(url);
        }

        payload
    }

    /// Classifies an error from status code and response body.
    fn classify_error(status: u16, body: &str) -> SendOutcome {
        let dead_subscription = body.contains("not subscribed")
            || body.contains("invalid_player_ids")
            || body.contains("Incorrect player_id format");

        if dead_subscription {
            return SendOutcome::Permanent(format!(
                "OneSignal subscription gone (HTTP {})",
                status
            ));
        }

        SendOutcome::Transient(format!("OneSignal error: HTTP {}", status))
    }
}

#[async_trait]
impl PushAdapter for OneSignalAdapter {
    fn provider(&self) -> PushProviderKind {
        PushProviderKind::Onesignal
    }

    async fn send(&self, handle: &str, intent: &NotificationIntent) -> SendOutcome {
        let payload = self.build_payload(handle, intent);

        match self
            .client
            .post(API_URL)
            .header(
                "Authorization",
                format!("Basic {}", self.credentials.rest_api_key),
            )
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();

                // OneSignal answers 200 even when every target was dead;
                // the failure only shows up in the errors array.
                if (200..300).contains(&status) {
                    if body.contains("\"errors\"") {
                        Self::classify_error(status, &body)
                    } else {
                        log::debug!("OneSignal notification accepted for user {}", intent.user_id);
                        SendOutcome::Sent
                    }
                } else {
                    Self::classify_error(status, &body)
                }
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "OneSignal request timed out".to_string()
                } else if e.is_connect() {
                    "Connection to OneSignal failed".to_string()
                } else {
                    format!("OneSignal request failed: {}", e)
                };
                SendOutcome::Transient(reason)
            }
        }
    }
}
