//! Firebase Cloud Messaging adapter (HTTP v1 API).
//!
//! Authenticates with a short-lived OAuth2 access token minted from the
//! service account: an RS256-signed JWT assertion is exchanged at the
//! Google token endpoint and cached until shortly before expiry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use super::{FcmCredentials, PushAdapter, SendOutcome, SEND_TIMEOUT};
use crate::models::{NotificationIntent, PushProviderKind};

const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const OAUTH_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// JWT assertion claims for the service-account token exchange
#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// FCM push adapter
pub struct FcmAdapter {
    client: reqwest::Client,
    credentials: FcmCredentials,
    token: Mutex<Option<CachedToken>>,
}

impl FcmAdapter {
    /// Creates a new FCM adapter from resolved credentials
    pub fn new(credentials: FcmCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Returns a cached access token, minting a fresh one when the cached
    /// token is absent or within a minute of expiry.
    async fn access_token(&self) -> Result<String, String> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Utc::now() + Duration::seconds(60) {
                return Ok(cached.access_token.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.credentials.client_email,
            scope: OAUTH_SCOPE,
            aud: OAUTH_TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| format!("Invalid FCM private key: {}", e))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| format!("Failed to sign FCM assertion: {}", e))?;

        let response = self
            .client
            .post(OAUTH_TOKEN_URL)
            .form(&[
                ("grant_type", OAUTH_GRANT_TYPE),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| format!("OAuth token request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!(
                "OAuth token exchange failed: HTTP {}",
                response.status().as_u16()
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| format!("Invalid OAuth token response: {}", e))?;

        let access_token = token.access_token.clone();
        *guard = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        });

        Ok(access_token)
    }

    /// Builds the HTTP v1 message body.
    ///
    /// `data` values are already strings (the wire format rejects anything
    /// else); the android/webpush blocks carry the marketplace's channel
    /// and icon settings.
    fn build_message(handle: &str, intent: &NotificationIntent) -> serde_json::Value {
        json!({
            "message": {
                "token": handle,
                "notification": {
                    "title": intent.title,
                    "body": intent.body,
                },
                "data": intent.data,
                "android": {
                    "notification": {
                        "channel_id": "siraha_bazaar",
                        "icon": "ic_notification",
                        "color": "#FF6B35",
                        "sound": "default",
                        "notification_priority": "PRIORITY_HIGH",
                    }
                },
                "webpush": {
                    "headers": {
                        "TTL": "86400",
                    },
                    "notification": {
                        "icon": "/assets/icon2.png",
                        "badge": "/assets/icon2.png",
                        "require_interaction": true,
                    }
                }
            }
        })
    }

    /// Classifies an FCM error response.
    ///
    /// A dead token surfaces as 404/UNREGISTERED (or INVALID_ARGUMENT for
    /// a malformed one) and is permanent; credential problems, rate
    /// limiting and provider outages are transient.
    fn classify_error(status: u16, body: &str) -> SendOutcome {
        if status == 404 || body.contains("UNREGISTERED") {
            return SendOutcome::Permanent(format!("FCM token unregistered (HTTP {})", status));
        }
        if status == 400 && body.contains("INVALID_ARGUMENT") {
            return SendOutcome::Permanent(format!("FCM rejected token (HTTP {})", status));
        }

        SendOutcome::Transient(format!("FCM error: HTTP {}", status))
    }
}

#[async_trait]
impl PushAdapter for FcmAdapter {
    fn provider(&self) -> PushProviderKind {
        PushProviderKind::Fcm
    }

    async fn send(&self, handle: &str, intent: &NotificationIntent) -> SendOutcome {
        let access_token = match self.access_token().await {
            Ok(token) => token,
            Err(reason) => {
                log::warn!("FCM credential failure: {}", reason);
                return SendOutcome::Transient(reason);
            }
        };

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.credentials.project_id
        );
        let message = Self::build_message(handle, intent);

        match self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&message)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    log::debug!("FCM notification accepted for user {}", intent.user_id);
                    SendOutcome::Sent
                } else {
                    let body = response.text().await.unwrap_or_default();
                    Self::classify_error(status, &body)
                }
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "FCM request timed out".to_string()
                } else if e.is_connect() {
                    "Connection to FCM failed".to_string()
                } else {
                    format!("FCM request failed: {}", e)
                };
                SendOutcome::Transient(reason)
            }
        }
    }
}
