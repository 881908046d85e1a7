//! Provider credential resolution.
//!
//! Credentials are read from the environment exactly once at startup and
//! shared read-only afterwards. A provider with missing or partial
//! credentials is reported as unconfigured, never an error, so dispatch
//! can skip it while the other providers keep working.

use std::env;

use serde::Deserialize;

/// Firebase Cloud Messaging service-account credentials
#[derive(Debug, Clone)]
pub struct FcmCredentials {
    pub project_id: String,
    pub client_email: String,
    /// PEM-encoded RSA private key from the service account
    pub private_key: String,
}

/// OneSignal REST API credentials
#[derive(Debug, Clone)]
pub struct OneSignalCredentials {
    pub app_id: String,
    pub rest_api_key: String,
}

/// VAPID key pair for raw Web Push (RFC 8292)
#[derive(Debug, Clone)]
pub struct VapidCredentials {
    /// base64url, uncompressed P-256 public point (65 bytes decoded)
    pub public_key: String,
    /// base64url, raw P-256 scalar (32 bytes decoded)
    pub private_key: String,
    /// `mailto:` or `https:` contact URI placed in the VAPID `sub` claim
    pub subject: String,
}

/// Resolved credential state for all providers
#[derive(Debug, Clone, Default)]
pub struct PushCredentials {
    pub fcm: Option<FcmCredentials>,
    pub onesignal: Option<OneSignalCredentials>,
    pub vapid: Option<VapidCredentials>,
}

/// Subset of a Firebase service-account JSON bundle
#[derive(Deserialize)]
struct ServiceAccountKey {
    project_id: Option<String>,
    client_email: Option<String>,
    private_key: Option<String>,
}

impl PushCredentials {
    /// Resolve all provider credentials from the environment.
    ///
    /// Never fails: each provider independently resolves to configured or
    /// unconfigured, and partial credentials log the reason they were
    /// rejected.
    pub fn from_env() -> Self {
        let credentials = Self {
            fcm: Self::fcm_from_env(),
            onesignal: Self::onesignal_from_env(),
            vapid: Self::vapid_from_env(),
        };

        log::info!(
            "Push providers configured: fcm={}, onesignal={}, webpush={}",
            credentials.fcm.is_some(),
            credentials.onesignal.is_some(),
            credentials.vapid.is_some()
        );

        credentials
    }

    /// FCM accepts either a full service-account JSON bundle or the
    /// individual fields. A credential counts as configured only with
    /// project id, client email AND private key all present.
    fn fcm_from_env() -> Option<FcmCredentials> {
        // Preferred: the whole service-account JSON in one variable
        if let Ok(raw) = env::var("FCM_SERVICE_ACCOUNT") {
            match serde_json::from_str::<ServiceAccountKey>(&raw) {
                Ok(key) => match (key.project_id, key.client_email, key.private_key) {
                    (Some(project_id), Some(client_email), Some(private_key)) => {
                        return Some(FcmCredentials {
                            project_id,
                            client_email,
                            private_key,
                        });
                    }
                    _ => {
                        log::warn!(
                            "FCM_SERVICE_ACCOUNT is missing project_id, client_email or \
                             private_key; treating FCM as unconfigured"
                        );
                        return None;
                    }
                },
                Err(e) => {
                    log::warn!(
                        "FCM_SERVICE_ACCOUNT is not valid JSON ({}); treating FCM as unconfigured",
                        e
                    );
                    return None;
                }
            }
        }

        // Fallback: individual variables. Keys pasted through env files
        // arrive with literal \n sequences, so unescape them.
        let project_id = env::var("FCM_PROJECT_ID").ok();
        let client_email = env::var("FCM_CLIENT_EMAIL").ok();
        let private_key = env::var("FCM_PRIVATE_KEY")
            .ok()
            .map(|key| key.replace("\\n", "\n"));

        match (project_id, client_email, private_key) {
            (Some(project_id), Some(client_email), Some(private_key)) => Some(FcmCredentials {
                project_id,
                client_email,
                private_key,
            }),
            (None, None, None) => None,
            _ => {
                log::warn!(
                    "Partial FCM credentials: FCM_PROJECT_ID, FCM_CLIENT_EMAIL and \
                     FCM_PRIVATE_KEY must all be set; treating FCM as unconfigured"
                );
                None
            }
        }
    }

    fn onesignal_from_env() -> Option<OneSignalCredentials> {
        let app_id = env::var("ONESIGNAL_APP_ID").ok();
        let rest_api_key = env::var("ONESIGNAL_REST_API_KEY").ok();

        match (app_id, rest_api_key) {
            (Some(app_id), Some(rest_api_key)) => Some(OneSignalCredentials {
                app_id,
                rest_api_key,
            }),
            (None, None) => None,
            _ => {
                log::warn!(
                    "Partial OneSignal credentials: ONESIGNAL_APP_ID and \
                     ONESIGNAL_REST_API_KEY must both be set; treating OneSignal as unconfigured"
                );
                None
            }
        }
    }

    fn vapid_from_env() -> Option<VapidCredentials> {
        let public_key = env::var("VAPID_PUBLIC_KEY").ok();
        let private_key = env::var("VAPID_PRIVATE_KEY").ok();

        match (public_key, private_key) {
            (Some(public_key), Some(private_key)) => Some(VapidCredentials {
                public_key,
                private_key,
                subject: env::var("VAPID_SUBJECT")
                    .unwrap_or_else(|_| "mailto:admin@sirahabazaar.com".to_string()),
            }),
            (None, None) => None,
            _ => {
                log::warn!(
                    "Partial VAPID credentials: VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY \
                     must both be set; treating Web Push as unconfigured"
                );
                None
            }
        }
    }
}
