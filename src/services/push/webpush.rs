//! Raw Web Push adapter (RFC 8030) with VAPID authentication (RFC 8292)
//! and aes128gcm payload encryption (RFC 8291).
//!
//! The stored handle is the subscription JSON the browser produced
//! (`PushSubscription.toJSON()`): the push-service endpoint URL plus the
//! client's P-256 public key and auth secret. Each send performs a fresh
//! ECDH agreement with an ephemeral key, derives the content-encryption
//! key via HKDF-SHA-256, and posts the encrypted record directly to the
//! push service. A 404/410 means the subscription is gone for good.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use url::Url;

use super::{PushAdapter, SendOutcome, VapidCredentials, SEND_TIMEOUT};
use crate::error::{AppError, AppResult};
use crate::models::{NotificationIntent, PushProviderKind};

type HmacSha256 = Hmac<Sha256>;

/// Record size advertised in the aes128gcm content-coding header.
/// Notification payloads always fit a single record.
const RECORD_SIZE: u32 = 4096;

/// Push message lifetime at the push service, matching the marketplace's
/// 24h notification TTL.
const TTL_SECONDS: u32 = 86_400;

// =============================================================================
// Subscription Handle
// =============================================================================

/// Browser push subscription, as serialized by `PushSubscription.toJSON()`
#[derive(Debug, Clone, Deserialize)]
pub struct WebPushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionKeys {
    /// base64url, uncompressed P-256 public point (65 bytes decoded)
    pub p256dh: String,
    /// base64url, 16-byte auth secret
    pub auth: String,
}

/// Parses and validates a stored Web Push handle.
///
/// Used both at registration time (reject obviously broken handles early)
/// and at send time.
pub fn parse_subscription(handle: &str) -> AppResult<WebPushSubscription> {
    let subscription: WebPushSubscription = serde_json::from_str(handle).map_err(|e| {
        AppError::Validation(format!(
            "Web Push handle must be a subscription JSON with endpoint and keys: {}",
            e
        ))
    })?;

    let endpoint = Url::parse(&subscription.endpoint)
        .map_err(|_| AppError::Validation("Invalid Web Push endpoint URL".to_string()))?;
    if endpoint.scheme() != "https" {
        return Err(AppError::Validation(
            "Web Push endpoint must use HTTPS".to_string(),
        ));
    }

    let p256dh = decode_b64url(&subscription.keys.p256dh)
        .map_err(|_| AppError::Validation("Invalid p256dh key encoding".to_string()))?;
    if p256dh.len() != 65 {
        return Err(AppError::Validation(
            "p256dh must decode to a 65-byte uncompressed P-256 point".to_string(),
        ));
    }

    let auth = decode_b64url(&subscription.keys.auth)
        .map_err(|_| AppError::Validation("Invalid auth secret encoding".to_string()))?;
    if auth.len() != 16 {
        return Err(AppError::Validation(
            "auth must decode to a 16-byte secret".to_string(),
        ));
    }

    Ok(subscription)
}

/// base64url decoder tolerant of padded input (browsers differ here)
fn decode_b64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input.trim_end_matches('='))
}

// =============================================================================
// HKDF-SHA-256 (RFC 5869, single-block expand)
// =============================================================================

// All RFC 8291 derivations output at most 32 bytes, so one HMAC block of
// expand is sufficient.

fn hkdf_extract(salt: &[u8], ikm: &[u8]) -> [u8; 32] {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(salt).expect("HMAC can take key of any size");
    mac.update(ikm);
    mac.finalize().into_bytes().into()
}

fn hkdf_expand(prk: &[u8; 32], info: &[u8], length: usize) -> Vec<u8> {
    debug_assert!(length <= 32);
    let mut mac = <HmacSha256 as Mac>::new_from_slice(prk).expect("HMAC can take key of any size");
    mac.update(info);
    mac.update(&[0x01]);
    let block: [u8; 32] = mac.finalize().into_bytes().into();
    block[..length].to_vec()
}

// =============================================================================
// aes128gcm Content Encryption (RFC 8291)
// =============================================================================

/// Encrypts `plaintext` for the subscription described by `ua_public`
/// (the client's p256dh point) and `auth_secret`, using the given salt
/// and application-server ephemeral key. Returns the full content-coding
/// body: header block followed by the single encrypted record.
fn encrypt_with(
    as_secret: &SecretKey,
    salt: &[u8; 16],
    ua_public: &[u8],
    auth_secret: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, String> {
    let ua_key = PublicKey::from_sec1_bytes(ua_public)
        .map_err(|_| "p256dh is not a valid P-256 point".to_string())?;

    let shared = p256::ecdh::diffie_hellman(as_secret.to_nonzero_scalar(), ua_key.as_affine());
    let as_public = as_secret.public_key().to_encoded_point(false);

    // IKM = HKDF(auth_secret, ecdh_secret, "WebPush: info" || 0x00 || ua_public || as_public)
    let prk_key = hkdf_extract(auth_secret, shared.raw_secret_bytes().as_slice());
    let mut key_info = Vec::with_capacity(14 + 65 + 65);
    key_info.extend_from_slice(b"WebPush: info\0");
    key_info.extend_from_slice(ua_public);
    key_info.extend_from_slice(as_public.as_bytes());
    let ikm = hkdf_expand(&prk_key, &key_info, 32);

    // CEK and nonce from the record salt
    let prk = hkdf_extract(salt, &ikm);
    let cek = hkdf_expand(&prk, b"Content-Encoding: aes128gcm\0", 16);
    let nonce = hkdf_expand(&prk, b"Content-Encoding: nonce\0", 12);

    // Single record: plaintext || 0x02 (last-record delimiter)
    let mut record = Vec::with_capacity(plaintext.len() + 1);
    record.extend_from_slice(plaintext);
    record.push(0x02);

    let cipher = Aes128Gcm::new_from_slice(&cek).expect("CEK is 16 bytes");
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), record.as_slice())
        .map_err(|_| "AES-GCM encryption failed".to_string())?;

    // Header: salt(16) || rs(4) || idlen(1) || keyid(65)
    let mut body = Vec::with_capacity(86 + ciphertext.len());
    body.extend_from_slice(salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(as_public.as_bytes().len() as u8);
    body.extend_from_slice(as_public.as_bytes());
    body.extend_from_slice(&ciphertext);

    Ok(body)
}

/// Encrypts with a fresh random salt and ephemeral key.
fn encrypt_payload(
    ua_public: &[u8],
    auth_secret: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, String> {
    let salt: [u8; 16] = rand::random();
    // Rejection-sample until the bytes form a valid scalar; failure is
    // astronomically rare for P-256.
    let as_secret = loop {
        let bytes: [u8; 32] = rand::random();
        if let Ok(secret) = SecretKey::from_slice(&bytes) {
            break secret;
        }
    };

    encrypt_with(&as_secret, &salt, ua_public, auth_secret, plaintext)
}

// =============================================================================
// Web Push Adapter
// =============================================================================

/// Raw Web Push (VAPID) adapter
pub struct WebPushAdapter {
    client: reqwest::Client,
    credentials: VapidCredentials,
}

impl WebPushAdapter {
    /// Creates a new Web Push adapter from resolved VAPID credentials
    pub fn new(credentials: VapidCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            credentials,
        }
    }

    /// Builds the `Authorization: vapid t=..., k=...` header for a push
    /// service endpoint (RFC 8292 §3). The JWT audience is the endpoint's
    /// origin, signed ES256 with the VAPID private key.
    fn vapid_authorization(&self, endpoint: &Url) -> Result<String, String> {
        let audience = endpoint.origin().ascii_serialization();
        let claims = json!({
            "aud": audience,
            "exp": (Utc::now() + Duration::hours(12)).timestamp(),
            "sub": self.credentials.subject,
        });

        let header = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&json!({"typ": "JWT", "alg": "ES256"}))
                .expect("static header serializes"),
        );
        let claims = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).map_err(|e| format!("claims: {}", e))?);
        let signing_input = format!("{}.{}", header, claims);

        let key_bytes = decode_b64url(&self.credentials.private_key)
            .map_err(|_| "VAPID private key is not valid base64url".to_string())?;
        let secret = SecretKey::from_slice(&key_bytes)
            .map_err(|_| "VAPID private key is not a valid P-256 scalar".to_string())?;
        let signing_key = SigningKey::from(&secret);
        let signature: Signature = signing_key.sign(signing_input.as_bytes());

        let jwt = format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        );

        Ok(format!("vapid t={}, k={}", jwt, self.credentials.public_key))
    }

    /// What the service worker receives after decryption.
    fn build_payload(intent: &NotificationIntent) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "title": intent.title,
            "body": intent.body,
            "icon": "/assets/icon2.png",
            "badge": "/assets/icon2.png",
            "data": intent.data,
        }))
        .expect("intent serializes")
    }
}

#[async_trait]
impl PushAdapter for WebPushAdapter {
    fn provider(&self) -> PushProviderKind {
        PushProviderKind::Webpush
    }

    async fn send(&self, handle: &str, intent: &NotificationIntent) -> SendOutcome {
        // A stored handle that no longer parses cannot ever succeed.
        let subscription = match parse_subscription(handle) {
            Ok(subscription) => subscription,
            Err(e) => return SendOutcome::Permanent(format!("Corrupt subscription: {}", e)),
        };

        // Validated by parse_subscription
        let endpoint = Url::parse(&subscription.endpoint).expect("endpoint was validated");
        let ua_public = decode_b64url(&subscription.keys.p256dh).expect("p256dh was validated");
        let auth_secret = decode_b64url(&subscription.keys.auth).expect("auth was validated");

        let authorization = match self.vapid_authorization(&endpoint) {
            Ok(authorization) => authorization,
            Err(reason) => {
                log::warn!("VAPID signing failure: {}", reason);
                return SendOutcome::Transient(reason);
            }
        };

        let body = match encrypt_payload(&ua_public, &auth_secret, &Self::build_payload(intent)) {
            Ok(body) => body,
            Err(reason) => return SendOutcome::Transient(reason),
        };

        match self
            .client
            .post(endpoint.as_str())
            .header("Authorization", authorization)
            .header("Content-Encoding", "aes128gcm")
            .header("Content-Type", "application/octet-stream")
            .header("TTL", TTL_SECONDS.to_string())
            .header("Urgency", "normal")
            .body(body)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    log::debug!("Web Push accepted for user {}", intent.user_id);
                    SendOutcome::Sent
                } else if status == 404 || status == 410 {
                    SendOutcome::Permanent(format!("Subscription gone (HTTP {})", status))
                } else {
                    SendOutcome::Transient(format!("Push service error: HTTP {}", status))
                }
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "Push service request timed out".to_string()
                } else if e.is_connect() {
                    "Connection to push service failed".to_string()
                } else {
                    format!("Push service request failed: {}", e)
                };
                SendOutcome::Transient(reason)
            }
        }
    }
}
