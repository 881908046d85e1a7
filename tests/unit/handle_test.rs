//! Unit tests for registration-time handle validation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bazaar_push::models::PushProviderKind;
use bazaar_push::services::push::validate_handle;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;

/// A structurally valid browser subscription JSON
fn valid_subscription() -> String {
    let secret = SecretKey::from_slice(&[7u8; 32]).unwrap();
    let p256dh = URL_SAFE_NO_PAD.encode(secret.public_key().to_encoded_point(false).as_bytes());
    let auth = URL_SAFE_NO_PAD.encode([3u8; 16]);

    format!(
        r#"{{"endpoint":"https://updates.push.services.mozilla.com/wpush/v2/abc","keys":{{"p256dh":"{}","auth":"{}"}}}}"#,
        p256dh, auth
    )
}

#[test]
fn test_empty_handle_rejected_for_every_provider() {
    for provider in [
        PushProviderKind::Fcm,
        PushProviderKind::Onesignal,
        PushProviderKind::Webpush,
    ] {
        assert!(validate_handle(provider, "").is_err());
        assert!(validate_handle(provider, "   ").is_err());
    }
}

#[test]
fn test_opaque_tokens_accepted_for_fcm_and_onesignal() {
    assert!(validate_handle(PushProviderKind::Fcm, "fcm-token-abc:123").is_ok());
    assert!(validate_handle(
        PushProviderKind::Onesignal,
        "8400fbc1-106e-4b30-a4be-a8bba2a6a195"
    )
    .is_ok());
}

#[test]
fn test_webpush_handle_must_be_subscription_json() {
    assert!(validate_handle(PushProviderKind::Webpush, "fcm-token-abc").is_err());
    assert!(validate_handle(PushProviderKind::Webpush, &valid_subscription()).is_ok());
}

#[test]
fn test_webpush_rejects_short_keys() {
    let handle = r#"{"endpoint":"https://example.com/push","keys":{"p256dh":"AAAA","auth":"AAAA"}}"#;
    assert!(validate_handle(PushProviderKind::Webpush, handle).is_err());
}

#[test]
fn test_webpush_rejects_missing_keys() {
    let handle = r#"{"endpoint":"https://example.com/push"}"#;
    assert!(validate_handle(PushProviderKind::Webpush, handle).is_err());
}
