//! Integration tests for the Devices API
//!
//! Tests device registration upsert semantics and the push status
//! endpoint with a real PostgreSQL database.

use actix_web::{test, web, App};
use bazaar_push::models::{DeviceRegistration, DeviceType, PushProviderKind, RegisterDevice};
use bazaar_push::routes;
use bazaar_push::services::{DeviceRegistryService, Dispatcher};
use serde_json::json;

use crate::common::TestDb;

// =============================================================================
// Registration Upsert Semantics
// =============================================================================

/// Registering the same (user, provider, handle) twice updates the row
/// instead of duplicating it.
#[actix_web::test]
async fn test_reregistration_is_idempotent() {
    let db = TestDb::new().await;

    let input = RegisterDevice {
        user_id: 1,
        provider: PushProviderKind::Fcm,
        handle: "token-one".to_string(),
        device_type: DeviceType::Android,
    };

    let first = DeviceRegistryService::register(&db.pool, input.clone())
        .await
        .unwrap();

    // A moment later the same device registers again
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let second = DeviceRegistryService::register(&db.pool, input).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(second.last_seen_at >= first.last_seen_at);

    let all = DeviceRegistryService::list_all(&db.pool, 1).await.unwrap();
    assert_eq!(all.len(), 1);
}

/// The same handle string under a different user is a separate
/// registration (a device that changed owners).
#[actix_web::test]
async fn test_same_handle_for_different_users_is_separate_row() {
    let db = TestDb::new().await;

    for user_id in [1, 2] {
        DeviceRegistryService::register(
            &db.pool,
            RegisterDevice {
                user_id,
                provider: PushProviderKind::Fcm,
                handle: "shared-token".to_string(),
                device_type: DeviceType::Android,
            },
        )
        .await
        .unwrap();
    }

    assert_eq!(DeviceRegistryService::list_all(&db.pool, 1).await.unwrap().len(), 1);
    assert_eq!(DeviceRegistryService::list_all(&db.pool, 2).await.unwrap().len(), 1);
}

/// One user may hold handles on several providers at once.
#[actix_web::test]
async fn test_multiple_providers_per_user() {
    let db = TestDb::new().await;

    for (provider, handle) in [
        (PushProviderKind::Fcm, "fcm-token"),
        (PushProviderKind::Onesignal, "player-id"),
    ] {
        DeviceRegistryService::register(
            &db.pool,
            RegisterDevice {
                user_id: 5,
                provider,
                handle: handle.to_string(),
                device_type: DeviceType::Web,
            },
        )
        .await
        .unwrap();
    }

    let valid = DeviceRegistryService::list_valid(&db.pool, 5).await.unwrap();
    assert_eq!(valid.len(), 2);
}

/// mark_invalid is idempotent and survives unknown ids.
#[actix_web::test]
async fn test_mark_invalid_is_idempotent() {
    let db = TestDb::new().await;

    let registration = DeviceRegistryService::register(
        &db.pool,
        RegisterDevice {
            user_id: 6,
            provider: PushProviderKind::Fcm,
            handle: "token".to_string(),
            device_type: DeviceType::Ios,
        },
    )
    .await
    .unwrap();

    DeviceRegistryService::mark_invalid(&db.pool, registration.id).await.unwrap();
    DeviceRegistryService::mark_invalid(&db.pool, registration.id).await.unwrap();
    DeviceRegistryService::mark_invalid(&db.pool, 999_999).await.unwrap();

    let all = DeviceRegistryService::list_all(&db.pool, 6).await.unwrap();
    assert!(all[0].invalid);
}

// =============================================================================
// HTTP API
// =============================================================================

#[actix_web::test]
async fn test_register_device_endpoint() {
    let db = TestDb::new().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::devices::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/devices")
        .set_json(json!({
            "user_id": 42,
            "provider": "fcm",
            "handle": "token-abc",
            "device_type": "android",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let registration: DeviceRegistration = test::read_body_json(resp).await;
    assert_eq!(registration.user_id, 42);
    assert_eq!(registration.provider, PushProviderKind::Fcm);
    assert!(!registration.invalid);
}

#[actix_web::test]
async fn test_register_device_rejects_bad_webpush_handle() {
    let db = TestDb::new().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::devices::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/devices")
        .set_json(json!({
            "user_id": 42,
            "provider": "webpush",
            "handle": "not-a-subscription",
            "device_type": "web",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_list_devices_endpoint() {
    let db = TestDb::new().await;

    DeviceRegistryService::register(
        &db.pool,
        RegisterDevice {
            user_id: 9,
            provider: PushProviderKind::Onesignal,
            handle: "player-1".to_string(),
            device_type: DeviceType::Web,
        },
    )
    .await
    .unwrap();

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::devices::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/devices/user/9")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let registrations: Vec<DeviceRegistration> = test::read_body_json(resp).await;
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].handle, "player-1");
}

#[actix_web::test]
async fn test_push_status_reports_configured_providers() {
    let db = TestDb::new().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::devices::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/push/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let status: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(status["fcm"], false);
    assert_eq!(status["onesignal"], false);
    assert_eq!(status["webpush"], false);
}
