//! Integration tests for the Notifications API
//!
//! Tests the notification record store and its HTTP surface with a real
//! PostgreSQL database. Dispatch endpoints run with an empty adapter set:
//! record-keeping must work with zero configured providers.

use actix_web::{test, web, App};
use bazaar_push::models::{NotificationCategory, NotificationRecord};
use bazaar_push::routes;
use bazaar_push::services::{Dispatcher, NotificationService};
use serde_json::json;

use crate::common::TestDb;

// =============================================================================
// Record Store
// =============================================================================

#[actix_web::test]
async fn test_list_is_newest_first() {
    let db = TestDb::new().await;

    for i in 1..=3 {
        NotificationService::create(
            &db.pool,
            1,
            &format!("Order #{} Update", i),
            "Body",
            NotificationCategory::OrderUpdate,
        )
        .await
        .unwrap();
        // created_at must strictly increase for the ordering assertion
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let records = NotificationService::list_by_user(&db.pool, 1).await.unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].title, "Order #3 Update");
    assert_eq!(records[2].title, "Order #1 Update");
}

#[actix_web::test]
async fn test_mark_read_and_unread_count() {
    let db = TestDb::new().await;

    let first = NotificationService::create(&db.pool, 2, "A", "a", NotificationCategory::Generic)
        .await
        .unwrap();
    NotificationService::create(&db.pool, 2, "B", "b", NotificationCategory::Generic)
        .await
        .unwrap();

    assert_eq!(NotificationService::unread_count(&db.pool, 2).await.unwrap(), 2);

    NotificationService::mark_read(&db.pool, first.id).await.unwrap();
    assert_eq!(NotificationService::unread_count(&db.pool, 2).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_mark_read_unknown_id_is_not_found() {
    let db = TestDb::new().await;
    assert!(NotificationService::mark_read(&db.pool, 123_456).await.is_err());
}

#[actix_web::test]
async fn test_mark_all_read_scopes_to_user() {
    let db = TestDb::new().await;

    NotificationService::create(&db.pool, 3, "A", "a", NotificationCategory::Generic)
        .await
        .unwrap();
    NotificationService::create(&db.pool, 3, "B", "b", NotificationCategory::Generic)
        .await
        .unwrap();
    NotificationService::create(&db.pool, 4, "C", "c", NotificationCategory::Generic)
        .await
        .unwrap();

    let updated = NotificationService::mark_all_read(&db.pool, 3).await.unwrap();
    assert_eq!(updated, 2);

    // The other user's notification is untouched
    assert_eq!(NotificationService::unread_count(&db.pool, 4).await.unwrap(), 1);
    // Second call is a no-op
    assert_eq!(NotificationService::mark_all_read(&db.pool, 3).await.unwrap(), 0);
}

// =============================================================================
// HTTP API
// =============================================================================

#[actix_web::test]
async fn test_dispatch_endpoint_succeeds_with_no_providers() {
    let db = TestDb::new().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::notifications::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/notifications/dispatch")
        .set_json(json!({
            "user_id": 7,
            "title": "Order #100 Update",
            "message": "Your order has been delivered successfully!",
            "type": "order_update",
            "data": { "orderId": 100 },
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let outcome: serde_json::Value = test::read_body_json(resp).await;
    assert!(outcome["notification_id"].as_i64().unwrap() > 0);
    assert!(outcome["providers"].as_object().unwrap().is_empty());

    let records = NotificationService::list_by_user(&db.pool, 7).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].notification_type, NotificationCategory::OrderUpdate);
}

#[actix_web::test]
async fn test_dispatch_endpoint_rejects_empty_title() {
    let db = TestDb::new().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::notifications::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/notifications/dispatch")
        .set_json(json!({
            "user_id": 7,
            "title": "",
            "message": "body",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let records = NotificationService::list_by_user(&db.pool, 7).await.unwrap();
    assert!(records.is_empty());
}

#[actix_web::test]
async fn test_test_notification_endpoint() {
    let db = TestDb::new().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::notifications::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/notifications/test")
        .set_json(json!({ "user_id": 5 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let records = NotificationService::list_by_user(&db.pool, 5).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].notification_type, NotificationCategory::Test);
}

#[actix_web::test]
async fn test_list_and_read_endpoints() {
    let db = TestDb::new().await;
    let record =
        NotificationService::create(&db.pool, 8, "Hello", "World", NotificationCategory::Generic)
            .await
            .unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::notifications::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/notifications/user/8")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let records: Vec<NotificationRecord> = test::read_body_json(resp).await;
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_read);

    let req = test::TestRequest::put()
        .uri(&format!("/api/notifications/{}/read", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/notifications/user/8/unread-count")
        .to_request();
    let resp = test::call_service(&app, req).await;
    let count: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(count["count"], 0);
}

#[actix_web::test]
async fn test_read_all_endpoint() {
    let db = TestDb::new().await;
    NotificationService::create(&db.pool, 9, "A", "a", NotificationCategory::Promotion)
        .await
        .unwrap();
    NotificationService::create(&db.pool, 9, "B", "b", NotificationCategory::Promotion)
        .await
        .unwrap();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .app_data(web::Data::new(Dispatcher::new(vec![])))
            .configure(routes::notifications::configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/api/notifications/user/9/read-all")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["updated"], 2);
}
