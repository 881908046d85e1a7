//! Integration tests for the health endpoints

use actix_web::{test, web, App};
use bazaar_push::routes;

use crate::common::TestDb;

#[actix_web::test]
async fn test_liveness_returns_ok() {
    let app = test::init_service(App::new().route(
        "/health",
        web::get().to(routes::health::liveness),
    ))
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "bazaar-push");
}

#[actix_web::test]
async fn test_readiness_with_database() {
    let db = TestDb::new().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.pool.clone()))
            .route("/health/ready", web::get().to(routes::health::readiness)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "ok");
}
