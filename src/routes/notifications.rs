//! Notification routes.
//!
//! ## Dispatch
//! - POST /api/notifications/dispatch - Dispatch a raw notification intent
//! - POST /api/notifications/test - Send the canned test notification
//!
//! ## Notification Center
//! - GET /api/notifications/user/{user_id} - List notifications
//! - GET /api/notifications/user/{user_id}/unread-count - Unread badge count
//! - PUT /api/notifications/{id}/read - Mark one as read
//! - PUT /api/notifications/user/{user_id}/read-all - Mark all as read

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::DispatchRequest;
use crate::services::{templates, Dispatcher, NotificationService};

// =============================================================================
// Dispatch Endpoints
// =============================================================================

/// POST /api/notifications/dispatch
///
/// Succeeds whenever the record was written; per-provider push outcomes
/// are reported in the response, never as an HTTP error.
pub async fn dispatch(
    pool: web::Data<DbPool>,
    dispatcher: web::Data<Dispatcher>,
    body: web::Json<DispatchRequest>,
) -> AppResult<HttpResponse> {
    let outcome = dispatcher
        .dispatch(pool.get_ref(), body.into_inner().into_intent())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[derive(Deserialize)]
pub struct TestRequest {
    pub user_id: i32,
}

/// POST /api/notifications/test
pub async fn send_test(
    pool: web::Data<DbPool>,
    dispatcher: web::Data<Dispatcher>,
    body: web::Json<TestRequest>,
) -> AppResult<HttpResponse> {
    let outcome = dispatcher
        .dispatch(pool.get_ref(), templates::test_intent(body.user_id))
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

// =============================================================================
// Notification Center Endpoints
// =============================================================================

/// GET /api/notifications/user/{user_id}
pub async fn list_notifications(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let records = NotificationService::list_by_user(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// GET /api/notifications/user/{user_id}/unread-count
pub async fn unread_count(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let count = NotificationService::unread_count(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(pool: web::Data<DbPool>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    NotificationService::mark_read(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// PUT /api/notifications/user/{user_id}/read-all
pub async fn mark_all_read(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let updated = NotificationService::mark_all_read(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "updated": updated })))
}

// =============================================================================
// Route Configuration
// =============================================================================

/// Configure notification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifications")
            .route("/dispatch", web::post().to(dispatch))
            .route("/test", web::post().to(send_test))
            .route("/user/{user_id}", web::get().to(list_notifications))
            .route("/user/{user_id}/unread-count", web::get().to(unread_count))
            .route("/user/{user_id}/read-all", web::put().to(mark_all_read))
            .route("/{id}/read", web::put().to(mark_read)),
    );
}
