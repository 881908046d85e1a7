//! Device registration routes.
//!
//! - POST /api/devices - Register (or refresh) a device push endpoint
//! - GET /api/devices/user/{user_id} - List a user's registrations
//! - GET /api/push/status - Per-provider configured state

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{PushProviderKind, RegisterDevice};
use crate::services::{DeviceRegistryService, Dispatcher};

/// POST /api/devices
///
/// Upsert semantics: a device re-registering the same handle refreshes
/// `last_seen_at` instead of creating a second row, so clients may call
/// this on every app start.
pub async fn register_device(
    pool: web::Data<DbPool>,
    body: web::Json<RegisterDevice>,
) -> AppResult<HttpResponse> {
    let registration = DeviceRegistryService::register(pool.get_ref(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(registration))
}

/// GET /api/devices/user/{user_id}
pub async fn list_devices(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let registrations =
        DeviceRegistryService::list_all(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(registrations))
}

/// GET /api/push/status
///
/// Lets client apps and operators see which delivery channels this
/// deployment can actually use.
pub async fn push_status(dispatcher: web::Data<Dispatcher>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "fcm": dispatcher.is_configured(PushProviderKind::Fcm),
        "onesignal": dispatcher.is_configured(PushProviderKind::Onesignal),
        "webpush": dispatcher.is_configured(PushProviderKind::Webpush),
    }))
}

/// Configure device routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/devices")
            .route("", web::post().to(register_device))
            .route("/user/{user_id}", web::get().to(list_devices)),
    );
    cfg.route("/api/push/status", web::get().to(push_status));
}
