//! Domain event routes.
//!
//! The order/delivery layer posts plain domain events here; the template
//! table turns them into notification intents before dispatch.
//!
//! - POST /api/events/order-status - An order changed status
//! - POST /api/events/delivery-assignment - A delivery job was assigned

use actix_web::{web, HttpResponse};

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{DeliveryAssignmentEvent, OrderStatusEvent};
use crate::services::{templates, Dispatcher};

/// POST /api/events/order-status
pub async fn order_status(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    dispatcher: web::Data<Dispatcher>,
    body: web::Json<OrderStatusEvent>,
) -> AppResult<HttpResponse> {
    let intent = templates::order_status_intent(&body, &config.public_url);
    let outcome = dispatcher.dispatch(pool.get_ref(), intent).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/events/delivery-assignment
pub async fn delivery_assignment(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    dispatcher: web::Data<Dispatcher>,
    body: web::Json<DeliveryAssignmentEvent>,
) -> AppResult<HttpResponse> {
    let intent = templates::delivery_assignment_intent(&body, &config.public_url);
    let outcome = dispatcher.dispatch(pool.get_ref(), intent).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Configure domain event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/events")
            .route("/order-status", web::post().to(order_status))
            .route("/delivery-assignment", web::post().to(delivery_assignment)),
    );
}
