//! API routes for mesa-server
//!
//! Every route lives under `/api`. REST handlers take the tenant from the
//! authenticated `CurrentUser`; the WebSocket endpoint authenticates with a
//! `?token=` query parameter.

pub mod health;
pub mod kitchen;
pub mod orders;
pub mod payments;
pub mod settlement_rules;
pub mod ws;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Create the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        // Orders
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route(
            "/orders/{id}/items/{item_id}",
            patch(orders::update_item_status),
        )
        // Kitchen
        .route("/kitchen/orders", get(kitchen::list_kitchen_orders))
        // Payments
        .route("/payments", post(payments::create_invoice))
        .route("/payments/{id}", get(payments::get_invoice))
        .route(
            "/payments/order/{order_id}",
            get(payments::get_invoice_by_order),
        )
        .route("/payments/{id}/confirm", patch(payments::confirm_payment))
        // Settlement rules
        .route(
            "/settlement-rules",
            get(settlement_rules::get_rules).put(settlement_rules::put_rules),
        )
        // Real-time
        .route("/ws", get(ws::handle_ws));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run `validator` rules on a request body
pub(crate) fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|errors| {
        let fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
        AppError::validation(errors.to_string()).with_detail("fields", fields)
    })
}
