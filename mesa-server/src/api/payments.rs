//! Payment (invoice) endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::AppError;
use shared::models::{InvoiceDetails, Payment};

use super::{ApiResult, validate};
use crate::auth::CurrentUser;
use crate::settlement::CreateInvoice;
use crate::state::AppState;

/// POST /api/payments
pub async fn create_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateInvoice>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    validate(&req)?;
    let payment = state
        .settlement
        .create_invoice(&user.tenant_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/payments/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<InvoiceDetails> {
    let invoice = state
        .settlement
        .get_invoice_details(&user.tenant_id, id)
        .await?;
    Ok(Json(invoice))
}

/// GET /api/payments/order/{order_id}
pub async fn get_invoice_by_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<i64>,
) -> ApiResult<InvoiceDetails> {
    let invoice = state
        .settlement
        .get_invoice_by_order_id(&user.tenant_id, order_id)
        .await?;
    Ok(Json(invoice))
}

/// PATCH /api/payments/{id}/confirm
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Payment> {
    let payment = state
        .settlement
        .confirm_payment(&user.tenant_id, id)
        .await?;
    Ok(Json(payment))
}
