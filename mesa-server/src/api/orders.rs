//! Order endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{Order, OrderDetail, OrderStatus};

use super::{ApiResult, validate};
use crate::auth::CurrentUser;
use crate::orders::{CreateOrder, OrderPatch, UpdateItemStatus};
use crate::state::AppState;

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateOrder>,
) -> Result<(StatusCode, Json<OrderDetail>), AppError> {
    validate(&req)?;
    let detail = state
        .lifecycle
        .create_order(&user.tenant_id, user.id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/orders?status=
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let orders = state
        .lifecycle
        .list_orders(&user.tenant_id, query.status)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    let detail = state.lifecycle.get_order(&user.tenant_id, id).await?;
    Ok(Json(detail))
}

/// PUT /api/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<OrderPatch>,
) -> ApiResult<Order> {
    validate(&patch)?;
    let order = state
        .lifecycle
        .update_order(&user.tenant_id, id, patch)
        .await?;
    Ok(Json(order))
}

/// PATCH /api/orders/{id}/items/{item_id}
pub async fn update_item_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((id, item_id)): Path<(i64, i64)>,
    Json(req): Json<UpdateItemStatus>,
) -> ApiResult<OrderDetail> {
    let detail = state
        .lifecycle
        .update_order_item_status(&user.tenant_id, id, item_id, req.status)
        .await?;
    Ok(Json(detail))
}

/// DELETE /api/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.lifecycle.delete_order(&user.tenant_id, id).await?;
    Ok(Json(ApiResponse::ok()))
}
