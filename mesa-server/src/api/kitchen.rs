//! Kitchen queue endpoint

use axum::{
    Json,
    extract::{Query, State},
};
use shared::models::KitchenOrder;

use super::ApiResult;
use crate::auth::CurrentUser;
use crate::orders::KitchenQuery;
use crate::state::AppState;

/// GET /api/kitchen/orders?status=&item_status=
pub async fn list_kitchen_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<KitchenQuery>,
) -> ApiResult<Vec<KitchenOrder>> {
    let view = state
        .lifecycle
        .list_kitchen_orders(&user.tenant_id, query)
        .await?;
    Ok(Json(view))
}
