//! Settlement rule endpoints (tax, service charge, discount tiers)

use axum::{Json, extract::State};
use shared::models::SettlementRules;

use super::ApiResult;
use crate::auth::CurrentUser;
use crate::state::AppState;

/// GET /api/settlement-rules
pub async fn get_rules(State(state): State<AppState>, user: CurrentUser) -> ApiResult<SettlementRules> {
    let rules = state.settlement.get_rules(&user.tenant_id).await?;
    Ok(Json(rules))
}

/// PUT /api/settlement-rules (admin only)
pub async fn put_rules(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(rules): Json<SettlementRules>,
) -> ApiResult<SettlementRules> {
    user.require_admin()?;
    let rules = state.settlement.put_rules(&user.tenant_id, rules).await?;
    Ok(Json(rules))
}
