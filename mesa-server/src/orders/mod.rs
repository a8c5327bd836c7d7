//! Order core
//!
//! - [`transitions`]: order / item status tables
//! - [`money`]: line and order totals
//! - [`lifecycle`]: the engine applying placements, patches, item changes and deletes
//! - [`kitchen`]: kitchen queue projection

pub mod kitchen;
pub mod lifecycle;
pub mod money;
pub mod transitions;

pub use kitchen::KitchenQuery;
pub use lifecycle::{CreateOrder, CreateOrderItem, OrderLifecycle, OrderPatch, UpdateItemStatus};

use shared::error::{AppError, ErrorCode};
use shared::models::Order;

/// Resolve a loaded order against the caller's tenant.
///
/// Missing → `OrderNotFound`; foreign tenant → `AccessDenied` without any
/// detail about the order.
pub(crate) fn owned_order(order: Option<Order>, tenant_id: &str, id: i64) -> Result<Order, AppError> {
    match order {
        None => Err(AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id)),
        Some(order) if order.tenant_id != tenant_id => {
            tracing::warn!(
                target: "security",
                tenant_id = %tenant_id,
                order_id = id,
                "Cross-tenant order access rejected"
            );
            Err(AppError::access_denied())
        }
        Some(order) => Ok(order),
    }
}
