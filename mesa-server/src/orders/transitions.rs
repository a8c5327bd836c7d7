//! Status transition tables for orders and order items
//!
//! ```text
//! Order:  Unsubmit ─▶ Approved ─▶ Pending ─▶ Completed | Served
//!            └──────────┴──────────┴──────▶ Cancelled
//!         Paid is reached only through settlement.
//!
//! Item:   Pending ─▶ Ready ─▶ Served
//!            └─────────┴────▶ Cancelled
//! ```

use shared::error::{AppError, ErrorCode};
use shared::models::{OrderItemStatus, OrderStatus};
use thiserror::Error;

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("order cannot move from {from} to {to}")]
    Order { from: OrderStatus, to: OrderStatus },

    #[error("order item cannot move from {from} to {to}")]
    Item {
        from: OrderItemStatus,
        to: OrderItemStatus,
    },
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::Order { from, to } => {
                AppError::with_message(ErrorCode::InvalidOrderTransition, e.to_string())
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            TransitionError::Item { from, to } => {
                AppError::with_message(ErrorCode::InvalidItemTransition, e.to_string())
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
        }
    }
}

impl From<TransitionError> for ServiceError {
    fn from(e: TransitionError) -> Self {
        ServiceError::App(e.into())
    }
}

/// Statuses an order may move to through a generic update
pub fn allowed_order_targets(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Unsubmit => &[Approved, Cancelled],
        Approved => &[Pending, Cancelled],
        Pending => &[Completed, Served, Cancelled],
        Completed | Served | Paid | Cancelled => &[],
    }
}

/// Statuses an order item may move to
pub fn allowed_item_targets(from: OrderItemStatus) -> &'static [OrderItemStatus] {
    use OrderItemStatus::*;
    match from {
        Pending => &[Ready, Served, Cancelled],
        Ready => &[Served, Cancelled],
        Served | Cancelled => &[],
    }
}

/// Check an order status change.
///
/// `Ok(false)` when `to == from` (nothing to do), `Ok(true)` when the move is allowed.
pub fn check_order_transition(from: OrderStatus, to: OrderStatus) -> Result<bool, TransitionError> {
    if from == to {
        return Ok(false);
    }
    if allowed_order_targets(from).contains(&to) {
        Ok(true)
    } else {
        Err(TransitionError::Order { from, to })
    }
}

/// Check an item status change. Same status on a terminal item is still rejected.
pub fn check_item_transition(
    from: OrderItemStatus,
    to: OrderItemStatus,
) -> Result<bool, TransitionError> {
    if from == to && !from.is_terminal() {
        return Ok(false);
    }
    if allowed_item_targets(from).contains(&to) {
        Ok(true)
    } else {
        Err(TransitionError::Item { from, to })
    }
}

/// Order statuses whose entry hands the order to the kitchen
pub fn enters_kitchen(to: OrderStatus) -> bool {
    to == OrderStatus::Pending
}

/// Order statuses whose entry is reported on the admin channel
pub fn is_administrative(to: OrderStatus) -> bool {
    matches!(
        to,
        OrderStatus::Completed | OrderStatus::Served | OrderStatus::Cancelled | OrderStatus::Paid
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ORDER: [OrderStatus; 7] = [
        OrderStatus::Unsubmit,
        OrderStatus::Approved,
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Served,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_order_happy_path() {
        assert_eq!(
            check_order_transition(OrderStatus::Unsubmit, OrderStatus::Approved),
            Ok(true)
        );
        assert_eq!(
            check_order_transition(OrderStatus::Approved, OrderStatus::Pending),
            Ok(true)
        );
        assert_eq!(
            check_order_transition(OrderStatus::Pending, OrderStatus::Completed),
            Ok(true)
        );
    }

    #[test]
    fn test_order_cannot_skip_or_regress() {
        assert!(check_order_transition(OrderStatus::Unsubmit, OrderStatus::Pending).is_err());
        assert!(check_order_transition(OrderStatus::Pending, OrderStatus::Approved).is_err());
        assert!(check_order_transition(OrderStatus::Approved, OrderStatus::Completed).is_err());
    }

    #[test]
    fn test_paid_never_reachable_by_update() {
        for from in ALL_ORDER {
            if from != OrderStatus::Paid {
                assert!(check_order_transition(from, OrderStatus::Paid).is_err());
            }
        }
    }

    #[test]
    fn test_terminal_orders_have_no_targets() {
        for from in ALL_ORDER.into_iter().filter(|s| s.is_terminal()) {
            assert!(allowed_order_targets(from).is_empty(), "{from}");
        }
    }

    #[test]
    fn test_same_order_status_is_noop() {
        assert_eq!(
            check_order_transition(OrderStatus::Pending, OrderStatus::Pending),
            Ok(false)
        );
    }

    #[test]
    fn test_item_transitions() {
        use OrderItemStatus::*;
        assert_eq!(check_item_transition(Pending, Ready), Ok(true));
        assert_eq!(check_item_transition(Ready, Served), Ok(true));
        assert_eq!(check_item_transition(Ready, Ready), Ok(false));
        assert!(check_item_transition(Ready, Pending).is_err());
        assert!(check_item_transition(Served, Cancelled).is_err());
        assert!(check_item_transition(Cancelled, Cancelled).is_err());
    }

    #[test]
    fn test_error_maps_to_code() {
        let err: AppError =
            check_item_transition(OrderItemStatus::Served, OrderItemStatus::Pending)
                .unwrap_err()
                .into();
        assert_eq!(err.code, ErrorCode::InvalidItemTransition);
        assert_eq!(err.details.unwrap()["from"], "served");
    }
}
