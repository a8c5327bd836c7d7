//! Order money helpers
//!
//! Amounts are integers in the smallest currency unit, so line and order
//! totals are exact. Overflow is reported instead of wrapping.

use shared::error::{AppError, ErrorCode};
use shared::models::OrderItem;

/// Maximum allowed quantity per item
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum length of a free-text item note
pub const MAX_NOTE_LEN: usize = 500;

/// Validate an item quantity (1..=MAX_QUANTITY)
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("quantity must be positive, got {quantity}"),
        )
        .with_detail("field", "quantity"));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"),
        )
        .with_detail("field", "quantity"));
    }
    Ok(())
}

/// (unit_price + Σ modifier deltas) × quantity
pub fn line_total(item: &OrderItem) -> Result<i64, AppError> {
    item.unit_price
        .checked_add(item.modifier_total())
        .and_then(|unit| unit.checked_mul(i64::from(item.quantity)))
        .ok_or_else(overflow)
}

/// Sum of line totals over non-cancelled items
pub fn order_total(items: &[OrderItem]) -> Result<i64, AppError> {
    items
        .iter()
        .filter(|item| !item.is_cancelled())
        .try_fold(0_i64, |acc, item| {
            acc.checked_add(line_total(item)?).ok_or_else(overflow)
        })
}

fn overflow() -> AppError {
    AppError::with_message(ErrorCode::ValueOutOfRange, "amount out of range")
}
