//! Invoice arithmetic using rust_decimal
//!
//! Inputs are integer minor units and percent rates; intermediate values stay
//! exact in `Decimal`, and each monetary output is rounded half away from zero
//! to whole units only at the end.
//!
//! ```text
//! subtotal        = Σ (unit_price + Σ modifier deltas) × quantity   (non-cancelled)
//! discount        = subtotal × discount% / 100
//! after_discount  = subtotal − discount
//! tax             = after_discount × tax% / 100
//! service_charge  = after_discount × service% / 100
//! amount          = after_discount + tax + service_charge
//! ```

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiscountTier, OrderItem, SettlementRules};

use crate::orders::money;

/// Computed invoice figures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: i64,
    pub discount_percent: f64,
    pub discount_amount: i64,
    pub tax_rate: f64,
    pub tax_amount: i64,
    pub service_charge_rate: f64,
    pub service_charge_amount: i64,
    pub amount: i64,
}

/// Convert f64 to Decimal
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round to whole minor units
#[inline]
fn to_units(value: Decimal) -> Result<i64, AppError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::with_message(ErrorCode::ValueOutOfRange, "amount out of range"))
}

/// Percent of a decimal amount
#[inline]
fn percent_of(amount: Decimal, percent: f64) -> Decimal {
    amount * to_decimal(percent) / Decimal::ONE_HUNDRED
}

/// Tier with the highest `min_order` not exceeding `subtotal`
pub fn select_discount(tiers: &[DiscountTier], subtotal: i64) -> Option<&DiscountTier> {
    tiers
        .iter()
        .filter(|t| t.min_order <= subtotal)
        .max_by_key(|t| t.min_order)
}

/// Subtotal of the billable (non-cancelled) items
pub fn subtotal(items: &[OrderItem]) -> Result<i64, AppError> {
    money::order_total(items)
}

/// Compute the invoice for a subtotal under the given rules
pub fn compute_totals(subtotal: i64, rules: &SettlementRules) -> Result<InvoiceTotals, AppError> {
    let discount_percent = select_discount(&rules.discount_tiers, subtotal)
        .map(|t| t.percent)
        .unwrap_or(0.0);

    let sub = Decimal::from(subtotal);
    let discount = percent_of(sub, discount_percent);
    let after_discount = sub - discount;
    let tax = percent_of(after_discount, rules.tax_rate);
    let service_charge = percent_of(after_discount, rules.service_charge_rate);
    let amount = after_discount + tax + service_charge;

    Ok(InvoiceTotals {
        subtotal,
        discount_percent,
        discount_amount: to_units(discount)?,
        tax_rate: rules.tax_rate,
        tax_amount: to_units(tax)?,
        service_charge_rate: rules.service_charge_rate,
        service_charge_amount: to_units(service_charge)?,
        amount: to_units(amount)?,
    })
}

/// Validate a rule set before it is stored
pub fn validate_rules(rules: &SettlementRules) -> Result<(), AppError> {
    check_rate(rules.tax_rate, "tax_rate")?;
    check_rate(rules.service_charge_rate, "service_charge_rate")?;

    let mut seen = std::collections::HashSet::new();
    for tier in &rules.discount_tiers {
        if tier.min_order < 0 {
            return Err(AppError::invalid_field(
                "discount_tiers",
                format!("min_order must be non-negative, got {}", tier.min_order),
            ));
        }
        if !tier.percent.is_finite() || !(0.0..=100.0).contains(&tier.percent) {
            return Err(AppError::invalid_field(
                "discount_tiers",
                format!("percent must be between 0 and 100, got {}", tier.percent),
            ));
        }
        if !seen.insert(tier.min_order) {
            return Err(AppError::invalid_field(
                "discount_tiers",
                format!("duplicate min_order {}", tier.min_order),
            ));
        }
    }
    Ok(())
}

fn check_rate(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must be a non-negative number, got {value}"),
        ));
    }
    Ok(())
}
