//! Settlement rules (per tenant)

use serde::{Deserialize, Serialize};

/// One step of the tiered discount table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiscountTier {
    /// Subtotal threshold (inclusive), smallest currency unit
    pub min_order: i64,
    /// Discount percent applied when this tier is selected
    pub percent: f64,
}

/// Tax, service charge and discount configuration of a restaurant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementRules {
    pub tax_rate: f64,
    pub service_charge_rate: f64,
    #[serde(default)]
    pub discount_tiers: Vec<DiscountTier>,
}

impl SettlementRules {
    pub fn new(tax_rate: f64, service_charge_rate: f64) -> Self {
        Self {
            tax_rate,
            service_charge_rate,
            discount_tiers: Vec::new(),
        }
    }

    pub fn with_tiers(mut self, tiers: Vec<DiscountTier>) -> Self {
        self.discount_tiers = tiers;
        self
    }
}

impl Default for SettlementRules {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
