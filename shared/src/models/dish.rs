//! Dish catalog entries (read-only for the order core)

use serde::{Deserialize, Serialize};

/// Dish as resolved by the catalog lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: i64,
    pub tenant_id: String,
    pub name: String,
    /// Current price, smallest currency unit
    pub price: i64,
    pub is_available: bool,
}

/// Selectable add-on of a dish
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DishModifier {
    pub id: i64,
    pub tenant_id: String,
    pub dish_id: i64,
    pub name: String,
    pub price_delta: i64,
}
