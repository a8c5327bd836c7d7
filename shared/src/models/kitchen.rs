//! Kitchen queue projection

use serde::{Deserialize, Serialize};

use super::order::{OrderItemStatus, OrderStatus};

/// One dish line as shown to kitchen staff
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenOrderItem {
    pub item_id: i64,
    pub dish_id: i64,
    /// Empty when the dish no longer resolves in the catalog
    pub dish_name: String,
    pub quantity: i32,
    pub note: Option<String>,
    pub status: OrderItemStatus,
    pub modifiers: Vec<String>,
}

/// Order grouped with its kitchen-relevant items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenOrder {
    pub order_id: i64,
    pub table_id: i64,
    pub status: OrderStatus,
    pub waiter_id: Option<i64>,
    pub created_at: i64,
    pub items: Vec<KitchenOrderItem>,
}
