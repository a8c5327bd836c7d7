//! Order Model
//!
//! Orders and their dish-level items. Money is stored in the smallest
//! currency unit (`i64`); `unit_price` and modifier deltas are snapshots taken
//! when the item is created.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    Unsubmit,
    Approved,
    Pending,
    Completed,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsubmit => "unsubmit",
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Served => "served",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses that end the order aggregate's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Served | Self::Paid | Self::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unsubmit" => Ok(Self::Unsubmit),
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "served" => Ok(Self::Served),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Order item (dish line) status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderItemStatus {
    Pending,
    Ready,
    Served,
    Cancelled,
}

impl OrderItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Served | Self::Cancelled)
    }
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            "served" => Ok(Self::Served),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown item status: {other}")),
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub tenant_id: String,
    pub table_id: i64,
    pub customer_id: Option<i64>,
    pub waiter_id: Option<i64>,
    pub status: OrderStatus,
    /// Sum of non-cancelled item line totals, smallest currency unit
    pub total_amount: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Priced add-on selected for an order item (immutable once created)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemModifier {
    pub id: i64,
    pub tenant_id: String,
    pub order_item_id: i64,
    /// Catalog modifier this selection was snapshotted from
    pub modifier_id: i64,
    pub name: String,
    pub price_delta: i64,
}

/// Order item (one dish line)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub tenant_id: String,
    pub order_id: i64,
    pub dish_id: i64,
    pub quantity: i32,
    /// Dish price at the moment the item was created
    pub unit_price: i64,
    pub note: Option<String>,
    pub status: OrderItemStatus,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub modifiers: Vec<OrderItemModifier>,
}

impl OrderItem {
    /// Sum of modifier price deltas for one unit
    pub fn modifier_total(&self) -> i64 {
        self.modifiers.iter().map(|m| m.price_delta).sum()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderItemStatus::Cancelled
    }
}

/// Order together with its items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Unsubmit).unwrap(),
            "\"unsubmit\""
        );
        assert_eq!("PENDING".parse::<OrderStatus>(), Ok(OrderStatus::Pending));
        assert!("open".parse::<OrderStatus>().is_err());
        assert_eq!("ready".parse::<OrderItemStatus>(), Ok(OrderItemStatus::Ready));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Served.is_terminal());
        assert!(OrderItemStatus::Cancelled.is_terminal());
        assert!(!OrderItemStatus::Ready.is_terminal());
    }

    #[test]
    fn test_order_detail_flattens_order() {
        let detail = OrderDetail {
            order: Order {
                id: 1,
                tenant_id: "t1".into(),
                table_id: 3,
                customer_id: None,
                waiter_id: Some(9),
                status: OrderStatus::Pending,
                total_amount: 1200,
                created_at: 0,
                updated_at: 0,
                completed_at: None,
            },
            items: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["table_id"], 3);
        assert_eq!(json["status"], "pending");
        assert!(json["items"].as_array().unwrap().is_empty());
    }
}
