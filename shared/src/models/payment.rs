//! Payment (invoice) Model

use serde::{Deserialize, Serialize};

use super::order::{Order, OrderItem};

/// How an order is settled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Card,
    EWallet,
    BankTransfer,
}

impl PaymentMethod {
    /// Deferred methods are created unpaid and need an explicit confirmation
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::BankTransfer)
    }
}

/// Settlement record closing an order. One per order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub tenant_id: String,
    pub order_id: i64,
    pub payment_method: PaymentMethod,
    pub subtotal: i64,
    /// Percent, e.g. `10.0` for 10%
    pub tax_rate: f64,
    pub tax_amount: i64,
    /// Percent
    pub service_charge_rate: f64,
    pub service_charge_amount: i64,
    /// Percent taken from the matching discount tier
    pub discount_percent: f64,
    pub discount_amount: i64,
    /// Final total
    pub amount: i64,
    /// Null until a deferred payment is confirmed
    pub paid_at: Option<i64>,
    pub created_at: i64,
}

impl Payment {
    pub fn is_confirmed(&self) -> bool {
        self.paid_at.is_some()
    }
}

/// Invoice projection: payment plus the order and the items it billed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub payment: Payment,
    pub order: Order,
    pub items: Vec<OrderItem>,
}
