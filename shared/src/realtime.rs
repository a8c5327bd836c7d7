//! Real-time event catalog
//!
//! The single list of events pushed to connected clients. Each event knows
//! the channel it belongs to, so a publisher only needs the tenant id to
//! address it.
//!
//! ```text
//! tenant:{id}            order:created, order:updated,
//!                        order_detail:updated, order:deleted
//! tenant:{id}:kitchen    kitchen:new_order, kitchen:dish_status_changed
//! tenant:{id}:admin      admin:order_status_changed
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderItem, OrderItemStatus, OrderStatus};

/// Channel kind within a tenant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Tenant,
    Kitchen,
    Admin,
}

impl Channel {
    /// Addressable topic name for a tenant
    pub fn topic(&self, tenant_id: &str) -> String {
        match self {
            Self::Tenant => format!("tenant:{tenant_id}"),
            Self::Kitchen => format!("tenant:{tenant_id}:kitchen"),
            Self::Admin => format!("tenant:{tenant_id}:admin"),
        }
    }
}

/// Lifecycle event, serialized as `{"event": "<name>", "data": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum RealtimeEvent {
    #[serde(rename = "order:created")]
    OrderCreated { order: Order, items: Vec<OrderItem> },

    #[serde(rename = "order:updated")]
    OrderUpdated { order: Order },

    #[serde(rename = "order_detail:updated")]
    OrderDetailUpdated {
        order_id: i64,
        item: OrderItem,
        total_amount: i64,
    },

    #[serde(rename = "order:deleted")]
    OrderDeleted { order_id: i64 },

    #[serde(rename = "kitchen:new_order")]
    KitchenNewOrder { order: Order, items: Vec<OrderItem> },

    #[serde(rename = "kitchen:dish_status_changed")]
    KitchenDishStatusChanged {
        order_id: i64,
        item_id: i64,
        dish_id: i64,
        from: OrderItemStatus,
        to: OrderItemStatus,
    },

    #[serde(rename = "admin:order_status_changed")]
    AdminOrderStatusChanged {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
        total_amount: i64,
    },
}

impl RealtimeEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "order:created",
            Self::OrderUpdated { .. } => "order:updated",
            Self::OrderDetailUpdated { .. } => "order_detail:updated",
            Self::OrderDeleted { .. } => "order:deleted",
            Self::KitchenNewOrder { .. } => "kitchen:new_order",
            Self::KitchenDishStatusChanged { .. } => "kitchen:dish_status_changed",
            Self::AdminOrderStatusChanged { .. } => "admin:order_status_changed",
        }
    }

    /// Channel the event is published on
    pub fn channel(&self) -> Channel {
        match self {
            Self::OrderCreated { .. }
            | Self::OrderUpdated { .. }
            | Self::OrderDetailUpdated { .. }
            | Self::OrderDeleted { .. } => Channel::Tenant,
            Self::KitchenNewOrder { .. } | Self::KitchenDishStatusChanged { .. } => {
                Channel::Kitchen
            }
            Self::AdminOrderStatusChanged { .. } => Channel::Admin,
        }
    }
}

/// Frame delivered to a subscriber
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveEnvelope {
    pub channel: String,
    #[serde(flatten)]
    pub event: RealtimeEvent,
}

impl LiveEnvelope {
    pub fn new(tenant_id: &str, event: RealtimeEvent) -> Self {
        Self {
            channel: event.channel().topic(tenant_id),
            event,
        }
    }
}
