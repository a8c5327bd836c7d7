//! Order lifecycle engine
//!
//! Applies placements, patches, item status changes and deletes against the
//! store, then hands the resulting events to the injected publisher. Publishing
//! happens after commit and never fails the call.

use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Dish, DishModifier, KitchenOrder, Order, OrderDetail, OrderItem, OrderItemModifier,
    OrderItemStatus, OrderStatus,
};
use shared::realtime::RealtimeEvent;
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteExecutor, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use super::kitchen::{self, KitchenQuery};
use super::transitions::{self, enters_kitchen, is_administrative};
use super::{money, owned_order};
use crate::db::{begin_write, catalog, dining_tables, order_items, orders, payments};
use crate::error::ServiceResult;
use crate::live::EventPublisher;

/// One dish line of a new order
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderItem {
    pub dish_id: i64,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i32,
    /// Free-text note for the kitchen
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub modifier_ids: Vec<i64>,
}

/// Order placement request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrder {
    pub table_id: i64,
    pub customer_id: Option<i64>,
    /// Defaults to the placing user
    pub waiter_id: Option<i64>,
    /// `unsubmit`, `approved` or `pending` (default)
    pub status: Option<OrderStatus>,
    #[validate(nested)]
    pub dishes: Vec<CreateOrderItem>,
}

/// Partial order update. Totals are never client-supplied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub waiter_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateItemStatus {
    pub status: OrderItemStatus,
}

#[derive(Clone)]
pub struct OrderLifecycle {
    pool: SqlitePool,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderLifecycle {
    pub fn new(pool: SqlitePool, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { pool, publisher }
    }

    /// Place an order with its items in one store transaction
    pub async fn create_order(
        &self,
        tenant_id: &str,
        user_id: i64,
        input: CreateOrder,
    ) -> ServiceResult<OrderDetail> {
        // 1. Shape checks
        if input.dishes.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }
        for dish in &input.dishes {
            money::validate_quantity(dish.quantity)?;
            if dish
                .description
                .as_ref()
                .is_some_and(|d| d.chars().count() > money::MAX_NOTE_LEN)
            {
                return Err(AppError::invalid_field("description", "note is too long").into());
            }
        }
        let status = match input.status {
            None => OrderStatus::Pending,
            Some(s @ (OrderStatus::Unsubmit | OrderStatus::Approved | OrderStatus::Pending)) => s,
            Some(other) => {
                return Err(AppError::invalid_field(
                    "status",
                    format!("orders cannot be created as {other}"),
                )
                .into());
            }
        };

        // 2. Table must exist in-tenant and accept orders
        require_table(&self.pool, tenant_id, input.table_id).await?;

        // 3. Resolve dishes and modifiers (one batched lookup each)
        let dish_ids: Vec<i64> = input.dishes.iter().map(|d| d.dish_id).collect();
        let dishes: HashMap<i64, Dish> = catalog::find_dishes(&self.pool, tenant_id, &dish_ids)
            .await?
            .into_iter()
            .filter(|d| d.is_available)
            .map(|d| (d.id, d))
            .collect();

        let modifier_ids: Vec<i64> = input
            .dishes
            .iter()
            .flat_map(|d| d.modifier_ids.iter().copied())
            .collect();
        let modifiers: HashMap<i64, DishModifier> =
            catalog::find_modifiers(&self.pool, tenant_id, &modifier_ids)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect();

        // 4. Build rows, snapshotting prices
        let now = now_millis();
        let order_id = snowflake_id();
        let mut items = Vec::with_capacity(input.dishes.len());
        for line in &input.dishes {
            let dish = dishes.get(&line.dish_id).ok_or_else(|| {
                AppError::new(ErrorCode::DishNotFound).with_detail("dish_id", line.dish_id)
            })?;
            let item_id = snowflake_id();

            let mut item_modifiers = Vec::with_capacity(line.modifier_ids.len());
            for modifier_id in &line.modifier_ids {
                let modifier = modifiers
                    .get(modifier_id)
                    .filter(|m| m.dish_id == dish.id)
                    .ok_or_else(|| {
                        AppError::new(ErrorCode::ModifierNotFound)
                            .with_detail("modifier_id", *modifier_id)
                            .with_detail("dish_id", dish.id)
                    })?;
                item_modifiers.push(OrderItemModifier {
                    id: snowflake_id(),
                    tenant_id: tenant_id.to_string(),
                    order_item_id: item_id,
                    modifier_id: modifier.id,
                    name: modifier.name.clone(),
                    price_delta: modifier.price_delta,
                });
            }

            items.push(OrderItem {
                id: item_id,
                tenant_id: tenant_id.to_string(),
                order_id,
                dish_id: dish.id,
                quantity: line.quantity,
                unit_price: dish.price,
                note: line
                    .description
                    .as_ref()
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                status: OrderItemStatus::Pending,
                created_at: now,
                updated_at: now,
                modifiers: item_modifiers,
            });
        }

        let order = Order {
            id: order_id,
            tenant_id: tenant_id.to_string(),
            table_id: input.table_id,
            customer_id: input.customer_id,
            waiter_id: Some(input.waiter_id.unwrap_or(user_id)),
            status,
            total_amount: money::order_total(&items)?,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        // 5. Persist order and items together
        let mut tx = begin_write(&self.pool).await?;
        orders::insert_order(&mut *tx, &order).await?;
        for item in &items {
            order_items::insert_item_with_modifiers(&mut tx, item).await?;
        }
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            order_id,
            table_id = order.table_id,
            status = %order.status,
            total_amount = order.total_amount,
            items = items.len(),
            "Order created"
        );

        // 6. Fan-out
        self.publisher.publish(
            tenant_id,
            RealtimeEvent::OrderCreated {
                order: order.clone(),
                items: items.clone(),
            },
        );
        if enters_kitchen(order.status) {
            self.publisher.publish(
                tenant_id,
                RealtimeEvent::KitchenNewOrder {
                    order: order.clone(),
                    items: items.clone(),
                },
            );
        }

        Ok(OrderDetail { order, items })
    }

    /// Order with its items
    pub async fn get_order(&self, tenant_id: &str, id: i64) -> ServiceResult<OrderDetail> {
        let mut conn = self.pool.acquire().await?;
        let order = owned_order(orders::find_order(&mut *conn, id).await?, tenant_id, id)?;
        let items = order_items::list_items_by_order(&mut conn, id).await?;
        Ok(OrderDetail { order, items })
    }

    /// Tenant's orders, newest first
    pub async fn list_orders(
        &self,
        tenant_id: &str,
        status: Option<OrderStatus>,
    ) -> ServiceResult<Vec<Order>> {
        Ok(orders::list_orders(&self.pool, tenant_id, status).await?)
    }

    /// Apply a partial update, enforcing the status transition table.
    /// Read and write share one write transaction, so a concurrent item change
    /// is either fully before or fully after this update.
    pub async fn update_order(
        &self,
        tenant_id: &str,
        id: i64,
        patch: OrderPatch,
    ) -> ServiceResult<Order> {
        let mut tx = begin_write(&self.pool).await?;

        // 1. Ownership and open-order checks
        let current = owned_order(orders::find_order(&mut *tx, id).await?, tenant_id, id)?;
        ensure_open(&current)?;

        // 2. Status
        let mut next = current.clone();
        let mut status_changed = false;
        if let Some(to) = patch.status {
            status_changed = transitions::check_order_transition(current.status, to)?;
            next.status = to;
        }

        // 3. Table reassignment
        if let Some(table_id) = patch.table_id
            && table_id != current.table_id
        {
            require_table(&mut *tx, tenant_id, table_id).await?;
            next.table_id = table_id;
        }

        if let Some(waiter_id) = patch.waiter_id {
            next.waiter_id = Some(waiter_id);
        }

        if next == current {
            return Ok(current);
        }

        // 4. Persist
        let now = now_millis();
        next.updated_at = now;
        if next.status == OrderStatus::Completed && current.status != OrderStatus::Completed {
            next.completed_at = Some(now);
        }
        if orders::update_order(&mut *tx, &next, current.status).await? == 0 {
            return Err(AppError::with_message(
                ErrorCode::InvalidOrderTransition,
                "order status changed concurrently",
            )
            .with_detail("order_id", id)
            .into());
        }
        let kitchen_items = if status_changed && enters_kitchen(next.status) {
            Some(order_items::list_items_by_order(&mut tx, id).await?)
        } else {
            None
        };
        tx.commit().await?;

        tracing::info!(
            tenant_id = %tenant_id,
            order_id = id,
            from = %current.status,
            to = %next.status,
            "Order updated"
        );

        // 5. Fan-out
        self.publisher.publish(
            tenant_id,
            RealtimeEvent::OrderUpdated {
                order: next.clone(),
            },
        );
        if let Some(items) = kitchen_items {
            self.publisher.publish(
                tenant_id,
                RealtimeEvent::KitchenNewOrder {
                    order: next.clone(),
                    items,
                },
            );
        }
        if status_changed && is_administrative(next.status) {
            self.publisher.publish(
                tenant_id,
                RealtimeEvent::AdminOrderStatusChanged {
                    order_id: id,
                    from: current.status,
                    to: next.status,
                    total_amount: next.total_amount,
                },
            );
        }

        Ok(next)
    }

    /// Move one item through its status table and recompute the order total
    pub async fn update_order_item_status(
        &self,
        tenant_id: &str,
        order_id: i64,
        item_id: i64,
        to: OrderItemStatus,
    ) -> ServiceResult<OrderDetail> {
        let mut tx = begin_write(&self.pool).await?;

        let mut order = owned_order(
            orders::find_order(&mut *tx, order_id).await?,
            tenant_id,
            order_id,
        )?;
        ensure_open(&order)?;

        let item = order_items::find_item(&mut tx, item_id)
            .await?
            .filter(|item| item.order_id == order_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderItemNotFound)
                    .with_detail("order_id", order_id)
                    .with_detail("item_id", item_id)
            })?;
        let from = item.status;
        let changed = transitions::check_item_transition(from, to)?;

        let now = now_millis();
        if changed {
            order_items::update_item_status(&mut *tx, item_id, to, now).await?;
        }
        let items = order_items::list_items_by_order(&mut tx, order_id).await?;
        if changed {
            let total = money::order_total(&items)?;
            orders::update_total(&mut *tx, order_id, total, now).await?;
            order.total_amount = total;
            order.updated_at = now;
        }
        tx.commit().await?;

        if changed {
            tracing::info!(
                tenant_id = %tenant_id,
                order_id,
                item_id,
                from = %from,
                to = %to,
                total_amount = order.total_amount,
                "Order item status changed"
            );

            let updated = items
                .iter()
                .find(|i| i.id == item_id)
                .cloned()
                .unwrap_or(OrderItem {
                    status: to,
                    updated_at: now,
                    ..item
                });
            let dish_id = updated.dish_id;
            self.publisher.publish(
                tenant_id,
                RealtimeEvent::OrderDetailUpdated {
                    order_id,
                    item: updated,
                    total_amount: order.total_amount,
                },
            );
            self.publisher.publish(
                tenant_id,
                RealtimeEvent::KitchenDishStatusChanged {
                    order_id,
                    item_id,
                    dish_id,
                    from,
                    to,
                },
            );
        }

        Ok(OrderDetail { order, items })
    }

    /// Remove an order with its items. Refused while a payment references it.
    pub async fn delete_order(&self, tenant_id: &str, id: i64) -> ServiceResult<()> {
        let mut tx = begin_write(&self.pool).await?;

        owned_order(orders::find_order(&mut *tx, id).await?, tenant_id, id)?;
        if payments::exists_for_order(&mut *tx, id).await? {
            return Err(AppError::new(ErrorCode::OrderHasPayment)
                .with_detail("order_id", id)
                .into());
        }

        // Children first: the store does not cascade
        let removed_items = order_items::delete_items_by_order(&mut tx, id).await?;
        orders::delete_order(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(tenant_id = %tenant_id, order_id = id, removed_items, "Order deleted");

        self.publisher
            .publish(tenant_id, RealtimeEvent::OrderDeleted { order_id: id });
        Ok(())
    }

    /// Kitchen queue for a tenant
    pub async fn list_kitchen_orders(
        &self,
        tenant_id: &str,
        query: KitchenQuery,
    ) -> ServiceResult<Vec<KitchenOrder>> {
        kitchen::list_kitchen_orders(&self.pool, tenant_id, query).await
    }
}

/// Table must exist in the tenant and accept orders
async fn require_table<'e, E: SqliteExecutor<'e>>(
    executor: E,
    tenant_id: &str,
    table_id: i64,
) -> ServiceResult<()> {
    let table = dining_tables::find_table(executor, tenant_id, table_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id))?;
    if !table.accepts_orders() {
        return Err(AppError::new(ErrorCode::TableInactive)
            .with_detail("table_id", table_id)
            .into());
    }
    Ok(())
}

/// Paid and cancelled orders are closed to every change
fn ensure_open(order: &Order) -> Result<(), AppError> {
    match order.status {
        OrderStatus::Paid => {
            Err(AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", order.id))
        }
        OrderStatus::Cancelled => Err(
            AppError::new(ErrorCode::OrderAlreadyCancelled).with_detail("order_id", order.id),
        ),
        _ => Ok(()),
    }
}
