//! Kitchen queue projection
//!
//! Orders of a tenant in one status (default `pending`), oldest first, each
//! with its items and resolved dish names. With an item status filter, orders
//! left without matching items are dropped rather than returned empty.

use serde::Deserialize;
use shared::models::{Dish, KitchenOrder, KitchenOrderItem, Order, OrderItem, OrderItemStatus, OrderStatus};
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::db::{catalog, order_items, orders};
use crate::error::ServiceResult;

/// `GET /kitchen/orders?status=&item_status=`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct KitchenQuery {
    pub status: Option<OrderStatus>,
    pub item_status: Option<OrderItemStatus>,
}

pub async fn list_kitchen_orders(
    pool: &SqlitePool,
    tenant_id: &str,
    query: KitchenQuery,
) -> ServiceResult<Vec<KitchenOrder>> {
    let status = query.status.unwrap_or(OrderStatus::Pending);
    let mut conn = pool.acquire().await?;

    let mut queue = orders::list_orders_by_statuses(&mut *conn, tenant_id, &[status]).await?;
    if queue.is_empty() {
        return Ok(Vec::new());
    }
    queue.reverse();

    let order_ids: Vec<i64> = queue.iter().map(|o| o.id).collect();
    let items = order_items::list_items_by_orders(&mut conn, &order_ids, query.item_status).await?;

    let dish_ids: Vec<i64> = items.iter().map(|i| i.dish_id).collect();
    let dishes = catalog::find_dishes(&mut *conn, tenant_id, &dish_ids).await?;

    let view = group_kitchen_orders(queue, items, &dishes, query.item_status.is_some());
    tracing::debug!(
        tenant_id = %tenant_id,
        status = %status,
        orders = view.len(),
        "Kitchen queue built"
    );
    Ok(view)
}

/// Group items under their orders, keeping the order sequence of `orders`
pub fn group_kitchen_orders(
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    dishes: &[Dish],
    drop_empty: bool,
) -> Vec<KitchenOrder> {
    let names: HashMap<i64, &str> = dishes.iter().map(|d| (d.id, d.name.as_str())).collect();

    let mut by_order: HashMap<i64, Vec<KitchenOrderItem>> = HashMap::new();
    for item in items {
        let dish_name = names.get(&item.dish_id).copied().unwrap_or_default().to_string();
        by_order
            .entry(item.order_id)
            .or_default()
            .push(KitchenOrderItem {
                item_id: item.id,
                dish_id: item.dish_id,
                dish_name,
                quantity: item.quantity,
                note: item.note,
                status: item.status,
                modifiers: item.modifiers.into_iter().map(|m| m.name).collect(),
            });
    }

    orders
        .into_iter()
        .filter_map(|order| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            if drop_empty && items.is_empty() {
                return None;
            }
            Some(KitchenOrder {
                order_id: order.id,
                table_id: order.table_id,
                status: order.status,
                waiter_id: order.waiter_id,
                created_at: order.created_at,
                items,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64) -> Order {
        Order {
            id,
            tenant_id: "t1".into(),
            table_id: 10 + id,
            customer_id: None,
            waiter_id: Some(1),
            status: OrderStatus::Pending,
            total_amount: 0,
            created_at: id,
            updated_at: id,
            completed_at: None,
        }
    }

    fn item(id: i64, order_id: i64, dish_id: i64, status: OrderItemStatus) -> OrderItem {
        OrderItem {
            id,
            tenant_id: "t1".into(),
            order_id,
            dish_id,
            quantity: 1,
            unit_price: 100,
            note: None,
            status,
            created_at: 0,
            updated_at: 0,
            modifiers: vec![],
        }
    }

    fn dish(id: i64, name: &str) -> Dish {
        Dish {
            id,
            tenant_id: "t1".into(),
            name: name.into(),
            price: 100,
            is_available: true,
        }
    }

    #[test]
    fn test_groups_items_under_orders_in_sequence() {
        let view = group_kitchen_orders(
            vec![order(1), order(2)],
            vec![
                item(11, 1, 7, OrderItemStatus::Pending),
                item(21, 2, 8, OrderItemStatus::Ready),
                item(12, 1, 8, OrderItemStatus::Pending),
            ],
            &[dish(7, "Pho"), dish(8, "Banh mi")],
            false,
        );

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].order_id, 1);
        assert_eq!(view[0].items.len(), 2);
        assert_eq!(view[0].items[0].dish_name, "Pho");
        assert_eq!(view[1].items[0].dish_name, "Banh mi");
    }

    #[test]
    fn test_filtered_view_drops_orders_without_matches() {
        let view = group_kitchen_orders(
            vec![order(1), order(2)],
            vec![item(21, 2, 7, OrderItemStatus::Ready)],
            &[dish(7, "Pho")],
            true,
        );
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].order_id, 2);
    }

    #[test]
    fn test_unfiltered_view_keeps_empty_orders() {
        let view = group_kitchen_orders(vec![order(1)], vec![], &[], false);
        assert_eq!(view.len(), 1);
        assert!(view[0].items.is_empty());
    }

    #[test]
    fn test_unknown_dish_has_empty_name() {
        let view = group_kitchen_orders(
            vec![order(1)],
            vec![item(11, 1, 99, OrderItemStatus::Pending)],
            &[],
            false,
        );
        assert_eq!(view[0].items[0].dish_name, "");
    }
}
