mod common;

use common::*;
use mesa_server::orders::OrderPatch;
use shared::error::ErrorCode;
use shared::models::{OrderItemStatus, OrderStatus};
use shared::realtime::RealtimeEvent;

// ========================================================================
// Placement
// ========================================================================

#[tokio::test]
async fn test_create_order_snapshots_prices_and_total() {
    let app = setup().await;
    let mut rice = dish(DISH_RICE, 2);
    rice.modifier_ids = vec![MOD_EGG];
    rice.description = Some("  no onion  ".into());

    let detail = app
        .state
        .lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![rice, dish(DISH_SOUP, 1)]))
        .await
        .unwrap();

    // (50000 + 5000) * 2 + 30000
    assert_eq!(detail.order.total_amount, 140_000);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.waiter_id, Some(WAITER_ID));
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].unit_price, 50_000);
    assert_eq!(detail.items[0].note.as_deref(), Some("no onion"));
    assert_eq!(detail.items[0].modifiers.len(), 1);
    assert_eq!(detail.items[0].modifiers[0].name, "Extra egg");
    assert!(detail.items.iter().all(|i| i.status == OrderItemStatus::Pending));

    assert_eq!(app.events.names(), vec!["order:created", "kitchen:new_order"]);
    assert!(app.events.events().iter().all(|(t, _)| t == TENANT_A));

    // Read-back matches what was returned
    let stored = app
        .state
        .lifecycle
        .get_order(TENANT_A, detail.order.id)
        .await
        .unwrap();
    assert_eq!(stored, detail);
}

#[tokio::test]
async fn test_unsubmitted_order_skips_kitchen() {
    let app = setup().await;
    let mut req = new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]);
    req.status = Some(OrderStatus::Unsubmit);

    let detail = app
        .state
        .lifecycle
        .create_order(TENANT_A, WAITER_ID, req)
        .await
        .unwrap();

    assert_eq!(detail.order.status, OrderStatus::Unsubmit);
    assert_eq!(app.events.names(), vec!["order:created"]);
}

#[tokio::test]
async fn test_create_order_rejections() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;

    let cases = vec![
        (new_order(TABLE_ID, vec![]), ErrorCode::OrderEmpty),
        (new_order(TABLE_ID, vec![dish(9_999, 1)]), ErrorCode::DishNotFound),
        (new_order(TABLE_ID, vec![dish(DISH_SOLD_OUT, 1)]), ErrorCode::DishNotFound),
        // Another tenant's dish does not resolve
        (new_order(TABLE_ID, vec![dish(DISH_B, 1)]), ErrorCode::DishNotFound),
        (new_order(999, vec![dish(DISH_RICE, 1)]), ErrorCode::TableNotFound),
        (new_order(TABLE_B_ID, vec![dish(DISH_RICE, 1)]), ErrorCode::TableNotFound),
        (
            new_order(INACTIVE_TABLE_ID, vec![dish(DISH_RICE, 1)]),
            ErrorCode::TableInactive,
        ),
        (new_order(TABLE_ID, vec![dish(DISH_RICE, 0)]), ErrorCode::ValueOutOfRange),
    ];

    for (req, expected) in cases {
        let err = lifecycle
            .create_order(TENANT_A, WAITER_ID, req)
            .await
            .unwrap_err();
        assert_eq!(code_of(err), expected);
    }

    // Modifier belongs to a different dish
    let mut soup = dish(DISH_SOUP, 1);
    soup.modifier_ids = vec![MOD_EGG];
    let err = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![soup]))
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::ModifierNotFound);

    // Orders cannot be born completed
    let mut req = new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]);
    req.status = Some(OrderStatus::Completed);
    let err = lifecycle
        .create_order(TENANT_A, WAITER_ID, req)
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::ValidationFailed);

    // Nothing was persisted or published
    assert!(lifecycle.list_orders(TENANT_A, None).await.unwrap().is_empty());
    assert!(app.events.events().is_empty());
}

// ========================================================================
// Order updates
// ========================================================================

#[tokio::test]
async fn test_status_walk_publishes_kitchen_and_admin_events() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let mut req = new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]);
    req.status = Some(OrderStatus::Approved);
    let id = lifecycle
        .create_order(TENANT_A, WAITER_ID, req)
        .await
        .unwrap()
        .order
        .id;
    app.events.clear();

    // Approved -> Pending: enters the kitchen queue
    let patch = OrderPatch {
        status: Some(OrderStatus::Pending),
        ..Default::default()
    };
    let order = lifecycle.update_order(TENANT_A, id, patch).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(app.events.names(), vec!["order:updated", "kitchen:new_order"]);
    app.events.clear();

    // Pending -> Completed: admin notification, completion time stamped
    let patch = OrderPatch {
        status: Some(OrderStatus::Completed),
        ..Default::default()
    };
    let order = lifecycle.update_order(TENANT_A, id, patch).await.unwrap();
    assert!(order.completed_at.is_some());
    assert_eq!(
        app.events.names(),
        vec!["order:updated", "admin:order_status_changed"]
    );
    match &app.events.events()[1].1 {
        RealtimeEvent::AdminOrderStatusChanged { from, to, .. } => {
            assert_eq!(*from, OrderStatus::Pending);
            assert_eq!(*to, OrderStatus::Completed);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_transition_leaves_order_untouched() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let id = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap()
        .order
        .id;
    app.events.clear();

    for to in [OrderStatus::Unsubmit, OrderStatus::Paid] {
        let patch = OrderPatch {
            status: Some(to),
            ..Default::default()
        };
        let err = lifecycle.update_order(TENANT_A, id, patch).await.unwrap_err();
        assert_eq!(code_of(err), ErrorCode::InvalidOrderTransition);
    }

    let stored = lifecycle.get_order(TENANT_A, id).await.unwrap();
    assert_eq!(stored.order.status, OrderStatus::Pending);
    assert!(app.events.events().is_empty());
}

#[tokio::test]
async fn test_noop_patch_publishes_nothing() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let created = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap()
        .order;
    app.events.clear();

    let patch = OrderPatch {
        status: Some(OrderStatus::Pending),
        table_id: Some(TABLE_ID),
        waiter_id: Some(WAITER_ID),
    };
    let order = lifecycle
        .update_order(TENANT_A, created.id, patch)
        .await
        .unwrap();
    assert_eq!(order, created);
    assert!(app.events.events().is_empty());
}

#[tokio::test]
async fn test_cancelled_order_is_closed() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let id = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap()
        .order
        .id;

    let cancel = OrderPatch {
        status: Some(OrderStatus::Cancelled),
        ..Default::default()
    };
    lifecycle.update_order(TENANT_A, id, cancel).await.unwrap();

    let reassign = OrderPatch {
        waiter_id: Some(1),
        ..Default::default()
    };
    let err = lifecycle
        .update_order(TENANT_A, id, reassign)
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::OrderAlreadyCancelled);
}

#[tokio::test]
async fn test_cross_tenant_access_is_denied() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let id = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap()
        .order
        .id;
    app.events.clear();

    let err = lifecycle.get_order(TENANT_B, id).await.unwrap_err();
    assert_eq!(code_of(err), ErrorCode::AccessDenied);

    let err = lifecycle
        .update_order(TENANT_B, id, OrderPatch::default())
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::AccessDenied);

    let err = lifecycle.delete_order(TENANT_B, id).await.unwrap_err();
    assert_eq!(code_of(err), ErrorCode::AccessDenied);

    assert!(lifecycle.list_orders(TENANT_B, None).await.unwrap().is_empty());
    assert!(app.events.events().is_empty());

    let err = lifecycle.get_order(TENANT_A, 12_345).await.unwrap_err();
    assert_eq!(code_of(err), ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_list_orders_filters_by_status() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let first = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap()
        .order
        .id;
    let mut req = new_order(TABLE_ID, vec![dish(DISH_SOUP, 1)]);
    req.status = Some(OrderStatus::Unsubmit);
    let second = lifecycle
        .create_order(TENANT_A, WAITER_ID, req)
        .await
        .unwrap()
        .order
        .id;

    let all = lifecycle.list_orders(TENANT_A, None).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|o| o.id).collect();
    // Newest first
    assert_eq!(ids, vec![second, first]);

    let pending = lifecycle
        .list_orders(TENANT_A, Some(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first);
}

// ========================================================================
// Item status
// ========================================================================

#[tokio::test]
async fn test_item_status_flow_recomputes_total() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let detail = lifecycle
        .create_order(
            TENANT_A,
            WAITER_ID,
            new_order(TABLE_ID, vec![dish(DISH_RICE, 2), dish(DISH_SOUP, 1)]),
        )
        .await
        .unwrap();
    let order_id = detail.order.id;
    let rice = detail.items[0].id;
    let soup = detail.items[1].id;
    assert_eq!(detail.order.total_amount, 130_000);
    app.events.clear();

    // Pending -> Ready
    let after = lifecycle
        .update_order_item_status(TENANT_A, order_id, rice, OrderItemStatus::Ready)
        .await
        .unwrap();
    assert_eq!(after.order.total_amount, 130_000);
    assert_eq!(
        app.events.names(),
        vec!["order_detail:updated", "kitchen:dish_status_changed"]
    );
    app.events.clear();

    // Cancelling the soup drops it from the total
    let after = lifecycle
        .update_order_item_status(TENANT_A, order_id, soup, OrderItemStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(after.order.total_amount, 100_000);
    match &app.events.events()[0].1 {
        RealtimeEvent::OrderDetailUpdated {
            item, total_amount, ..
        } => {
            assert_eq!(item.id, soup);
            assert_eq!(item.status, OrderItemStatus::Cancelled);
            assert_eq!(*total_amount, 100_000);
        }
        other => panic!("unexpected event {other:?}"),
    }
    let stored = lifecycle.get_order(TENANT_A, order_id).await.unwrap();
    assert_eq!(stored.order.total_amount, 100_000);
    app.events.clear();

    // Same status on an open item is a no-op
    lifecycle
        .update_order_item_status(TENANT_A, order_id, rice, OrderItemStatus::Ready)
        .await
        .unwrap();
    assert!(app.events.events().is_empty());

    // Backwards and out-of-terminal moves are rejected
    let err = lifecycle
        .update_order_item_status(TENANT_A, order_id, rice, OrderItemStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::InvalidItemTransition);
    let err = lifecycle
        .update_order_item_status(TENANT_A, order_id, soup, OrderItemStatus::Ready)
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::InvalidItemTransition);
}

#[tokio::test]
async fn test_item_must_belong_to_order() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let a = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap();
    let b = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_SOUP, 1)]))
        .await
        .unwrap();

    let err = lifecycle
        .update_order_item_status(TENANT_A, a.order.id, b.items[0].id, OrderItemStatus::Ready)
        .await
        .unwrap_err();
    assert_eq!(code_of(err), ErrorCode::OrderItemNotFound);
}

// ========================================================================
// Delete
// ========================================================================

#[tokio::test]
async fn test_delete_order_removes_items() {
    let app = setup().await;
    let lifecycle = &app.state.lifecycle;
    let mut rice = dish(DISH_RICE, 1);
    rice.modifier_ids = vec![MOD_EGG];
    let id = lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![rice]))
        .await
        .unwrap()
        .order
        .id;
    app.events.clear();

    lifecycle.delete_order(TENANT_A, id).await.unwrap();
    assert_eq!(app.events.names(), vec!["order:deleted"]);

    let err = lifecycle.get_order(TENANT_A, id).await.unwrap_err();
    assert_eq!(code_of(err), ErrorCode::OrderNotFound);

    let err = lifecycle.delete_order(TENANT_A, id).await.unwrap_err();
    assert_eq!(code_of(err), ErrorCode::OrderNotFound);
}
