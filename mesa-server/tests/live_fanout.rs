mod common;

use common::*;
use futures::{Stream, StreamExt};
use mesa_server::orders::OrderPatch;
use shared::models::{OrderStatus, Role};
use shared::realtime::{Channel, LiveEnvelope, RealtimeEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_millis(200);

async fn next_event<S>(stream: &mut S) -> Arc<LiveEnvelope>
where
    S: Stream<Item = Result<Arc<LiveEnvelope>, RecvError>> + Unpin,
{
    timeout(WAIT, stream.next())
        .await
        .expect("event within timeout")
        .expect("stream open")
        .expect("not lagged")
}

async fn assert_silent<S>(stream: &mut S)
where
    S: Stream<Item = Result<Arc<LiveEnvelope>, RecvError>> + Unpin,
{
    assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());
}

#[tokio::test]
async fn test_roles_receive_their_channels() {
    let state = setup_live().await;
    let mut waiter = state.live.subscribe_role(TENANT_A, Role::Waiter);
    let mut kitchen = state.live.subscribe_role(TENANT_A, Role::Kitchen);
    let mut admin = state.live.subscribe_role(TENANT_A, Role::Admin);
    let mut other_tenant = state.live.subscribe_role(TENANT_B, Role::Admin);

    let order_id = state
        .lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap()
        .order
        .id;

    // Waiter: tenant channel only
    let created = next_event(&mut waiter).await;
    assert_eq!(created.channel, "tenant:tenant-a");
    assert_eq!(created.event.name(), "order:created");
    assert_silent(&mut waiter).await;

    // Kitchen: tenant and kitchen channels
    let mut names = vec![
        next_event(&mut kitchen).await.event.name(),
        next_event(&mut kitchen).await.event.name(),
    ];
    names.sort_unstable();
    assert_eq!(names, vec!["kitchen:new_order", "order:created"]);

    // Admin sees status changes on its own channel
    state
        .lifecycle
        .update_order(
            TENANT_A,
            order_id,
            OrderPatch {
                status: Some(OrderStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut admin_names = Vec::new();
    while let Ok(Some(Ok(envelope))) = timeout(Duration::from_millis(50), admin.next()).await {
        admin_names.push((envelope.channel.clone(), envelope.event.name()));
    }
    assert!(admin_names.contains(&(
        "tenant:tenant-a:admin".to_string(),
        "admin:order_status_changed"
    )));
    assert!(admin_names.contains(&("tenant:tenant-a".to_string(), "order:updated")));

    // Nothing leaks across tenants
    assert_silent(&mut other_tenant).await;
}

#[tokio::test]
async fn test_per_channel_order_is_preserved() {
    let state = setup_live().await;
    let mut rx = state.live.subscribe(TENANT_A, Channel::Tenant);

    let mut created = Vec::new();
    for _ in 0..5 {
        let id = state
            .lifecycle
            .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_SOUP, 1)]))
            .await
            .unwrap()
            .order
            .id;
        created.push(id);
    }

    let mut seen = Vec::new();
    for _ in 0..5 {
        let envelope = timeout(WAIT, rx.recv()).await.unwrap().unwrap();
        match &envelope.event {
            RealtimeEvent::OrderCreated { order, .. } => seen.push(order.id),
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(seen, created);
}

#[tokio::test]
async fn test_events_without_subscribers_are_dropped() {
    let state = setup_live().await;

    // No connection: publishing must not fail the call
    state
        .lifecycle
        .create_order(TENANT_A, WAITER_ID, new_order(TABLE_ID, vec![dish(DISH_RICE, 1)]))
        .await
        .unwrap();

    assert_eq!(state.live.subscriber_count("tenant:tenant-a"), 0);
}
