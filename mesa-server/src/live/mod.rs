//! LiveHub: tenant-scoped real-time fan-out
//!
//! Every lifecycle event is addressed to one topic derived from its tenant and
//! channel. Each topic owns a single `broadcast::Sender`, so delivery order on
//! a topic equals publish order.
//!
//! ```text
//! OrderLifecycle / SettlementService
//!       │ publish(tenant_id, RealtimeEvent)     (sync, never fails)
//!       ▼
//! LiveHub
//!   └── topics: "tenant:{id}" / "tenant:{id}:kitchen" / "tenant:{id}:admin"
//!         └── broadcast::Sender<Arc<LiveEnvelope>>
//!               │
//!               ▼
//!         WS handler (role → channels → merged receiver stream)
//! ```
//!
//! Publishing is best-effort: a topic without subscribers drops the event.

use dashmap::DashMap;
use futures::Stream;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use shared::models::Role;
use shared::realtime::{Channel, LiveEnvelope, RealtimeEvent};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Default per-topic buffer, enough to absorb a burst while a socket catches up
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Sink for lifecycle events, injected into the engines.
///
/// Implementations must not block and must not fail the caller.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, tenant_id: &str, event: RealtimeEvent);
}

/// Broadcast hub keyed by topic
#[derive(Clone)]
pub struct LiveHub {
    /// topic → sender
    topics: Arc<DashMap<String, broadcast::Sender<Arc<LiveEnvelope>>>>,
    capacity: usize,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl LiveHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to one channel of a tenant
    pub fn subscribe(
        &self,
        tenant_id: &str,
        channel: Channel,
    ) -> broadcast::Receiver<Arc<LiveEnvelope>> {
        self.get_or_create_topic(&channel.topic(tenant_id)).subscribe()
    }

    /// Subscribe to every channel a role may see, merged into one stream.
    ///
    /// Each item is either an envelope or `RecvError::Lagged(n)` when the
    /// connection fell behind on one topic. The stream ends once all topics close.
    pub fn subscribe_role(
        &self,
        tenant_id: &str,
        role: Role,
    ) -> impl Stream<Item = Result<Arc<LiveEnvelope>, RecvError>> + Send + Unpin + 'static {
        let receivers: Vec<_> = role
            .channels()
            .iter()
            .map(|channel| self.subscribe(tenant_id, *channel))
            .collect();

        stream::select_all(receivers.into_iter().map(|rx| {
            stream::unfold(rx, |mut rx| async move {
                match rx.recv().await {
                    Err(RecvError::Closed) => None,
                    other => Some((other, rx)),
                }
            })
            .boxed()
        }))
    }

    /// Number of live receivers on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    fn get_or_create_topic(
        &self,
        topic: &str,
    ) -> dashmap::mapref::one::Ref<'_, String, broadcast::Sender<Arc<LiveEnvelope>>> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .downgrade()
    }
}

impl EventPublisher for LiveHub {
    fn publish(&self, tenant_id: &str, event: RealtimeEvent) {
        let envelope = LiveEnvelope::new(tenant_id, event);
        let topic = envelope.channel.clone();
        let name = envelope.event.name();

        let Some(tx) = self.topics.get(&topic) else {
            tracing::debug!(topic = %topic, event = name, "No channel for topic, event dropped");
            return;
        };

        match tx.send(Arc::new(envelope)) {
            Ok(receivers) => {
                tracing::debug!(topic = %topic, event = name, receivers, "Event published");
            }
            Err(_) => {
                // Nobody listening: drop the event and reclaim the empty topic
                tracing::debug!(topic = %topic, event = name, "No subscribers, event dropped");
                drop(tx);
                self.topics
                    .remove_if(&topic, |_, tx| tx.receiver_count() == 0);
            }
        }
    }
}

/// Publisher that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _tenant_id: &str, _event: RealtimeEvent) {}
}

/// Publisher that records every event, for tests
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, RealtimeEvent)>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(tenant_id, event)` pairs in publish order
    pub fn events(&self) -> Vec<(String, RealtimeEvent)> {
        self.events.lock().clone()
    }

    /// Event names in publish order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|(_, e)| e.name()).collect()
    }

    /// Full topics (`tenant:{id}...`) in publish order
    pub fn topics(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|(tenant, e)| e.channel().topic(tenant))
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, tenant_id: &str, event: RealtimeEvent) {
        self.events.lock().push((tenant_id.to_string(), event));
    }
}
