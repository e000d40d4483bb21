// src/engine/broadcast.rs - Realtime Fan-Out
//! Event fan-out to connected staff viewers.
//!
//! Built on a bounded `tokio::sync::broadcast` channel: every viewer holds
//! its own receiver, so delivery to one viewer is isolated from all others
//! and from the request that published the event. A publish with zero
//! subscribers succeeds silently. Receivers see events in publish order,
//! which gives per-order causal ordering; a viewer that falls behind the
//! queue capacity lags and skips forward rather than stalling publishers.

use tokio::sync::broadcast;
use tracing::debug;

use crate::core::{
    events::{OrderEvent, OrderEventType},
    order::Order,
};

/// Fan-out handle. Cheap to clone; all clones share one channel.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<OrderEvent>,
}

impl Broadcaster {
    /// Create a broadcaster with the given per-viewer queue capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Deliver an event to every currently connected viewer. Never blocks
    /// and never fails the caller: with no viewers attached the event is
    /// simply dropped.
    pub fn publish(&self, event: OrderEventType, order: &Order) {
        let delivered = self
            .tx
            .send(OrderEvent::new(event, order.clone()))
            .unwrap_or(0);
        debug!(event = event.as_str(), order_id = %order.id, viewers = delivered, "published");
    }

    /// Attach a new viewer. The receiver sees only events published after
    /// this call; there is no replay.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    /// Number of currently attached viewers.
    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
