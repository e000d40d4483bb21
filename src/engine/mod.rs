// src/engine/mod.rs - Order Lifecycle Engine
//! Order lifecycle: placement and status transitions.
//!
//! The engine is the single source of truth for derived fields. It computes
//! the total server-side (caller-supplied totals are never trusted), assigns
//! the id and creation instant exactly once, and emits exactly one realtime
//! event per successful operation before returning. Status transitions are
//! last-write-wins on purpose: the kitchen workflow has a single operator
//! and no contention in practice.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    core::{
        events::OrderEventType,
        order::{Order, OrderId, OrderStatus, PlaceOrder},
    },
    storage::OrderStore,
    Error, Result,
};

pub mod analytics;
pub mod broadcast;

pub use analytics::Analytics;
pub use broadcast::Broadcaster;

/// Validates and applies order lifecycle operations.
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    broadcaster: Broadcaster,
}

impl OrderEngine {
    pub fn new(store: Arc<dyn OrderStore>, broadcaster: Broadcaster) -> Self {
        Self { store, broadcaster }
    }

    /// Place a new order: compute the total, stamp `incoming` status and a
    /// creation instant, persist, and notify viewers.
    ///
    /// Fails with a validation error only when `items` is structurally
    /// malformed; missing optional fields are tolerated.
    #[instrument(skip(self, request))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order> {
        let items = request.parse_items()?;

        let order = Order {
            id: Uuid::new_v4(),
            order_type: request.order_type,
            customer_name: request.customer_name,
            mobile: request.mobile,
            table_number: request.table_number,
            address: request.address,
            total: Order::compute_total(&items),
            items,
            status: OrderStatus::incoming(),
            created_at: Utc::now(),
        };

        self.store.save(order.clone()).await?;
        self.broadcaster.publish(OrderEventType::NewOrder, &order);

        info!(order_id = %order.id, total = order.total, "order placed");
        Ok(order)
    }

    /// Apply a status transition and notify viewers.
    ///
    /// Any status string is accepted and persisted; nothing restricts the
    /// transition to the four known values or to forward-only progression.
    /// Unknown ids fail with a not-found error and emit no event.
    #[instrument(skip(self))]
    pub async fn transition_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let updated = self
            .store
            .set_status(id, status)
            .await?
            .ok_or_else(|| Error::NotFound(format!("order {id} not found")))?;

        self.broadcaster
            .publish(OrderEventType::OrderUpdated, &updated);

        info!(order_id = %id, status = %updated.status, "status transition applied");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryStore;
    use serde_json::json;

    fn engine() -> (OrderEngine, Broadcaster) {
        let broadcaster = Broadcaster::new(64);
        let store: Arc<dyn OrderStore> = Arc::new(InMemoryStore::new());
        (OrderEngine::new(store, broadcaster.clone()), broadcaster)
    }

    fn biryani_request() -> PlaceOrder {
        serde_json::from_value(json!({
            "orderType": "dine-in",
            "customerName": "Asha",
            "mobile": "9999",
            "tableNumber": "4",
            "items": [
                {"name": "Biryani", "price": 200, "qty": 2},
                {"name": "Soda", "price": 30, "qty": 1}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_place_order_computes_total_and_initial_status() {
        let (engine, _) = engine();
        let before = Utc::now();
        let order = engine.place_order(biryani_request()).await.unwrap();
        let after = Utc::now();

        assert_eq!(order.total, 430.0);
        assert_eq!(order.status, OrderStatus::incoming());
        assert!(order.created_at >= before && order.created_at <= after);
    }

    #[tokio::test]
    async fn test_caller_supplied_total_is_ignored() {
        let (engine, _) = engine();
        let request: PlaceOrder = serde_json::from_value(json!({
            "customerName": "Ravi",
            "total": 1.0,
            "status": "delivered",
            "items": [{"name": "Tea", "price": 15, "qty": 2}]
        }))
        .unwrap();

        let order = engine.place_order(request).await.unwrap();
        assert_eq!(order.total, 30.0);
        assert_eq!(order.status, OrderStatus::incoming());
    }

    #[tokio::test]
    async fn test_place_order_emits_new_order_event() {
        let (engine, broadcaster) = engine();
        let mut rx = broadcaster.subscribe();

        let order = engine.place_order(biryani_request()).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, OrderEventType::NewOrder);
        assert_eq!(event.order.id, order.id);
    }

    #[tokio::test]
    async fn test_malformed_items_rejected_without_event() {
        let (engine, broadcaster) = engine();
        let mut rx = broadcaster.subscribe();

        let request: PlaceOrder =
            serde_json::from_value(json!({"customerName": "Asha", "items": "oops"})).unwrap();
        let result = engine.place_order(request).await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_transition_status_persists_and_notifies() {
        let (engine, broadcaster) = engine();
        let order = engine.place_order(biryani_request()).await.unwrap();
        let mut rx = broadcaster.subscribe();

        let updated = engine
            .transition_status(order.id, "preparing".into())
            .await
            .unwrap();
        assert_eq!(updated.status.as_str(), "preparing");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, OrderEventType::OrderUpdated);
        assert_eq!(event.order.status.as_str(), "preparing");
    }

    #[tokio::test]
    async fn test_transition_accepts_arbitrary_status_string() {
        let (engine, _) = engine();
        let order = engine.place_order(biryani_request()).await.unwrap();

        let updated = engine
            .transition_status(order.id, "on-the-stove".into())
            .await
            .unwrap();
        assert_eq!(updated.status.as_str(), "on-the-stove");
    }

    #[tokio::test]
    async fn test_unknown_id_fails_without_broadcast() {
        let (engine, broadcaster) = engine();
        let mut rx = broadcaster.subscribe();

        let result = engine
            .transition_status(Uuid::new_v4(), "preparing".into())
            .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(rx.try_recv().is_err());
    }
}
