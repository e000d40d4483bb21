// src/storage/memory.rs - In-Memory Order Store
//! # In-Memory Storage Backend
//!
//! Concurrent in-memory store using DashMap for the primary map plus a
//! BTreeMap time index for windowed range queries. Single-record operations
//! are atomic through DashMap's per-entry locking; the last-write-wins
//! status race documented on the store trait applies here as anywhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::core::{
    order::{Order, OrderId, OrderStatus},
    window::TimeWindow,
};

use super::{OrderStore, StoreError};

/// In-memory store. The raw maps are private; all access goes through the
/// [`OrderStore`] interface.
#[derive(Default)]
pub struct InMemoryStore {
    /// Primary storage, order id to record.
    orders: DashMap<OrderId, Order>,

    /// Time index for range queries. Multiple orders can share a creation
    /// instant, so each key holds a list of ids.
    time_index: RwLock<BTreeMap<DateTime<Utc>, Vec<OrderId>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, soft-deleted included.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn save(&self, order: Order) -> Result<(), StoreError> {
        if self.orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate(order.id));
        }

        let id = order.id;
        let created_at = order.created_at;
        self.orders.insert(id, order);
        self.time_index
            .write()
            .entry(created_at)
            .or_default()
            .push(id);

        debug!("saved order");
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        match self.orders.get_mut(&id) {
            Some(mut entry) => {
                entry.value_mut().status = status;
                debug!(status = %entry.value().status, "status updated");
                Ok(Some(entry.value().clone()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, window))]
    async fn list_in_window(&self, window: &TimeWindow) -> Result<Vec<Order>, StoreError> {
        let time_index = self.time_index.read();
        let mut orders: Vec<Order> = time_index
            .range(window.start..window.end)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| self.orders.get(id).map(|entry| entry.value().clone()))
            .filter(|order| !order.status.is_deleted())
            .collect();

        // Newest first for listing use.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!(count = orders.len(), "windowed listing");
        Ok(orders)
    }

    #[instrument(skip(self))]
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let expired: Vec<OrderId> = {
            let time_index = self.time_index.read();
            time_index
                .range(..cutoff)
                .flat_map(|(_, ids)| ids.iter().copied())
                .collect()
        };

        for id in &expired {
            self.orders.remove(id);
        }

        {
            let mut time_index = self.time_index.write();
            let keep = time_index.split_off(&cutoff);
            *time_index = keep;
        }

        if !expired.is_empty() {
            info!(removed = expired.len(), "retention sweep removed expired orders");
        }
        Ok(expired.len())
    }
}
