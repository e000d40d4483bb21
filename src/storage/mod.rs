// src/storage/mod.rs - Order Store Interface
//! Persistence boundary for order records.
//!
//! The store owns the canonical order collection and is the only component
//! that touches it; callers never see the raw collection. Operations are
//! atomic at single-record granularity, which is all the service needs (no
//! request touches more than one order; aggregations are read-only).
//!
//! Records older than [`RETENTION_DAYS`] from `created_at` are eligible for
//! silent removal by the retention sweep; no caller may assume they remain
//! queryable past that horizon.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::{
    order::{Order, OrderId, OrderStatus},
    window::TimeWindow,
};

pub mod memory;

/// Default retention horizon for order records.
pub const RETENTION_DAYS: u32 = 90;

/// Errors from the persistence layer. Surfaced to callers as-is; retries,
/// if any, belong to the concrete backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} already exists")]
    Duplicate(OrderId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage backend for order records.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new record. The engine assigns `id` and `created_at`
    /// exactly once, before the first save.
    async fn save(&self, order: Order) -> Result<(), StoreError>;

    /// Fetch a record by id. Soft-deleted orders are still returned.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Apply a status update and return the updated record, or `None` if
    /// the id is unknown. Last write wins; no version check is performed.
    async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;

    /// Non-deleted orders with `created_at` inside the window, newest
    /// first.
    async fn list_in_window(&self, window: &TimeWindow) -> Result<Vec<Order>, StoreError>;

    /// Remove records created before `cutoff`; returns the count removed.
    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}
