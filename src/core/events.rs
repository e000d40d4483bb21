// src/core/events.rs - Realtime Event Types
//! Lifecycle events pushed to connected staff viewers.
//!
//! Each event carries the full current order record so displays can render
//! without a follow-up fetch. There is no replay: viewers that attach late
//! pull current state through the listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::order::Order;

/// Event kinds on the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderEventType {
    /// A new order was placed.
    NewOrder,
    /// An existing order's status changed.
    OrderUpdated,
}

impl OrderEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewOrder => "newOrder",
            Self::OrderUpdated => "orderUpdated",
        }
    }
}

/// An order lifecycle event, fanned out to every connected viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event: OrderEventType,
    pub order: Order,
    pub timestamp: DateTime<Utc>,
}

impl OrderEvent {
    pub fn new(event: OrderEventType, order: Order) -> Self {
        Self {
            event,
            order,
            timestamp: Utc::now(),
        }
    }
}
