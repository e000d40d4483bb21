// src/engine/analytics.rs - Sales Analytics Aggregator
//! Dashboard aggregates over time-windowed order sets.
//!
//! Every operation takes a resolved [`TimeWindow`] and works on the store's
//! windowed listing, which already excludes soft-deleted orders. Empty
//! windows are successful queries with explicit "no data" results, never
//! errors: zero totals, `None` top dish, an empty customer list, and the
//! peak-hour sentinel.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Timelike;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::instrument;

use crate::{
    core::window::{ist, TimeWindow},
    storage::OrderStore,
    Result,
};

/// Sales totals over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesTotals {
    /// Sum of order totals.
    pub total: f64,
    /// Number of orders.
    pub count: u64,
}

/// The most-ordered dish in a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishCount {
    /// Dish name. Serialized as `_id` to match the dashboard's wire shape.
    #[serde(rename = "_id")]
    pub name: String,
    /// Summed quantity across all in-window orders.
    pub count: f64,
}

/// A customer with at least two orders in the window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatCustomer {
    #[serde(rename = "_id")]
    pub customer_name: String,
    pub orders: u64,
}

/// Busiest hour of day (0-23, IST). `hour` is `None` over an empty window
/// and serializes as the `"-"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakHour {
    pub hour: Option<u32>,
    pub count: u64,
}

impl Serialize for PeakHour {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PeakHour", 2)?;
        match self.hour {
            Some(hour) => s.serialize_field("hour", &hour)?,
            None => s.serialize_field("hour", "-")?,
        }
        s.serialize_field("count", &self.count)?;
        s.end()
    }
}

/// Computes dashboard aggregates server-side; callers never fetch and fold
/// raw order sets themselves.
pub struct Analytics {
    store: Arc<dyn OrderStore>,
}

impl Analytics {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Sum and count of non-deleted orders in the window.
    #[instrument(skip(self, window))]
    pub async fn sales_totals(&self, window: &TimeWindow) -> Result<SalesTotals> {
        let orders = self.store.list_in_window(window).await?;
        Ok(SalesTotals {
            total: orders.iter().map(|o| o.total).sum(),
            count: orders.len() as u64,
        })
    }

    /// The item name with the highest summed quantity, or `None` when no
    /// items exist in the window. Ties fall to whichever name the
    /// aggregation encounters as the running maximum; the tie-break order
    /// is arbitrary but stable within a run.
    #[instrument(skip(self, window))]
    pub async fn top_dish(&self, window: &TimeWindow) -> Result<Option<DishCount>> {
        let orders = self.store.list_in_window(window).await?;

        let mut counts: HashMap<String, f64> = HashMap::new();
        for order in &orders {
            for item in &order.items {
                *counts.entry(item.name.clone()).or_default() += item.qty;
            }
        }

        let top = counts
            .into_iter()
            .fold(None::<DishCount>, |best, (name, count)| match best {
                Some(b) if b.count >= count => Some(b),
                _ => Some(DishCount { name, count }),
            });
        Ok(top)
    }

    /// Customers with two or more orders in the window, most orders first.
    /// With a name filter, only orders exactly matching that name are
    /// grouped (so the result echoes that one customer's count, if >= 2).
    #[instrument(skip(self, window))]
    pub async fn repeat_customers(
        &self,
        window: &TimeWindow,
        name_filter: Option<&str>,
    ) -> Result<Vec<RepeatCustomer>> {
        let orders = self.store.list_in_window(window).await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for order in &orders {
            if let Some(name) = name_filter {
                if order.customer_name != name {
                    continue;
                }
            }
            *counts.entry(order.customer_name.clone()).or_default() += 1;
        }

        let mut repeats: Vec<RepeatCustomer> = counts
            .into_iter()
            .filter(|(_, orders)| *orders >= 2)
            .map(|(customer_name, orders)| RepeatCustomer {
                customer_name,
                orders,
            })
            .collect();
        repeats.sort_by(|a, b| b.orders.cmp(&a.orders).then(a.customer_name.cmp(&b.customer_name)));
        Ok(repeats)
    }

    /// The hour of day (IST) with the most orders, or the no-data sentinel
    /// over an empty window. Hour ties resolve to the earliest hour.
    #[instrument(skip(self, window))]
    pub async fn peak_hour(&self, window: &TimeWindow) -> Result<PeakHour> {
        let orders = self.store.list_in_window(window).await?;

        let mut by_hour = [0u64; 24];
        for order in &orders {
            let hour = order.created_at.with_timezone(&ist()).hour() as usize;
            by_hour[hour] += 1;
        }

        let peak = by_hour
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)));

        Ok(match peak {
            Some((hour, &count)) => PeakHour {
                hour: Some(hour as u32),
                count,
            },
            None => PeakHour {
                hour: None,
                count: 0,
            },
        })
    }
}
