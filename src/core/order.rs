// src/core/order.rs - Order Domain Model
//! Core order record, status values, and total computation.
//!
//! # Order Lifecycle
//!
//! ```text
//! incoming ──► preparing ──► delivered
//!     │            │             │
//!     └────────────┴─────────────┴──► deleted (soft delete)
//! ```
//!
//! Status is carried as a plain string on the wire. The four values above are
//! the ones the kitchen displays understand, but a transition to any other
//! string is accepted and persisted; only `deleted` has special meaning (the
//! record stays retrievable by id but drops out of listings and analytics).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

use crate::{Error, Result};

/// Unique order identifier, assigned by the server at creation.
pub type OrderId = Uuid;

/// Order status. Known values are `incoming`, `preparing`, `delivered` and
/// `deleted`; arbitrary strings round-trip unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    pub const INCOMING: &'static str = "incoming";
    pub const PREPARING: &'static str = "preparing";
    pub const DELIVERED: &'static str = "delivered";
    pub const DELETED: &'static str = "deleted";

    /// Initial status of every new order.
    pub fn incoming() -> Self {
        Self(Self::INCOMING.to_string())
    }

    pub fn deleted() -> Self {
        Self(Self::DELETED.to_string())
    }

    /// Soft-delete marker check; deleted orders are excluded from all
    /// listing and analytics queries.
    pub fn is_deleted(&self) -> bool {
        self.0 == Self::DELETED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single line item on an order. Missing price or quantity counts as zero
/// rather than failing the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub qty: f64,
}

/// The central order record.
///
/// All fields except `status` are immutable after creation. `total` is
/// always server-computed; `created_at` is the sole temporal key for
/// windowed queries and the 90-day retention horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-assigned unique id.
    pub id: OrderId,
    /// Fulfillment channel tag (dine-in / delivery / takeaway); free-form.
    pub order_type: String,
    pub customer_name: String,
    pub mobile: String,
    /// Dine-in table, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    /// Delivery address, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub items: Vec<OrderItem>,
    /// Server-computed sum of `price * qty` over `items`.
    pub total: f64,
    pub status: OrderStatus,
    /// Assigned once at creation, never mutated.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of `price * qty` over the given items. An empty list totals zero.
    pub fn compute_total(items: &[OrderItem]) -> f64 {
        items.iter().map(|i| i.price * i.qty).sum()
    }
}

/// Inbound order-placement payload. Caller-supplied `total`, `status` and
/// `id` fields are ignored; the engine computes or assigns them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Raw JSON so a structurally malformed shape can be rejected with a
    /// validation error instead of a framework-level decode failure.
    #[serde(default)]
    pub items: serde_json::Value,
}

impl PlaceOrder {
    /// Decode `items` into line items, rejecting anything that is not an
    /// array of `{name, price, qty}` objects. Missing price/qty fields
    /// default to zero.
    pub fn parse_items(&self) -> Result<Vec<OrderItem>> {
        if !self.items.is_array() {
            return Err(Error::Validation(
                "items must be an array of {name, price, qty} objects".to_string(),
            ));
        }

        serde_json::from_value(self.items.clone())
            .map_err(|e| Error::Validation(format!("malformed items: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_total_over_items() {
        let items = vec![
            OrderItem {
                name: "Biryani".to_string(),
                price: 200.0,
                qty: 2.0,
            },
            OrderItem {
                name: "Soda".to_string(),
                price: 30.0,
                qty: 1.0,
            },
        ];
        assert_eq!(Order::compute_total(&items), 430.0);
    }

    #[test]
    fn test_total_of_empty_items_is_zero() {
        assert_eq!(Order::compute_total(&[]), 0.0);
    }

    #[test]
    fn test_missing_price_and_qty_count_as_zero() {
        let place = PlaceOrder {
            order_type: "dine-in".to_string(),
            customer_name: "Asha".to_string(),
            mobile: String::new(),
            table_number: None,
            address: None,
            items: json!([{"name": "Tea"}, {"name": "Dosa", "price": 60, "qty": 1}]),
        };

        let items = place.parse_items().unwrap();
        assert_eq!(items[0].price, 0.0);
        assert_eq!(items[0].qty, 0.0);
        assert_eq!(Order::compute_total(&items), 60.0);
    }

    #[test]
    fn test_non_array_items_rejected() {
        let place = PlaceOrder {
            order_type: String::new(),
            customer_name: String::new(),
            mobile: String::new(),
            table_number: None,
            address: None,
            items: json!({"name": "Tea"}),
        };

        assert!(matches!(place.parse_items(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_missing_items_field_rejected() {
        let place: PlaceOrder = serde_json::from_value(json!({
            "orderType": "takeaway",
            "customerName": "Ravi"
        }))
        .unwrap();

        assert!(matches!(place.parse_items(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_status_round_trip_and_deleted_check() {
        let status = OrderStatus::from("out-for-delivery");
        assert_eq!(status.as_str(), "out-for-delivery");
        assert!(!status.is_deleted());
        assert!(OrderStatus::deleted().is_deleted());

        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"out-for-delivery\"");
    }

    #[test]
    fn test_order_wire_field_names() {
        let order = Order {
            id: Uuid::new_v4(),
            order_type: "delivery".to_string(),
            customer_name: "Asha".to_string(),
            mobile: "9999".to_string(),
            table_number: None,
            address: Some("12 MG Road".to_string()),
            items: vec![],
            total: 0.0,
            status: OrderStatus::incoming(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("orderType").is_some());
        assert!(value.get("customerName").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["status"], "incoming");
    }
}
