// src/core/mod.rs - Core Module Declaration
//! Core domain models: the order record, realtime events, and the
//! time-window resolver shared by every listing and analytics query.

pub mod events;
pub mod order;
pub mod window;

pub use events::{OrderEvent, OrderEventType};
pub use order::{Order, OrderId, OrderItem, OrderStatus, PlaceOrder};
pub use window::{Period, TimeWindow, WindowParams};
