// src/lib.rs - Kitchen Line Library Root
//! # Kitchen Line - Restaurant Order Tracking Service
//!
//! A small order-management service for a restaurant counter: customers place
//! orders, kitchen staff move them through their lifecycle on a live display,
//! and the dashboard reports sales aggregates over civil-day time windows.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐      ┌─────────────────┐
//! │   REST API     │      │    WebSocket    │
//! │  (HTTP/JSON)   │      │ (staff viewers) │
//! └───────┬────────┘      └────────┬────────┘
//!         │                        │
//!         ▼                        │
//! ┌──────────────────┐   events    │
//! │   Order Engine   ├─────────────┘
//! │ (lifecycle + agg)│
//! └───────┬──────────┘
//!         │
//!         ▼
//! ┌──────────────────┐
//! │   Order Store    │
//! │ (90-day horizon) │
//! └──────────────────┘
//! ```
//!
//! All calendar arithmetic happens in a fixed UTC+5:30 offset; see
//! [`core::window`] for the time-window semantics shared by listing and
//! analytics queries.

use std::sync::Arc;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

pub mod core;
pub mod engine;
pub mod storage;
pub mod transport;

pub use crate::core::{
    events::{OrderEvent, OrderEventType},
    order::{Order, OrderId, OrderItem, OrderStatus, PlaceOrder},
    window::{Period, TimeWindow, WindowParams},
};
pub use crate::engine::{analytics::Analytics, broadcast::Broadcaster, OrderEngine};
pub use crate::storage::{memory::InMemoryStore, OrderStore, StoreError};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub orders: OrdersConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path of the static menu catalog served verbatim at /menu.json.
    pub menu_path: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Days an order survives before the retention sweep may remove it.
    pub retention_days: u32,
    /// Interval between retention sweeps, in seconds.
    pub sweep_interval_secs: u64,
    /// Capacity of the per-viewer broadcast queue.
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// Log format: "json" or "pretty".
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            menu_path: "public/menu.json".to_string(),
            request_timeout: 30,
        }
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            retention_days: storage::RETENTION_DAYS,
            sweep_interval_secs: 3600,
            broadcast_capacity: 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Load configuration from `config/{default,local}` files and `KITCHEN_*`
/// environment variables, falling back to compiled defaults.
pub fn load_config() -> std::result::Result<AppConfig, ConfigError> {
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let s = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
        .add_source(File::with_name(&format!("{config_dir}/local")).required(false))
        .add_source(Environment::with_prefix("KITCHEN").separator("_"))
        .build()?;

    s.try_deserialize()
}

/// Error taxonomy surfaced to API callers.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, e.g. `items` not list-shaped.
    #[error("{0}")]
    Validation(String),

    /// Unknown order id.
    #[error("{0}")]
    NotFound(String),

    /// The persistence layer is unreachable or rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Application state shared across handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn OrderStore>,
    pub engine: Arc<OrderEngine>,
    pub analytics: Arc<Analytics>,
    pub broadcaster: Broadcaster,
}

impl AppState {
    /// Wire up the service against an in-memory store.
    pub fn new(config: AppConfig) -> Self {
        let store: Arc<dyn OrderStore> = Arc::new(InMemoryStore::new());
        Self::with_store(config, store)
    }

    /// Wire up the service against any store backend.
    pub fn with_store(config: AppConfig, store: Arc<dyn OrderStore>) -> Self {
        let broadcaster = Broadcaster::new(config.orders.broadcast_capacity);
        let engine = Arc::new(OrderEngine::new(store.clone(), broadcaster.clone()));
        let analytics = Arc::new(Analytics::new(store.clone()));

        Self {
            config: Arc::new(config),
            store,
            engine,
            analytics,
            broadcaster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.orders.retention_days, 90);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_without_files_yields_defaults() {
        std::env::set_var("CONFIG_DIR", "no-such-config-dir");
        let config = load_config().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.orders.retention_days, 90);
        std::env::remove_var("CONFIG_DIR");
    }

    #[test]
    fn test_state_wiring() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(state.broadcaster.viewer_count(), 0);
    }
}
