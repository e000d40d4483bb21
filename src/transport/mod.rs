// src/transport/mod.rs - Transport Layer
//! HTTP and WebSocket surfaces.
//!
//! [`rest`] owns the router and JSON endpoints; [`ws`] owns the realtime
//! viewer channel. Both are thin: request decoding, window resolution, and
//! error-to-status mapping live here, everything else is delegated to the
//! engine and analytics layers.

pub mod rest;
pub mod ws;

pub use rest::create_router;
