//! # MQute
//!
//! Topic-based request/response routing over MQTT-style publish/subscribe.
//!
//! ## Overview
//!
//! Handlers are registered against hierarchical topic paths on a
//! [`Router`](mqute_core::Router); routers nest by static flattening, so
//! any depth of composition collapses to one exact-match table. Each
//! inbound message becomes a [`Request`](mqute_core::Request) with a
//! one-shot resolution sink, runs through the router's ordered middleware,
//! and ends at a single terminal handler whose
//! [`Response`](mqute_core::Response) is published back as the reply.
//!
//! ```text
//! ┌───────────┐     ┌──────────────────────────────┐     ┌─────────┐
//! │ Transport │────▶│ Mqute (serve loop) → Router  │────▶│ Handler │
//! └─────▲─────┘     └──────────────────────────────┘     └────┬────┘
//!       └───────────────── reply publish ◀────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mqute::prelude::*;
//! use mqute::transport::memory::MemoryTransport;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = Mqute::new(MquteConfig::default(), Arc::new(MemoryTransport::new()));
//!     app.sub("sensors/data", handler_fn(|request| {
//!         respond(JsonResponse::from_value(json!({"status": "received"})))
//!     }));
//!     app.serve().await?;
//!     Ok(())
//! }
//! ```

pub use mqute_client as client;
pub use mqute_core as core;

pub use mqute_client::transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use mqute::prelude::*;
/// ```
pub mod prelude {
    // Application entry point.
    pub use mqute_client::{ClientError, ClientResult, EventHooks, Mqute};

    // Configuration and credentials.
    pub use mqute_client::config::{ConfigLoader, MquteConfig, load_config};
    pub use mqute_client::credentials::Credentials;

    // Transport boundary.
    pub use mqute_client::transport::{InboundMessage, MqttTransport, QoS};

    // Routing engine.
    pub use mqute_core::{
        BoxedResponse, ErrorResponse, JsonResponse, MergePolicy, Middleware, Request, Response,
        RouteError, RouteHandler, RouteResult, Router, handler_fn, middleware_fn, respond,
    };
}
