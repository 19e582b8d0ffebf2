//! # MQute Client
//!
//! The MQTT application layer of the MQute framework: everything between
//! the broker connection and the routing engine in
//! [`mqute_core`].
//!
//! - [`transport`] — the [`MqttTransport`](transport::MqttTransport)
//!   collaborator trait and the in-memory loopback implementation.
//! - [`credentials`] — authentication material for the broker connection.
//! - [`config`] — figment-layered configuration (defaults → `mqute.toml` →
//!   `MQUTE_*` environment variables).
//! - [`logging`] — tracing subscriber setup.
//! - [`client`] — the [`Mqute`] application type: registration mirrored
//!   into subscriptions, and the serve loop that turns inbound messages
//!   into routed requests whose resolutions publish replies.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mqute_client::{Mqute, config::load_config, logging, transport::memory::MemoryTransport};
//! use mqute_core::{handler_fn, respond, JsonResponse};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let transport = Arc::new(MemoryTransport::new());
//!     let mut app = Mqute::new(config, transport);
//!     app.sub("echo", handler_fn(|request| {
//!         respond(JsonResponse::from_value(request.payload().clone()))
//!     }));
//!     app.serve().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod transport;

pub use client::{EventHooks, Mqute};
pub use config::{ConfigLoader, MquteConfig, load_config};
pub use credentials::Credentials;
pub use error::{ClientError, ClientResult};
pub use transport::{InboundMessage, MqttTransport, QoS, TransportError, TransportResult};
