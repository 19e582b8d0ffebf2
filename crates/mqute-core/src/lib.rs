//! # MQute Core
//!
//! The routing and dispatch engine of the MQute framework: topic-based
//! request/response dispatch on top of a publish/subscribe transport.
//!
//! Handlers are registered against hierarchical topic paths; inbound
//! messages are matched against those paths and routed through an ordered
//! chain of middleware before reaching a single terminal handler, whose
//! result is delivered back through an externally supplied resolution
//! callback.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐     ┌─────────────────────────────┐     ┌─────────┐
//! │ Transport │────▶│ Router                      │────▶│ Handler │
//! │ (collab.) │     │  middleware → exact lookup  │     └────┬────┘
//! └─────▲─────┘     └─────────────────────────────┘          │
//!       │                                                    ▼
//!       └──────────────── resolve(Response) ◀────────────────┘
//! ```
//!
//! - [`Router`] — flat map from fully-qualified normalized path to handler,
//!   ordered middleware, prefix; composes with other routers by static
//!   flattening at inclusion time.
//! - [`Request`] — one inbound dispatch unit, owning a one-shot resolution
//!   slot.
//! - [`Response`] — closed set of outcome variants (plus caller-defined
//!   ones) exposing a canonical wire serialization.
//!
//! The engine performs no I/O and holds no transport knowledge: the
//! transport collaborator constructs a [`Request`] bound to a resolution
//! callback and hands it to [`Router::route`]; the engine only ever calls
//! `resolve`/`reject` on the request.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mqute_core::{handler_fn, respond, JsonResponse, Request, Router};
//! use serde_json::json;
//!
//! let mut router = Router::default();
//! router.sub(
//!     "devices/temperature",
//!     handler_fn(|request| {
//!         respond(JsonResponse::from_value(json!({
//!             "status": "received",
//!             "data": request.payload().clone(),
//!         })))
//!     }),
//! );
//!
//! # tokio_test::block_on(async {
//! let request = Request::new("devices/temperature", json!({"value": 25}), |response| {
//!     println!("reply: {}", response.to_wire());
//! });
//! router.route(request).await;
//! # });
//! ```

pub mod error;
pub mod handler;
pub mod path;
pub mod request;
pub mod response;
pub mod router;

pub use error::{
    AlreadyResolvedError, CompositionError, CompositionResult, RouteError, RouteResult,
};
pub use handler::{HandlerFn, Middleware, MiddlewareFn, RouteHandler, handler_fn, middleware_fn, respond};
pub use path::{compose, normalize};
pub use request::{Request, ResolveSink};
pub use response::{BoxedResponse, ErrorResponse, JsonResponse, Response};
pub use router::{MergePolicy, Router};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{RouteError, RouteResult};
    pub use super::handler::{Middleware, RouteHandler, handler_fn, middleware_fn, respond};
    pub use super::request::Request;
    pub use super::response::{BoxedResponse, ErrorResponse, JsonResponse, Response};
    pub use super::router::{MergePolicy, Router};
}
