//! Handler and middleware traits.
//!
//! A [`RouteHandler`] is the single terminal endpoint of a dispatch; a
//! [`Middleware`] is an ordered interceptor run before it. Both are async
//! traits: the dispatcher awaits the returned future before treating the
//! outcome as final, so handlers may suspend without changing the
//! exactly-once resolution contract.
//!
//! Plain closures cover the common case through [`handler_fn`] and
//! [`middleware_fn`]; implement the traits directly when the body needs to
//! await.
//!
//! # Example
//!
//! ```rust,ignore
//! use mqute_core::{handler_fn, respond, JsonResponse, Router};
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
//! ```

use async_trait::async_trait;

use crate::error::RouteResult;
use crate::request::Request;
use crate::response::{BoxedResponse, Response};

/// A terminal endpoint mapping one request to its outcome.
///
/// Returning `Ok(Some(response))` asks the dispatcher to resolve the request
/// on the handler's behalf. Returning `Ok(None)` means the handler either
/// resolved the request itself or deliberately left it pending (a pending
/// request is a caller-visible leak the embedding application must police).
/// Returning `Err` is converted into a rejection by the dispatcher.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// Handles one request.
    async fn call(&self, request: &mut Request) -> RouteResult<Option<BoxedResponse>>;
}

/// An ordered interceptor run before the handler.
///
/// A middleware may mutate the payload in place and return `Ok(())`, resolve
/// or reject the request directly to short-circuit the chain, or return
/// `Err` — which the dispatcher converts into a rejection.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Intercepts one request.
    async fn call(&self, request: &mut Request) -> RouteResult<()>;
}

// =============================================================================
// Closure Adapters
// =============================================================================

/// Adapter wrapping a plain closure as a [`RouteHandler`].
pub struct HandlerFn<F>(F);

/// Wraps a synchronous closure as a [`RouteHandler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Request) -> RouteResult<Option<BoxedResponse>> + Send + Sync,
{
    HandlerFn(f)
}

#[async_trait]
impl<F> RouteHandler for HandlerFn<F>
where
    F: Fn(&mut Request) -> RouteResult<Option<BoxedResponse>> + Send + Sync,
{
    async fn call(&self, request: &mut Request) -> RouteResult<Option<BoxedResponse>> {
        (self.0)(request)
    }
}

/// Adapter wrapping a plain closure as a [`Middleware`].
pub struct MiddlewareFn<F>(F);

/// Wraps a synchronous closure as a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: Fn(&mut Request) -> RouteResult<()> + Send + Sync,
{
    MiddlewareFn(f)
}

#[async_trait]
impl<F> Middleware for MiddlewareFn<F>
where
    F: Fn(&mut Request) -> RouteResult<()> + Send + Sync,
{
    async fn call(&self, request: &mut Request) -> RouteResult<()> {
        (self.0)(request)
    }
}

/// Shorthand for handlers that produce a response for the dispatcher to
/// deliver.
pub fn respond(response: impl Response + 'static) -> RouteResult<Option<BoxedResponse>> {
    Ok(Some(Box::new(response)))
}
