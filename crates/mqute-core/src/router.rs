//! Topic router and per-request dispatch.
//!
//! A [`Router`] owns a flat map from fully-qualified normalized path to
//! handler, an ordered middleware list, and a prefix. Routers compose by
//! **static flattening**: [`include_router`](Router::include_router) copies
//! the child's table into the parent with prefixes composed left-to-right,
//! so multi-level nesting collapses to one flat map with O(1) exact-match
//! lookup at dispatch time — no hierarchical traversal, no wildcard or
//! longest-prefix fallback.
//!
//! # Dispatch
//!
//! [`route`](Router::route) drives one request to a terminal state:
//!
//! 1. Middleware run in registration order; one that resolves the request
//!    (or fails) stops the chain.
//! 2. The request path is normalized, composed with the router's prefix,
//!    and looked up exactly; a miss rejects with
//!    `"No handler registered for path: <path>"`.
//! 3. The matched handler runs; a returned response is delivered on its
//!    behalf.
//!
//! Errors are modeled as [`RouteResult`] internally and converted to an
//! error response at the `route` boundary, so callers never need their own
//! recovery: every call to `route` resolves the request exactly once.
//!
//! # Lifecycle
//!
//! Build-then-serve: finish registration (`sub`, `include_router`,
//! `middleware`) before exposing the router to concurrent dispatch. `route`
//! takes `&self`, so a built router behind an `Arc` is safely shared.
//!
//! # Example
//!
//! ```rust,ignore
//! use mqute_core::{handler_fn, respond, JsonResponse, Router};
//! use serde_json::json;
//!
//! let mut floor = Router::new("floor1");
//! floor.sub("room/status", handler_fn(|request| {
//!     respond(JsonResponse::from_value(json!({"occupied": false})))
//! }));
//!
//! let mut building = Router::new("building1");
//! building.include_router(&floor, Some("floors"))?;
//! // Serves "building1/floors/floor1/room/status".
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Level, debug, error, span, trace};

use crate::error::{CompositionError, CompositionResult, RouteError, RouteResult};
use crate::handler::{Middleware, RouteHandler};
use crate::path::{compose, normalize};
use crate::request::Request;

/// Policy for duplicate fully-qualified paths during
/// [`include_router`](Router::include_router).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// The handler merged last silently replaces the earlier one. Matches
    /// the last-write-wins behavior of [`sub`](Router::sub).
    #[default]
    LastWins,
    /// A duplicate path fails the whole inclusion atomically.
    FailOnConflict,
}

/// A topic router: prefix, flat handler table, ordered middleware.
#[derive(Default, Clone)]
pub struct Router {
    /// Invariant: stored normalized; every key in `handlers` has it baked in.
    prefix: String,
    handlers: HashMap<String, Arc<dyn RouteHandler>>,
    middlewares: Vec<Arc<dyn Middleware>>,
    merge_policy: MergePolicy,
}

impl Router {
    /// Creates a router whose routes all live under `prefix`.
    ///
    /// The prefix is normalized immediately; an empty prefix is valid.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: normalize(prefix.as_ref()),
            ..Self::default()
        }
    }

    /// Sets the duplicate-path policy for subsequent inclusions.
    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// The router's normalized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The number of registered routes.
    pub fn route_count(&self) -> usize {
        self.handlers.len()
    }

    /// Iterates the fully-qualified paths of all registered routes.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Registers `handler` at `compose(prefix, path)`.
    ///
    /// Re-registering the same fully-qualified path silently overwrites the
    /// previous handler; there is no duplicate detection at this layer.
    pub fn sub(&mut self, path: impl AsRef<str>, handler: impl RouteHandler + 'static) {
        let full_path = compose(&self.prefix, path.as_ref());
        trace!(path = %full_path, "registering handler");
        self.handlers.insert(full_path, Arc::new(handler));
    }

    /// Appends an interceptor. Middleware run in registration order.
    pub fn middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Flattens `child`'s handler table into this router, optionally nested
    /// under `include_prefix`.
    ///
    /// Each child entry is re-keyed by stripping the child's own prefix
    /// segments (when they match; an inconsistent entry is kept whole as a
    /// defensive fallback) and re-composing under
    /// `compose(include_prefix, child.prefix)`. Entries are copies: later
    /// mutation of `child` does not propagate.
    ///
    /// # Errors
    ///
    /// Under [`MergePolicy::FailOnConflict`], a duplicate fully-qualified
    /// path yields [`CompositionError::Conflict`] and leaves this router
    /// untouched — the merge is staged in full before commit.
    pub fn include_router(
        &mut self,
        child: &Router,
        include_prefix: Option<&str>,
    ) -> CompositionResult<()> {
        let final_prefix = match include_prefix {
            Some(prefix) => compose(prefix, &child.prefix),
            None => child.prefix.clone(),
        };

        let mut staged: Vec<(String, Arc<dyn RouteHandler>)> =
            Vec::with_capacity(child.handlers.len());
        for (full_path, handler) in &child.handlers {
            let remainder = strip_prefix_segments(full_path, &child.prefix);
            let new_path = compose(&final_prefix, remainder);
            if self.merge_policy == MergePolicy::FailOnConflict
                && (self.handlers.contains_key(&new_path)
                    || staged.iter().any(|(path, _)| path == &new_path))
            {
                return Err(CompositionError::Conflict { path: new_path });
            }
            staged.push((new_path, Arc::clone(handler)));
        }

        debug!(
            prefix = %final_prefix,
            routes = staged.len(),
            "including router"
        );
        self.handlers.extend(staged);
        Ok(())
    }

    /// Routes one request to its terminal state.
    ///
    /// Always resolves the request exactly once — as a success, a rejection
    /// carrying the failure text, or a `"No handler registered"` rejection —
    /// unless a handler deliberately leaves it pending.
    pub async fn route(&self, mut request: Request) {
        let span = span!(Level::DEBUG, "route", path = %request.path());
        let _enter = span.enter();

        match self.dispatch(&mut request).await {
            Ok(()) => {}
            Err(RouteError::AlreadyResolved(_)) => {
                // The first resolution stands; never emit a second reply.
                error!(
                    path = %request.path(),
                    "handler attempted to resolve an already-resolved request"
                );
            }
            Err(err) => {
                if request.reject(err.to_string()).is_err() {
                    error!(
                        path = %request.path(),
                        "request resolved while its failure was being converted"
                    );
                }
            }
        }
    }

    async fn dispatch(&self, request: &mut Request) -> RouteResult<()> {
        for (index, middleware) in self.middlewares.iter().enumerate() {
            middleware.call(request).await?;
            if request.is_resolved() {
                debug!(index, "middleware resolved the request, stopping dispatch");
                return Ok(());
            }
        }

        let full_path = compose(&self.prefix, &normalize(request.path()));
        let Some(handler) = self.handlers.get(&full_path) else {
            return Err(RouteError::NotFound {
                path: request.path().to_string(),
            });
        };

        trace!(path = %full_path, "invoking handler");
        if let Some(response) = handler.call(request).await? {
            request.resolve_boxed(response)?;
        }
        Ok(())
    }
}

/// Strips the leading segments of `path` that equal `prefix`'s segments.
///
/// Both arguments are normalized, so segment equality reduces to a string
/// prefix match that must end on a segment boundary. A non-matching path is
/// returned unchanged.
fn strip_prefix_segments<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some("") => "",
        Some(rest) => rest.strip_prefix('/').unwrap_or(path),
        None => path,
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("route_count", &self.handlers.len())
            .field("middleware_count", &self.middlewares.len())
            .field("merge_policy", &self.merge_policy)
            .finish()
    }
}
