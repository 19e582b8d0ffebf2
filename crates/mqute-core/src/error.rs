//! Unified error types for the MQute routing core.
//!
//! Per-request errors ([`RouteError`]) are always recovered inside
//! [`Router::route`](crate::Router::route) and converted into an
//! [`ErrorResponse`](crate::ErrorResponse); they never escape to the
//! transport layer. Build-time errors ([`CompositionError`]) propagate to
//! the caller of [`include_router`](crate::Router::include_router) and are
//! expected to abort startup.

use thiserror::Error;

// =============================================================================
// Resolution Errors
// =============================================================================

/// A request's one-shot resolution sink was invoked a second time.
///
/// This is a programmer-error class: it indicates a logic bug in handler or
/// middleware code (resolving directly *and* returning a response, for
/// example), not a user-input problem. It is never converted into an error
/// response, because the request's sink is already spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request already resolved")]
pub struct AlreadyResolvedError;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised while routing a single request.
///
/// Every variant except [`AlreadyResolved`](RouteError::AlreadyResolved) is
/// converted to a rejection at the `route` boundary; its `Display` text
/// becomes the error response message verbatim.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Malformed payload detected by middleware or a handler.
    #[error("{0}")]
    Validation(String),

    /// No handler matches the normalized request path.
    #[error("No handler registered for path: {path}")]
    NotFound {
        /// The original, pre-normalization request path.
        path: String,
    },

    /// A handler or middleware attempted a second resolution.
    #[error(transparent)]
    AlreadyResolved(#[from] AlreadyResolvedError),

    /// Any other handler failure.
    #[error("{0}")]
    Handler(String),
}

impl RouteError {
    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a generic handler error with the given message.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

/// Result type for middleware and handler execution.
pub type RouteResult<T> = Result<T, RouteError>;

// =============================================================================
// Composition Errors
// =============================================================================

/// Errors raised while merging one router into another.
///
/// Inclusion either fully succeeds or fails atomically: on error the parent
/// router's table is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Two handlers collided on the same fully-qualified path under
    /// [`MergePolicy::FailOnConflict`](crate::MergePolicy::FailOnConflict).
    #[error("failed to include router: conflicting handler for path '{path}'")]
    Conflict {
        /// The fully-qualified path both handlers claimed.
        path: String,
    },

    /// The child router could not be flattened.
    #[error("failed to include router: {reason}")]
    Malformed {
        /// Reason for failure.
        reason: String,
    },
}

/// Result type for router composition.
pub type CompositionResult<T> = Result<T, CompositionError>;
