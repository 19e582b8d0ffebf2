//! Client error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;
use mqute_core::CompositionError;

/// Errors that can occur while building or serving a [`Mqute`](crate::Mqute)
/// application.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport operation failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Router composition failed.
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
