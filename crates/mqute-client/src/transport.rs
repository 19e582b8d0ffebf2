//! Transport collaborator boundary.
//!
//! The routing engine never talks to a broker itself: an implementation of
//! [`MqttTransport`] delivers inbound messages and accepts outbound
//! publishes, and the [`Mqute`](crate::Mqute) application wires the two
//! together. Connection retry/backoff, wildcard subscription semantics, and
//! the MQTT wire encoding all live behind this trait.
//!
//! The crate ships one implementation, the in-memory loopback in
//! [`memory`], used by the tests and demos. Real broker clients implement
//! the same trait in the embedding application.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

/// MQTT delivery guarantee levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QoS {
    /// At most once (fire and forget).
    #[default]
    AtMostOnce,
    /// At least once (acknowledged delivery).
    AtLeastOnce,
    /// Exactly once (assured delivery).
    ExactlyOnce,
}

impl QoS {
    /// The protocol-level QoS value.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }

    /// Parses a protocol-level QoS value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::AtMostOnce),
            1 => Some(Self::AtLeastOnce),
            2 => Some(Self::ExactlyOnce),
            _ => None,
        }
    }
}

/// One message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The topic the message arrived on.
    pub topic: String,
    /// The raw payload bytes.
    pub payload: Vec<u8>,
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// Operation attempted before `connect`.
    #[error("transport is not connected")]
    NotConnected,

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

// =============================================================================
// Transport Trait
// =============================================================================

/// The broker client boundary.
///
/// Implementations must make [`recv`](Self::recv) cancel-safe: the serve
/// loop polls it inside a `select!` and may drop the future between
/// messages without losing one.
#[async_trait]
pub trait MqttTransport: Send + Sync {
    /// Establishes the broker connection.
    async fn connect(&self) -> TransportResult<()>;

    /// Tears the connection down.
    async fn disconnect(&self) -> TransportResult<()>;

    /// Subscribes to a topic at the given QoS.
    async fn subscribe(&self, topic: &str, qos: QoS) -> TransportResult<()>;

    /// Publishes a payload to a topic.
    async fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> TransportResult<()>;

    /// Receives the next inbound message.
    ///
    /// Returns `Ok(None)` once the connection is closed and all buffered
    /// messages have been delivered.
    async fn recv(&self) -> TransportResult<Option<InboundMessage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_round_trips_through_protocol_values() {
        for qos in [QoS::AtMostOnce, QoS::AtLeastOnce, QoS::ExactlyOnce] {
            assert_eq!(QoS::from_u8(qos.as_u8()), Some(qos));
        }
        assert_eq!(QoS::from_u8(3), None);
    }
}
