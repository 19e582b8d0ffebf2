//! In-memory loopback transport.
//!
//! A broker-less [`MqttTransport`] backed by channels: tests and demos
//! inject inbound messages with [`MemoryTransport::inject`] and inspect
//! outbound traffic with [`MemoryTransport::published`]. Topic matching is
//! exact — the application subscribes each flattened route path literally,
//! so broker wildcard semantics never come into play here.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use async_trait::async_trait;

use super::{InboundMessage, MqttTransport, QoS, TransportError, TransportResult};

/// One outbound publish recorded by the loopback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Destination topic.
    pub topic: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
    /// Requested delivery guarantee.
    pub qos: QoS,
    /// Retain flag.
    pub retain: bool,
}

/// Channel-backed loopback transport.
pub struct MemoryTransport {
    connected: AtomicBool,
    subscriptions: Mutex<HashSet<String>>,
    published: Mutex<Vec<PublishedMessage>>,
    inbound_tx: Mutex<Option<mpsc::UnboundedSender<InboundMessage>>>,
    inbound_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<InboundMessage>>,
}

impl MemoryTransport {
    /// Creates a disconnected loopback transport.
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        Self {
            connected: AtomicBool::new(false),
            subscriptions: Mutex::new(HashSet::new()),
            published: Mutex::new(Vec::new()),
            inbound_tx: Mutex::new(Some(inbound_tx)),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
        }
    }

    /// Queues an inbound message, as if the broker delivered it.
    pub fn inject(
        &self,
        topic: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> TransportResult<()> {
        let guard = self.inbound_tx.lock();
        let sender = guard.as_ref().ok_or(TransportError::ConnectionClosed {
            reason: "loopback closed".to_string(),
        })?;
        sender
            .send(InboundMessage {
                topic: topic.into(),
                payload: payload.into(),
            })
            .map_err(|err| TransportError::SendFailed(err.to_string()))
    }

    /// Closes the inbound side; `recv` drains what is buffered, then ends.
    pub fn close(&self) {
        self.inbound_tx.lock().take();
    }

    /// The topics subscribed so far.
    pub fn subscriptions(&self) -> HashSet<String> {
        self.subscriptions.lock().clone()
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }

    fn ensure_connected(&self) -> TransportResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MqttTransport for MemoryTransport {
    async fn connect(&self) -> TransportResult<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> TransportResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.close();
        Ok(())
    }

    async fn subscribe(&self, topic: &str, _qos: QoS) -> TransportResult<()> {
        self.ensure_connected()?;
        self.subscriptions.lock().insert(topic.to_string());
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> TransportResult<()> {
        self.ensure_connected()?;
        self.published.lock().push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
            retain,
        });
        Ok(())
    }

    async fn recv(&self) -> TransportResult<Option<InboundMessage>> {
        Ok(self.inbound_rx.lock().await.recv().await)
    }
}
