//! The MQute application type.
//!
//! [`Mqute`] composes the routing engine with a transport: registration
//! calls are mirrored into a subscription list, and [`serve`](Mqute::serve)
//! runs the receive loop that turns every inbound message into a
//! [`Request`] whose resolution sink publishes the reply back on the
//! request topic.
//!
//! Lifecycle hooks are explicit configuration passed at construction via
//! [`EventHooks`], not a mutable event-handler table.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mqute_client::{Mqute, transport::memory::MemoryTransport};
//! use mqute_client::config::MquteConfig;
//! use mqute_core::{handler_fn, respond, JsonResponse};
//! use serde_json::json;
//!
//! let transport = Arc::new(MemoryTransport::new());
//! let mut app = Mqute::new(MquteConfig::default(), transport.clone());
//! app.sub("echo", handler_fn(|request| {
//!     respond(JsonResponse::from_value(request.payload().clone()))
//! }));
//! app.serve().await?;
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use mqute_core::{Middleware, Request, RouteHandler, Router, compose};

use crate::config::MquteConfig;
use crate::error::ClientResult;
use crate::transport::{MqttTransport, QoS};

/// Lifecycle callbacks, supplied at construction time.
#[derive(Default)]
pub struct EventHooks {
    on_connect: Option<Box<dyn Fn() + Send + Sync>>,
    on_disconnect: Option<Box<dyn Fn(&str) + Send + Sync>>,
    on_publish: Option<Box<dyn Fn(&str) + Send + Sync>>,
    on_subscribe: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl EventHooks {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired once the broker connection is established.
    pub fn on_connect(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_connect = Some(Box::new(hook));
        self
    }

    /// Fired when the connection ends, with the closure reason.
    pub fn on_disconnect(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_disconnect = Some(Box::new(hook));
        self
    }

    /// Fired after each outbound publish, with the topic.
    pub fn on_publish(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_publish = Some(Box::new(hook));
        self
    }

    /// Fired after each subscription, with the topic.
    pub fn on_subscribe(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_subscribe = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for EventHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHooks")
            .field("on_connect", &self.on_connect.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .field("on_publish", &self.on_publish.is_some())
            .field("on_subscribe", &self.on_subscribe.is_some())
            .finish()
    }
}

/// The MQTT application: a root [`Router`] bound to a transport.
///
/// Build-then-serve: finish registration before calling
/// [`serve`](Self::serve).
pub struct Mqute {
    router: Router,
    config: MquteConfig,
    transport: Arc<dyn MqttTransport>,
    hooks: EventHooks,
    subscriptions: Vec<(String, QoS)>,
}

impl Mqute {
    /// Creates an application with no lifecycle hooks.
    pub fn new(config: MquteConfig, transport: Arc<dyn MqttTransport>) -> Self {
        Self::with_hooks(config, transport, EventHooks::default())
    }

    /// Creates an application with the given lifecycle hooks.
    pub fn with_hooks(
        config: MquteConfig,
        transport: Arc<dyn MqttTransport>,
        hooks: EventHooks,
    ) -> Self {
        Self {
            router: Router::default(),
            config,
            transport,
            hooks,
            subscriptions: Vec::new(),
        }
    }

    /// The underlying router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The topics queued for subscription at serve time.
    pub fn subscriptions(&self) -> &[(String, QoS)] {
        &self.subscriptions
    }

    /// Registers a handler and queues its topic for subscription.
    pub fn sub(&mut self, path: impl AsRef<str>, handler: impl RouteHandler + 'static) {
        let topic = compose(self.router.prefix(), path.as_ref());
        self.router.sub(path, handler);
        self.record_subscription(topic, QoS::AtMostOnce);
    }

    /// Appends an interceptor to the root router.
    pub fn middleware(&mut self, middleware: impl Middleware + 'static) {
        self.router.middleware(middleware);
    }

    /// Flattens `child` into the root router and queues every newly added
    /// route for subscription.
    pub fn include_router(
        &mut self,
        child: &Router,
        include_prefix: Option<&str>,
    ) -> ClientResult<()> {
        let before: HashSet<String> = self.router.routes().map(String::from).collect();
        self.router.include_router(child, include_prefix)?;
        let added: Vec<String> = self
            .router
            .routes()
            .filter(|path| !before.contains(*path))
            .map(String::from)
            .collect();
        for topic in added {
            self.record_subscription(topic, QoS::AtLeastOnce);
        }
        Ok(())
    }

    fn record_subscription(&mut self, topic: String, qos: QoS) {
        if !self.subscriptions.iter().any(|(existing, _)| *existing == topic) {
            self.subscriptions.push((topic, qos));
        }
    }

    /// Publishes a payload directly, outside the request/response flow.
    pub async fn publish(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> ClientResult<()> {
        self.transport.publish(topic, payload, qos, retain).await?;
        Ok(())
    }

    /// Connects, subscribes, and runs the receive loop until the transport
    /// closes.
    ///
    /// Every inbound message is routed; its resolution publishes the
    /// response wire form back on the request topic at
    /// [`QoS::AtLeastOnce`], non-retained.
    pub async fn serve(self) -> ClientResult<()> {
        let Self {
            router,
            config,
            transport,
            hooks,
            subscriptions,
        } = self;

        info!(
            url = %config.broker.url,
            port = config.broker.port,
            client_id = %config.broker.client_id,
            "connecting to broker"
        );
        transport.connect().await?;
        if let Some(hook) = &hooks.on_connect {
            hook();
        }

        for (topic, qos) in &subscriptions {
            transport.subscribe(topic, *qos).await?;
            debug!(topic = %topic, qos = qos.as_u8(), "subscribed");
            if let Some(hook) = &hooks.on_subscribe {
                hook(topic);
            }
        }

        // Resolution sinks are synchronous; replies cross this channel back
        // into the async loop for publishing.
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<(String, String)>();

        loop {
            tokio::select! {
                biased;

                Some((topic, wire)) = reply_rx.recv() => {
                    publish_reply(transport.as_ref(), &hooks, &topic, &wire).await;
                }

                inbound = transport.recv() => match inbound {
                    Ok(Some(message)) => {
                        debug!(topic = %message.topic, "inbound message");
                        let payload = decode_payload(&message.payload);
                        let reply_topic = message.topic.clone();
                        let reply_tx = reply_tx.clone();
                        let request = Request::new(message.topic, payload, move |response| {
                            if reply_tx.send((reply_topic, response.to_wire())).is_err() {
                                warn!("reply channel closed, dropping response");
                            }
                        });
                        router.route(request).await;
                    }
                    Ok(None) => {
                        // Flush replies for the final requests before leaving.
                        while let Ok((topic, wire)) = reply_rx.try_recv() {
                            publish_reply(transport.as_ref(), &hooks, &topic, &wire).await;
                        }
                        info!("transport closed, stopping");
                        if let Some(hook) = &hooks.on_disconnect {
                            hook("connection closed");
                        }
                        return Ok(());
                    }
                    Err(err) => {
                        error!(error = %err, "transport receive failed");
                        if let Some(hook) = &hooks.on_disconnect {
                            hook(&err.to_string());
                        }
                        return Err(err.into());
                    }
                },
            }
        }
    }
}

impl std::fmt::Debug for Mqute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mqute")
            .field("router", &self.router)
            .field("config", &self.config)
            .field("subscriptions", &self.subscriptions)
            .finish_non_exhaustive()
    }
}

async fn publish_reply(
    transport: &dyn MqttTransport,
    hooks: &EventHooks,
    topic: &str,
    wire: &str,
) {
    if let Err(err) = transport
        .publish(topic, wire.as_bytes(), QoS::AtLeastOnce, false)
        .await
    {
        warn!(topic = %topic, error = %err, "failed to publish reply");
        return;
    }
    if let Some(hook) = &hooks.on_publish {
        hook(topic);
    }
}

/// Decodes payload bytes into the engine's opaque value: JSON when the
/// payload parses as JSON, a lossy UTF-8 string otherwise.
fn decode_payload(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;
    use mqute_core::{JsonResponse, RouteError, handler_fn, middleware_fn, respond};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn echo_app(transport: Arc<MemoryTransport>) -> Mqute {
        let mut app = Mqute::new(MquteConfig::default(), transport);
        app.sub(
            "echo",
            handler_fn(|request: &mut Request| {
                respond(JsonResponse::from_value(request.payload().clone()))
            }),
        );
        app
    }

    #[tokio::test]
    async fn serve_replies_on_the_request_topic() {
        let transport = Arc::new(MemoryTransport::new());
        let app = echo_app(Arc::clone(&transport));

        transport
            .inject("echo", br#"{"message": "hello"}"#.to_vec())
            .unwrap();
        transport.close();
        app.serve().await.unwrap();

        let published = transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].topic, "echo");
        assert_eq!(published[0].qos, QoS::AtLeastOnce);
        assert!(!published[0].retain);
        assert_eq!(published[0].payload, br#"{"message":"hello"}"#.to_vec());
    }

    #[tokio::test]
    async fn serve_subscribes_every_recorded_topic() {
        let transport = Arc::new(MemoryTransport::new());
        let mut app = echo_app(Arc::clone(&transport));

        let mut floor = Router::new("floor1");
        floor.sub(
            "room/status",
            handler_fn(|_: &mut Request| {
                respond(JsonResponse::from_value(json!({"status": 200})))
            }),
        );
        app.include_router(&floor, Some("buildings/building1"))
            .unwrap();

        assert_eq!(
            app.subscriptions(),
            [
                ("echo".to_string(), QoS::AtMostOnce),
                (
                    "buildings/building1/floor1/room/status".to_string(),
                    QoS::AtLeastOnce
                ),
            ]
        );

        transport.close();
        app.serve().await.unwrap();

        let subscribed = transport.subscriptions();
        assert!(subscribed.contains("echo"));
        assert!(subscribed.contains("buildings/building1/floor1/room/status"));
    }

    #[tokio::test]
    async fn unmatched_topic_publishes_the_rejection() {
        let transport = Arc::new(MemoryTransport::new());
        let app = echo_app(Arc::clone(&transport));

        transport.inject("devices/camera/unknown", b"{}".to_vec()).unwrap();
        transport.close();
        app.serve().await.unwrap();

        let published = transport.published();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].payload,
            b"Error: No handler registered for path: devices/camera/unknown".to_vec()
        );
    }

    #[tokio::test]
    async fn middleware_rejection_reaches_the_wire() {
        let transport = Arc::new(MemoryTransport::new());
        let mut app = Mqute::new(MquteConfig::default(), transport.clone());
        app.middleware(middleware_fn(|request: &mut Request| {
            let value = request
                .payload()
                .get("value")
                .and_then(Value::as_f64)
                .ok_or_else(|| RouteError::validation("Temperature value must be a number"))?;
            if !(-50.0..=100.0).contains(&value) {
                return Err(RouteError::validation("Temperature out of range"));
            }
            Ok(())
        }));
        app.sub(
            "devices/temperature",
            handler_fn(|request: &mut Request| {
                respond(JsonResponse::from_value(json!({
                    "status": "received",
                    "data": request.payload().clone(),
                })))
            }),
        );

        transport
            .inject("devices/temperature", br#"{"value": 150}"#.to_vec())
            .unwrap();
        transport
            .inject("devices/temperature", br#"{"value": 25}"#.to_vec())
            .unwrap();
        transport.close();
        app.serve().await.unwrap();

        let published = transport.published();
        assert_eq!(published.len(), 2);
        assert_eq!(
            published[0].payload,
            b"Error: Temperature out of range".to_vec()
        );
        assert_eq!(
            published[1].payload,
            br#"{"data":{"value":25},"status":"received"}"#.to_vec()
        );
    }

    #[tokio::test]
    async fn hooks_fire_in_lifecycle_order() {
        let connects = Arc::new(AtomicUsize::new(0));
        let subscribes = Arc::new(AtomicUsize::new(0));
        let publishes = Arc::new(AtomicUsize::new(0));
        let disconnects = Arc::new(AtomicUsize::new(0));

        let hooks = {
            let connects = Arc::clone(&connects);
            let subscribes = Arc::clone(&subscribes);
            let publishes = Arc::clone(&publishes);
            let disconnects = Arc::clone(&disconnects);
            EventHooks::new()
                .on_connect(move || {
                    connects.fetch_add(1, Ordering::SeqCst);
                })
                .on_subscribe(move |_| {
                    subscribes.fetch_add(1, Ordering::SeqCst);
                })
                .on_publish(move |_| {
                    publishes.fetch_add(1, Ordering::SeqCst);
                })
                .on_disconnect(move |_| {
                    disconnects.fetch_add(1, Ordering::SeqCst);
                })
        };

        let transport = Arc::new(MemoryTransport::new());
        let mut app = Mqute::with_hooks(
            MquteConfig::default(),
            Arc::clone(&transport) as Arc<dyn MqttTransport>,
            hooks,
        );
        app.sub(
            "echo",
            handler_fn(|request: &mut Request| {
                respond(JsonResponse::from_value(request.payload().clone()))
            }),
        );

        transport.inject("echo", br#"{"n": 1}"#.to_vec()).unwrap();
        transport.close();
        app.serve().await.unwrap();

        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(subscribes.load(Ordering::SeqCst), 1);
        assert_eq!(publishes.load(Ordering::SeqCst), 1);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn payloads_decode_to_json_or_lossy_string() {
        assert_eq!(decode_payload(br#"{"value": 25}"#), json!({"value": 25}));
        assert_eq!(decode_payload(b"42"), json!(42));
        assert_eq!(decode_payload(b"plain text"), json!("plain text"));
    }

    #[test]
    fn duplicate_subscriptions_are_recorded_once() {
        let transport = Arc::new(MemoryTransport::new());
        let mut app = echo_app(transport);
        app.sub(
            "echo",
            handler_fn(|_: &mut Request| {
                respond(JsonResponse::from_value(json!({"again": true})))
            }),
        );
        assert_eq!(app.subscriptions().len(), 1);
    }
}
