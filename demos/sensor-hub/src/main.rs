//! Sensor Hub Demo
//!
//! Drives the MQute routing stack over the in-memory loopback transport:
//! a temperature endpoint with range validation, a timestamp middleware,
//! and a nested building/floor router. A feeder task plays the broker,
//! injecting scripted sensor messages and then closing the connection.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package sensor-hub
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::{Value, json};
use tracing::info;

use mqute::prelude::*;
use mqute::transport::memory::MemoryTransport;

/// Accepts readings in `[-50, 100]` degrees, rejects everything else.
fn temperature_handler(request: &mut Request) -> RouteResult<Option<BoxedResponse>> {
    let value = request
        .payload()
        .get("value")
        .and_then(Value::as_f64)
        .ok_or_else(|| RouteError::validation("Temperature value must be a number"))?;
    if !(-50.0..=100.0).contains(&value) {
        return Err(RouteError::validation("Temperature out of range"));
    }
    respond(JsonResponse::from_value(json!({
        "status": "received",
        "data": request.payload().clone(),
    })))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = MquteConfig::default();
    mqute::client::logging::init_from_config(&config.logging);

    let transport = Arc::new(MemoryTransport::new());

    let hooks = EventHooks::new()
        .on_connect(|| info!("connected to broker"))
        .on_disconnect(|reason| info!(reason, "disconnected"))
        .on_publish(|topic| info!(topic, "reply published"));

    let mut app = Mqute::with_hooks(
        config,
        Arc::clone(&transport) as Arc<dyn MqttTransport>,
        hooks,
    );

    // Stamp every payload before validation or handling.
    app.middleware(middleware_fn(|request: &mut Request| {
        if let Value::Object(payload) = request.payload_mut() {
            payload.insert("received_at".to_string(), json!("2026-08-07T12:00:00Z"));
        }
        Ok(())
    }));

    app.sub("devices/temperature", handler_fn(temperature_handler));

    let mut floor = Router::new("floor1");
    floor.sub(
        "room/status",
        handler_fn(|request: &mut Request| {
            respond(JsonResponse::from_value(json!({
                "status": 200,
                "payload": request.payload().clone(),
            })))
        }),
    );
    app.include_router(&floor, Some("buildings/building1"))?;

    // Play the broker: deliver a few sensor messages, then hang up.
    let feeder = {
        let publisher = Arc::clone(&transport);
        tokio::spawn(async move {
            let scripted = [
                ("devices/temperature", json!({"value": 25})),
                ("devices/temperature", json!({"value": 150})),
                (
                    "buildings/building1/floor1/room/status",
                    json!({"occupied": true}),
                ),
                ("devices/camera/unknown", json!({})),
            ];
            for (topic, payload) in scripted {
                publisher
                    .inject(topic, payload.to_string().into_bytes())
                    .expect("loopback open");
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            publisher.close();
        })
    };

    app.serve().await?;
    feeder.await?;

    for reply in transport.published() {
        info!(
            topic = %reply.topic,
            body = %String::from_utf8_lossy(&reply.payload),
            "observed reply"
        );
    }
    Ok(())
}
