//! Requests and the one-shot resolution contract.
//!
//! A [`Request`] represents one inbound dispatch unit in flight. It is
//! created by the transport collaborator per inbound message, bound to a
//! resolution sink that knows how to emit the final response (typically a
//! publish-reply), and handed to [`Router::route`](crate::Router::route).
//! The request holds no transport knowledge of its own; all side effects
//! are delegated to the sink.

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::AlreadyResolvedError;
use crate::response::{ErrorResponse, Response};

/// The caller-supplied sink invoked with the final response.
pub type ResolveSink = Box<dyn FnOnce(&dyn Response) + Send>;

/// One inbound dispatch unit, owning a one-shot resolution slot.
///
/// The sink is invoked **at most once** per request. The slot is a
/// lock-guarded take, so the check-and-set is atomic even if a handler
/// spawns concurrent completions; a second attempt fails with
/// [`AlreadyResolvedError`] rather than silently overwriting the first.
pub struct Request {
    path: String,
    payload: Value,
    sink: Mutex<Option<ResolveSink>>,
}

impl Request {
    /// Creates a request for the given raw (pre-normalization) path.
    pub fn new(
        path: impl Into<String>,
        payload: Value,
        resolve: impl FnOnce(&dyn Response) + Send + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            payload,
            sink: Mutex::new(Some(Box::new(resolve))),
        }
    }

    /// The raw request path, as delivered by the transport.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The opaque request payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Mutable access to the payload, for in-place mutation by middleware.
    pub fn payload_mut(&mut self) -> &mut Value {
        &mut self.payload
    }

    /// Resolves the request, invoking the sink synchronously in the
    /// caller's execution context.
    ///
    /// # Errors
    ///
    /// Fails with [`AlreadyResolvedError`] if the request was already
    /// resolved; the first resolution stands.
    pub fn resolve(&self, response: impl Response) -> Result<(), AlreadyResolvedError> {
        let sink = self.sink.lock().take().ok_or(AlreadyResolvedError)?;
        sink(&response);
        Ok(())
    }

    /// Resolves the request with a boxed response.
    ///
    /// Used by the dispatcher to deliver handler return values; same
    /// one-shot guarantee as [`resolve`](Self::resolve).
    pub fn resolve_boxed(
        &self,
        response: Box<dyn Response>,
    ) -> Result<(), AlreadyResolvedError> {
        let sink = self.sink.lock().take().ok_or(AlreadyResolvedError)?;
        sink(response.as_ref());
        Ok(())
    }

    /// Rejects the request with an error message.
    ///
    /// Sugar for resolving with an [`ErrorResponse`]; same one-shot
    /// guarantee as [`resolve`](Self::resolve).
    pub fn reject(&self, error: impl Into<String>) -> Result<(), AlreadyResolvedError> {
        self.resolve(ErrorResponse::new(error))
    }

    /// Whether the request has been resolved. No side effect.
    pub fn is_resolved(&self) -> bool {
        self.sink.lock().is_none()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("path", &self.path)
            .field("payload", &self.payload)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::JsonResponse;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_request(counter: &Arc<AtomicUsize>) -> Request {
        let counter = Arc::clone(counter);
        Request::new("devices/temperature", json!({"value": 25}), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn resolve_invokes_sink_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let request = counting_request(&counter);

        assert!(!request.is_resolved());
        request
            .resolve(JsonResponse::from_value(json!({"status": "received"})))
            .unwrap();
        assert!(request.is_resolved());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn second_resolution_fails_with_already_resolved() {
        let counter = Arc::new(AtomicUsize::new(0));
        let request = counting_request(&counter);

        request.resolve(JsonResponse::default()).unwrap();
        let err = request.resolve(JsonResponse::default()).unwrap_err();
        assert_eq!(err, AlreadyResolvedError);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reject_resolves_with_error_response() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink_messages = Arc::clone(&messages);
        let request = Request::new("devices/temperature", json!({}), move |response| {
            sink_messages.lock().push(response.to_wire());
        });

        request.reject("Missing temperature value").unwrap();
        assert!(request.reject("second").is_err());
        let messages = messages.lock();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], "Error: Missing temperature value");
    }

    #[test]
    fn payload_is_mutable_in_place() {
        let mut request = Request::new("devices/temperature", json!({"value": 25}), |_| {});
        request.payload_mut()["request_id"] = json!("123");
        assert_eq!(request.payload()["request_id"], json!("123"));
    }
}
