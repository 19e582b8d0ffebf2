//! Response variants and their wire serialization.
//!
//! The dispatch engine never inspects variant-specific fields: it only ever
//! invokes [`Response::to_wire`] and forwards the variant untouched to the
//! request's resolution sink. Consumers may define additional variants by
//! implementing [`Response`]; the built-in ones are [`JsonResponse`] for
//! success payloads and [`ErrorResponse`] for failures.

use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};

/// The capability set every response variant must expose.
///
/// `to_wire` is the only serialization contract the engine depends on; it
/// does not mandate JSON, text, or binary framing. `as_any` exists so that
/// resolution sinks and consumers can downcast to a concrete variant; the
/// engine itself never does.
pub trait Response: Send + fmt::Debug {
    /// Serializes this response into the string published on the wire.
    fn to_wire(&self) -> String;

    /// Returns self as `&dyn Any` for downcasting by consumers.
    fn as_any(&self) -> &dyn Any;
}

/// A boxed response trait object.
pub type BoxedResponse = Box<dyn Response>;

// =============================================================================
// Built-in Variants
// =============================================================================

/// A successful response carrying a structured mapping of fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonResponse {
    /// The response fields, serialized as a JSON object on the wire.
    pub data: Map<String, Value>,
}

impl JsonResponse {
    /// Creates a response from a field mapping.
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Creates a response from any JSON value.
    ///
    /// Non-object values are wrapped under a `"data"` key so the wire form
    /// stays a JSON object.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            other => {
                let mut data = Map::new();
                data.insert("data".to_string(), other);
                Self { data }
            }
        }
    }
}

impl Response for JsonResponse {
    fn to_wire(&self) -> String {
        Value::Object(self.data.clone()).to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An error response carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// The error message, used verbatim in equality checks by callers.
    pub error: String,
}

impl ErrorResponse {
    /// Creates an error response with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl Response for ErrorResponse {
    fn to_wire(&self) -> String {
        format!("Error: {}", self.error)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_response_wire_form_is_serialized_object() {
        let response = JsonResponse::from_value(json!({"status": "received"}));
        assert_eq!(response.to_wire(), r#"{"status":"received"}"#);
    }

    #[test]
    fn json_response_wraps_non_object_values() {
        let response = JsonResponse::from_value(json!(42));
        assert_eq!(response.data["data"], json!(42));
    }

    #[test]
    fn error_response_wire_form_is_prefixed() {
        let response = ErrorResponse::new("Temperature out of range");
        assert_eq!(response.to_wire(), "Error: Temperature out of range");
    }

    #[test]
    fn custom_variants_pass_through_untouched() {
        #[derive(Debug)]
        struct TemperatureResponse {
            temperature: f64,
            unit: &'static str,
        }

        impl Response for TemperatureResponse {
            fn to_wire(&self) -> String {
                format!("{} {}", self.temperature, self.unit)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let response = TemperatureResponse {
            temperature: 25.5,
            unit: "celsius",
        };
        assert_eq!(response.to_wire(), "25.5 celsius");
        let concrete = response
            .as_any()
            .downcast_ref::<TemperatureResponse>()
            .unwrap();
        assert_eq!(concrete.unit, "celsius");
    }
}
