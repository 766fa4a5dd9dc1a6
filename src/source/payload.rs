//! Response body classification
//!
//! A usable body is either a bare JSON list or an object carrying the list
//! under one of the known wrapper keys, tried in priority order. Falsy
//! bodies terminate pagination and contribute no records.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

/// Wrapper keys tried on object-shaped bodies, in priority order
pub const WRAPPER_KEYS: [&str; 2] = ["results", "response"];

/// A parsed response body, classified by shape
#[derive(Debug)]
pub enum ResponseBody {
    /// Object body; records live under a wrapper key
    Object(JsonObject),
    /// Bare list body
    List(Vec<JsonValue>),
}

impl ResponseBody {
    /// Classify a parsed body; scalar bodies are unusable.
    pub fn classify(body: JsonValue) -> Result<Self> {
        match body {
            JsonValue::Object(map) => Ok(ResponseBody::Object(map)),
            JsonValue::Array(items) => Ok(ResponseBody::List(items)),
            other => Err(Error::response_shape(format!(
                "expected an object or a list, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Extract the record list.
    pub fn into_records(self) -> Result<Vec<JsonValue>> {
        match self {
            ResponseBody::List(items) => Ok(items),
            ResponseBody::Object(mut map) => {
                for key in WRAPPER_KEYS {
                    if let Some(value) = map.remove(key) {
                        return match value {
                            JsonValue::Array(items) => Ok(items),
                            other => Err(Error::response_shape(format!(
                                "wrapper key '{key}' holds {}, not a list",
                                value_kind(&other)
                            ))),
                        };
                    }
                }
                Err(Error::response_shape(format!(
                    "object body carries none of the known wrapper keys ({})",
                    WRAPPER_KEYS.join(", ")
                )))
            }
        }
    }
}

/// JSON-falsy test used as the pagination stop condition.
pub fn is_falsy(body: &JsonValue) -> bool {
    match body {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(s) => s.is_empty(),
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
    }
}

fn value_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}
