//! Free-form event payloads and their total stringification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One value of an event details payload.
///
/// The variants close over everything a JSON payload can hold, so rendering
/// a value for display never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailValue {
    /// Plain text.
    Text(String),
    /// Numeric value.
    Number(Number),
    /// Boolean value.
    Flag(bool),
    /// Explicit null or a key that is not present.
    Missing,
    /// Arrays and objects.
    Structured(Value),
}

impl DetailValue {
    /// Renders the value for display, substituting `fallback` when missing.
    ///
    /// Text passes through unchanged, even when empty. Structured values
    /// render as compact JSON.
    #[must_use]
    pub fn display_or(&self, fallback: &str) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Flag(flag) => flag.to_string(),
            Self::Missing => fallback.to_owned(),
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<Value> for DetailValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Bool(flag) => Self::Flag(flag),
            Value::Number(number) => Self::Number(number),
            Value::String(text) => Self::Text(text),
            structured @ (Value::Array(_) | Value::Object(_)) => Self::Structured(structured),
        }
    }
}

impl From<DetailValue> for Value {
    fn from(value: DetailValue) -> Self {
        match value {
            DetailValue::Text(text) => Self::String(text),
            DetailValue::Number(number) => Self::Number(number),
            DetailValue::Flag(flag) => Self::Bool(flag),
            DetailValue::Missing => Self::Null,
            DetailValue::Structured(structured) => structured,
        }
    }
}

/// JSON object attached to a system event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventDetails(Map<String, Value>);

impl EventDetails {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Adds the key only when `value` is present.
    #[must_use]
    pub fn with_optional(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(present) => self.with(key, present),
            None => self,
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> DetailValue {
        self.0
            .get(key)
            .cloned()
            .map_or(DetailValue::Missing, DetailValue::from)
    }

    /// Returns `true` when no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the payload to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Parses a stored payload; anything but an object becomes `{"raw": ..}`.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::new(),
            other => Self::new().with("raw", other),
        }
    }
}
