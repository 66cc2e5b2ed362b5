// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Events and their serialized form.
//!
//! An [`Event`] is a flat map from field name to scalar value. Producers are
//! expected to flatten nested structures before setting fields. [`serialize`]
//! turns an event into a [`Record`], the JSON object that the aggregator
//! joins into batches.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{Error as _, Serialize, Serializer};

use crate::errors::SerializationError;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    /// Converts a scalar JSON value. Returns `None` for `null`, arrays and
    /// objects, which have no flat representation.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::Unsigned(u))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Unsigned(u) => serializer.serialize_u64(*u),
            // serde_json would silently write `null` for these
            Self::Float(f) if !f.is_finite() => Err(S::Error::custom(format!(
                "unsupported float value: {f}"
            ))),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Unsigned(u64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A flat set of named values describing one occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    values: HashMap<String, FieldValue>,
}

impl Event {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One serialized event: a self-contained JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(String);

impl Record {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Encodes an event as a JSON object.
///
/// # Errors
///
/// Returns [`SerializationError`] when a value has no JSON representation,
/// such as a NaN or infinite float. The event is not modified.
pub fn serialize(event: &Event) -> Result<Record, SerializationError> {
    let json = serde_json::to_string(&event.values)?;
    Ok(Record(json))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_scalar_fields() {
        let mut event = Event::new();
        event.set("url", "/checkout");
        event.set("duration", 0.25);
        event.set("status-code", 200);
        event.set("cached", false);

        let record = serialize(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(record.as_str()).unwrap();

        assert_eq!(
            parsed,
            json!({
                "url": "/checkout",
                "duration": 0.25,
                "status-code": 200,
                "cached": false,
            })
        );
    }

    #[test]
    fn test_serialize_empty_event() {
        let record = serialize(&Event::new()).unwrap();
        assert_eq!(record.as_str(), "{}");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_serialize_rejects_nan() {
        let mut event = Event::new();
        event.set("ratio", f64::NAN);

        let err = serialize(&event).unwrap_err();
        assert!(err.to_string().contains("unsupported float value"));
    }

    #[test]
    fn test_serialize_rejects_infinity() {
        let mut event = Event::new();
        event.set("latency", f64::INFINITY);
        assert!(serialize(&event).is_err());
    }

    #[test]
    fn test_set_overrides_existing_value() {
        let mut event = Event::new();
        event.set("eventType", "Transaction");
        event.set("eventType", "Checkout");

        assert_eq!(event.len(), 1);
        assert_eq!(
            event.get("eventType"),
            Some(&FieldValue::Text("Checkout".to_string()))
        );
    }

    #[test]
    fn test_remove_field() {
        let mut event = Event::new();
        event.set("host", "web-1");
        assert_eq!(
            event.remove("host"),
            Some(FieldValue::Text("web-1".to_string()))
        );
        assert!(event.is_empty());
    }

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(
            FieldValue::from_json(&json!("a")),
            Some(FieldValue::Text("a".to_string()))
        );
        assert_eq!(FieldValue::from_json(&json!(-3)), Some(FieldValue::Integer(-3)));
        assert_eq!(
            FieldValue::from_json(&json!(u64::MAX)),
            Some(FieldValue::Unsigned(u64::MAX))
        );
        assert_eq!(FieldValue::from_json(&json!(1.5)), Some(FieldValue::Float(1.5)));
        assert_eq!(FieldValue::from_json(&json!(true)), Some(FieldValue::Bool(true)));
        assert_eq!(FieldValue::from_json(&json!(null)), None);
        assert_eq!(FieldValue::from_json(&json!([1, 2])), None);
        assert_eq!(FieldValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let mut event = Event::new();
        event.set("body", "line \"one\"\nline two");

        let record = serialize(&event).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(record.as_str()).unwrap();
        assert_eq!(parsed["body"], "line \"one\"\nline two");
    }
}
