// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Newline-delimited JSON input.
//!
//! Each line is one JSON object. Its top-level scalar fields are copied onto
//! an event that already carries the collector defaults, overriding them on
//! a name clash. Nested values are skipped.

use insights_pipeline::{Event, FieldValue};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,
}

/// Applies one input line to `event`. Returns `Ok(false)` for blank lines.
pub fn apply_line(line: &str, event: &mut Event) -> Result<bool, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(false);
    }

    let value: serde_json::Value = serde_json::from_str(line)?;
    let serde_json::Value::Object(fields) = value else {
        return Err(LineError::NotAnObject);
    };

    for (name, value) in &fields {
        match FieldValue::from_json(value) {
            Some(field) => event.set(name.as_str(), field),
            None => warn!("Skipping field '{name}': only scalar values are supported"),
        }
    }
    Ok(true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn template() -> Event {
        let mut event = Event::new();
        event.set("eventType", "Transaction");
        event.set("accountId", 1_u64);
        event
    }

    #[test]
    fn test_scalar_fields_are_copied() {
        let mut event = template();
        let applied = apply_line(
            r#"{"name":"checkout","duration":0.5,"items":3,"cached":false}"#,
            &mut event,
        )
        .unwrap();

        assert!(applied);
        assert_eq!(
            event.get("name"),
            Some(&FieldValue::Text("checkout".to_string()))
        );
        assert_eq!(event.get("duration"), Some(&FieldValue::Float(0.5)));
        assert_eq!(event.get("items"), Some(&FieldValue::Integer(3)));
        assert_eq!(event.get("cached"), Some(&FieldValue::Bool(false)));
        assert_eq!(event.get("accountId"), Some(&FieldValue::Unsigned(1)));
    }

    #[test]
    fn test_fields_override_defaults() {
        let mut event = template();
        apply_line(r#"{"eventType":"PageView"}"#, &mut event).unwrap();
        assert_eq!(
            event.get("eventType"),
            Some(&FieldValue::Text("PageView".to_string()))
        );
    }

    #[test]
    #[traced_test]
    fn test_nested_values_are_skipped() {
        let mut event = template();
        apply_line(
            r#"{"ok":1,"tags":["a"],"request":{"url":"/"},"missing":null}"#,
            &mut event,
        )
        .unwrap();

        assert_eq!(event.len(), 3);
        assert!(event.get("tags").is_none());
        assert!(event.get("request").is_none());
        assert!(event.get("missing").is_none());
        assert!(logs_contain("Skipping field 'tags'"));
    }

    #[test]
    fn test_blank_line() {
        let mut event = template();
        assert!(!apply_line("   ", &mut event).unwrap());
        assert_eq!(event, template());
    }

    #[test]
    fn test_invalid_lines() {
        let mut event = template();
        assert!(matches!(
            apply_line("{not json", &mut event),
            Err(LineError::Json(_))
        ));
        assert!(matches!(
            apply_line("[1,2]", &mut event),
            Err(LineError::NotAnObject)
        ));
    }
}
