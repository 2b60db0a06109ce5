//! Canonical serialization of parse results.
//!
//! Two equivalent trees must render to the same text, so object keys are
//! sorted at every level and indentation is fixed. The rendering of any
//! value is never empty (the smallest is `null`).

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Convert a value to JSON with keys sorted at every depth.
pub fn to_canonical_value<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Value> {
    Ok(sort_keys(serde_json::to_value(value)?))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Pretty-print with `indent_width` spaces per level and `\n` line breaks.
pub fn render(value: &Value, indent_width: usize) -> serde_json::Result<String> {
    let indent = vec![b' '; indent_width];
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut serializer)?;
    // serde_json only ever writes UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Canonical text of a parse result.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T, indent_width: usize) -> serde_json::Result<String> {
    render(&to_canonical_value(value)?, indent_width)
}

/// Remove every CR and LF so line-ending style never affects a comparison.
pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_keys_are_sorted() {
        let mut map = HashMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        map.insert("mid", 3);

        let text = canonicalize(&map, 2).unwrap();
        insta::assert_snapshot!(text, @r#"
        {
          "alpha": 2,
          "mid": 3,
          "zeta": 1
        }
        "#);
    }

    #[test]
    fn test_nested_indent_width() {
        let value = json!({"type": "Program", "body": [{"type": "EmptyStatement"}]});

        let text = canonicalize(&value, 4).unwrap();
        insta::assert_snapshot!(text, @r#"
        {
            "body": [
                {
                    "type": "EmptyStatement"
                }
            ],
            "type": "Program"
        }
        "#);
    }

    #[test]
    fn test_equivalent_trees_render_identically() {
        let left = json!({"a": {"y": 1, "x": [true, null]}, "b": "s"});
        let right: Value =
            serde_json::from_str(r#"{"b": "s", "a": {"x": [true, null], "y": 1}}"#).unwrap();

        assert_eq!(canonicalize(&left, 4).unwrap(), canonicalize(&right, 4).unwrap());
    }

    #[test]
    fn test_rendering_is_never_empty() {
        assert_eq!(canonicalize(&(), 4).unwrap(), "null");
        assert_eq!(canonicalize(&json!({}), 4).unwrap(), "{}");
    }

    #[test]
    fn test_strip_line_breaks() {
        assert_eq!(strip_line_breaks("a\r\nb\nc\rd"), "abcd");
        // Escaped newlines inside JSON strings are two characters and survive.
        assert_eq!(strip_line_breaks("\"a\\nb\"\n"), "\"a\\nb\"");
    }
}
