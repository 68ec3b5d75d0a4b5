//! Strict JSON parsing.

use super::{Format, FormatParser, ParseError};
use crate::document::node::Value;

/// Parses the full JSON grammar via `serde_json`, keeping key order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl FormatParser for JsonParser {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        serde_json::from_str(text)
            .map_err(|e| ParseError::with_cause(Format::Json, e.to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Number;

    #[test]
    fn test_parse_object() {
        let value = JsonParser.parse(r#"{"user":{"name":"Alice"},"n":1.5}"#).unwrap();
        assert_eq!(value.get("user").and_then(|u| u.get("name")), Some(&Value::from("Alice")));
        assert_eq!(value.get("n"), Some(&Value::Number(Number::Float(1.5))));
    }

    #[test]
    fn test_parse_scalars_at_top_level() {
        assert_eq!(JsonParser.parse("null").unwrap(), Value::Null);
        assert_eq!(JsonParser.parse("[true]").unwrap(), Value::from(vec![Value::from(true)]));
    }

    #[test]
    fn test_malformed_json_fails() {
        for text in ["", "{", r#"{"a":}"#, "[1,]", "{'a':1}", "1 2"] {
            let err = JsonParser.parse(text).unwrap_err();
            assert_eq!(err.format, Format::Json, "input {:?}", text);
            assert!(err.cause.is_some());
        }
    }
}
