//! Indentation-based YAML subset.
//!
//! Only block mappings are understood: every content line is `key: value` or
//! `key:` (which opens a nested map for the lines indented beneath it).
//! Comments and blank lines are ignored. Scalars are coerced to null,
//! booleans, numbers or strings.
//!
//! # Example
//!
//! ```
//! use unifio::converters::{FormatParser, YamlParser};
//!
//! let doc = YamlParser.parse("server:\n  port: 8080\n  tls: false\nname: 'api'").unwrap();
//! assert_eq!(
//!     serde_json::to_string(&doc).unwrap(),
//!     r#"{"server":{"port":8080,"tls":false},"name":"api"}"#
//! );
//! ```

use super::{Format, FormatParser, ParseError};
use crate::document::node::{Number, Value};
use indexmap::IndexMap;

/// Parses the YAML mapping subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

/// One open mapping on the indentation stack.
struct Frame {
    /// Indent of the `key:` line that opened this map; `None` for the root.
    indent: Option<usize>,
    /// Key in the parent map; `None` for the root.
    key: Option<String>,
    map: IndexMap<String, Value>,
}

impl Frame {
    fn new(indent: Option<usize>, key: Option<String>) -> Self {
        Self {
            indent,
            key,
            map: IndexMap::new(),
        }
    }
}

impl FormatParser for YamlParser {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        let mut stack = vec![Frame::new(None, None)];

        for raw_line in text.lines() {
            let line = strip_comment(raw_line).trim_end();
            if line.trim().is_empty() {
                continue;
            }

            let indent = line.len() - line.trim_start().len();
            while stack.len() > 1 && stack.last().and_then(|f| f.indent).is_some_and(|i| i >= indent) {
                close_frame(&mut stack);
            }

            // The root frame is never popped.
            let Some(top) = stack.last_mut() else {
                return Err(ParseError::new(Format::Yaml, "invalid structure"));
            };

            let content = line.trim_start();
            let Some((raw_key, raw_value)) = content.split_once(':') else {
                return Err(ParseError::new(
                    Format::Yaml,
                    format!("invalid line: {}", content),
                ));
            };
            let key = unquote(raw_key.trim()).to_string();
            let value = raw_value.trim();

            if value.is_empty() {
                stack.push(Frame::new(Some(indent), Some(key)));
            } else {
                top.map.insert(key, coerce_scalar(value));
            }
        }

        while stack.len() > 1 {
            close_frame(&mut stack);
        }
        Ok(stack
            .pop()
            .map(|root| Value::Object(root.map))
            .unwrap_or_default())
    }
}

/// Pops the top frame and stores its map in the parent under its key.
fn close_frame(stack: &mut Vec<Frame>) {
    if let Some(frame) = stack.pop() {
        if let (Some(parent), Some(key)) = (stack.last_mut(), frame.key) {
            parent.map.insert(key, Value::Object(frame.map));
        }
    }
}

/// Removes a `#` comment that starts the line or follows whitespace, outside quotes.
///
/// A quote only opens at the start of a key or value, so apostrophes inside
/// plain text (`don't`) are literal.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut token_start = true;
    let mut prev_is_space = true;
    for (idx, ch) in line.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if (ch == '"' || ch == '\'') && token_start => quote = Some(ch),
            None if ch == '#' && prev_is_space => return &line[..idx],
            None => {}
        }
        prev_is_space = ch.is_whitespace();
        token_start = prev_is_space || (quote.is_none() && ch == ':');
    }
    line
}

/// Strips one pair of matching surrounding quotes.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn coerce_scalar(text: &str) -> Value {
    if text.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Some(number) = Number::parse_literal(text) {
        return Value::Number(number);
    }
    Value::String(unquote(text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Value {
        YamlParser.parse(text).unwrap()
    }

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    fn message(text: &str) -> String {
        YamlParser.parse(text).unwrap_err().message
    }

    #[test]
    fn test_flat_mapping() {
        assert_eq!(parse("a: 1\nb: 2"), json(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn test_nested_maps_and_dedent() {
        let doc = "\
user:
  name: Alice
  address:
    city: Paris
  age: 30
active: true
";
        assert_eq!(
            parse(doc),
            json(r#"{"user":{"name":"Alice","address":{"city":"Paris"},"age":30},"active":true}"#)
        );
    }

    #[test]
    fn test_scalar_coercion() {
        let doc = "n: NULL\nt: True\nf: false\ni: -12\nx: 2.5\ns: \"quoted: yes\"\nq: 'single'\nw: plain text\ninf: inf";
        assert_eq!(
            parse(doc),
            json(r#"{"n":null,"t":true,"f":false,"i":-12,"x":2.5,"s":"quoted: yes","q":"single","w":"plain text","inf":"inf"}"#)
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let doc = "# header\n\na: 1 # trailing\nb: \"keep # this\"\nc: x#y\n   \n";
        assert_eq!(parse(doc), json(r##"{"a":1,"b":"keep # this","c":"x#y"}"##));
    }

    #[test]
    fn test_value_splits_on_first_colon() {
        assert_eq!(parse("url: http://example.com:80"), json(r#"{"url":"http://example.com:80"}"#));
    }

    #[test]
    fn test_opened_map_without_children_is_empty() {
        assert_eq!(parse("a:\nb: 1"), json(r#"{"a":{},"b":1}"#));
        assert_eq!(parse("a:"), json(r#"{"a":{}}"#));
    }

    #[test]
    fn test_quoted_keys() {
        assert_eq!(parse("\"my key\": 1\n'other': 2"), json(r#"{"my key":1,"other":2}"#));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse(""), json("{}"));
        assert_eq!(parse("# only a comment\n"), json("{}"));
    }

    #[test]
    fn test_line_without_colon_fails() {
        assert_eq!(message("a: 1\n- item"), "invalid line: - item");
        assert_eq!(message("key: [unclosed\njust text"), "invalid line: just text");
    }

    #[test]
    fn test_indent_under_scalar_joins_enclosing_map() {
        assert_eq!(parse("a: 1\n  b: 2"), json(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn test_partial_dedent_stays_in_open_map() {
        assert_eq!(parse("a:\n    b: 1\n  c: 2"), json(r#"{"a":{"b":1,"c":2}}"#));
    }

    #[test]
    fn test_indented_first_line_then_dedent() {
        assert_eq!(parse("  a: 1\nb: 2"), json(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn test_apostrophe_in_plain_value_does_not_hide_comment() {
        assert_eq!(parse("note: don't # hidden"), json(r#"{"note":"don't"}"#));
        assert_eq!(parse("q: 'it # stays' # gone"), json(r#"{"q":"it # stays"}"#));
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let value = parse("a: 1\nb: 2\na: 3");
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(value.get("a"), Some(&Value::from(3_i64)));
    }
}
