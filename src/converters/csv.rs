//! CSV parsing into a list of row maps.
//!
//! The first non-blank line holds the headers. Each following line becomes a
//! map from header to cell text, and the whole document is `{"rows": [...]}`.
//! Cells may be quoted; a doubled quote inside quotes is a literal quote and
//! commas inside quotes do not split. Every cell is trimmed and then passed
//! through the optional [`CellSanitizer`].

use super::{Format, FormatParser, ParseError};
use crate::document::node::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Key holding the parsed rows.
pub const ROWS_KEY: &str = "rows";

/// Hook applied to every cell value before it is stored.
pub type CellSanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Parses CSV documents.
#[derive(Clone, Default)]
pub struct CsvParser {
    sanitizer: Option<CellSanitizer>,
}

impl fmt::Debug for CsvParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvParser")
            .field("sanitizer", &self.sanitizer.is_some())
            .finish()
    }
}

impl CsvParser {
    pub fn new(sanitizer: Option<CellSanitizer>) -> Self {
        Self { sanitizer }
    }

    fn cell(&self, raw: &str) -> Value {
        match &self.sanitizer {
            Some(sanitize) => Value::String(sanitize(raw)),
            None => Value::String(raw.to_string()),
        }
    }
}

impl FormatParser for CsvParser {
    fn format(&self) -> Format {
        Format::Csv
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let mut rows = Vec::new();
        if let Some(header_line) = lines.next() {
            let headers = split_line(header_line);
            for line in lines {
                let fields = split_line(line);
                let mut row = IndexMap::with_capacity(headers.len());
                for (index, header) in headers.iter().enumerate() {
                    let raw = fields.get(index).map(String::as_str).unwrap_or("");
                    row.insert(header.clone(), self.cell(raw));
                }
                rows.push(Value::Object(row));
            }
        }

        let mut doc = IndexMap::new();
        doc.insert(ROWS_KEY.to_string(), Value::Array(rows));
        Ok(Value::Object(doc))
    }
}

/// Splits one line into trimmed fields, honoring double-quoted sections.
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_split_line_quoting() {
        assert_eq!(
            split_line(r#"a, "b, c" ,"say ""hi""",,"#),
            vec!["a", "b, c", "say \"hi\"", "", ""]
        );
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let value = CsvParser::default()
            .parse("name,age\nAlice,30\r\nBob,41\n")
            .unwrap();
        assert_eq!(
            value,
            json(r#"{"rows":[{"name":"Alice","age":"30"},{"name":"Bob","age":"41"}]}"#)
        );
    }

    #[test]
    fn test_short_rows_are_padded_and_long_rows_cut() {
        let value = CsvParser::default().parse("a,b,c\n1\n1,2,3,4").unwrap();
        assert_eq!(
            value,
            json(r#"{"rows":[{"a":"1","b":"","c":""},{"a":"1","b":"2","c":"3"}]}"#)
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let value = CsvParser::default().parse("\n\ncol\n\n x \n   \n").unwrap();
        assert_eq!(value, json(r#"{"rows":[{"col":"x"}]}"#));
    }

    #[test]
    fn test_empty_and_header_only() {
        assert_eq!(CsvParser::default().parse("").unwrap(), json(r#"{"rows":[]}"#));
        assert_eq!(CsvParser::default().parse("a,b").unwrap(), json(r#"{"rows":[]}"#));
    }

    #[test]
    fn test_sanitizer_sees_every_cell() {
        let upper: CellSanitizer = Arc::new(|cell: &str| cell.to_uppercase());
        let value = CsvParser::new(Some(upper)).parse("k\nabc\n\"d,e\"").unwrap();
        assert_eq!(value, json(r#"{"rows":[{"k":"ABC"},{"k":"D,E"}]}"#));
    }
}
