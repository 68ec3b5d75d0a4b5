//! JSONPath-subset tokenizer and evaluator.
//!
//! # Supported Syntax
//!
//! - `$` - Root node
//! - `.property` - Named property access
//! - `['property']` / `["property"]` - Bracket notation, backslash escapes allowed
//! - `[index]` - Array index (supports negative indices)
//! - `[*]` or `.*` - Every element of an array
//!
//! Filters, slices, recursive descent and wildcards over object members are
//! not supported.
//!
//! # Examples
//!
//! ```
//! use unifio::document::node::Value;
//! use unifio::jsonpath::evaluate;
//!
//! let doc: Value = serde_json::from_str(r#"{"store":{"book":[{"author":"A"},{"author":"B"}]}}"#).unwrap();
//!
//! let authors = evaluate(&doc, "$.store.book[*].author").unwrap();
//! assert_eq!(authors, vec![&Value::from("A"), &Value::from("B")]);
//!
//! let last = evaluate(&doc, "$['store'].book[-1].author").unwrap();
//! assert_eq!(last, vec![&Value::from("B")]);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::{JsonPath, PathToken};
pub use error::PathSyntaxError;
pub use evaluator::Evaluator;
pub use parser::Parser;

use crate::document::node::Value;

/// Tokenizes `path` and evaluates it against `root`.
///
/// Returns every match in order of derivation. Matches borrow from `root`.
pub fn evaluate<'a>(root: &'a Value, path: &str) -> Result<Vec<&'a Value>, PathSyntaxError> {
    let parsed = Parser::parse(path)?;
    Ok(Evaluator::new(root).evaluate(&parsed.tokens))
}
