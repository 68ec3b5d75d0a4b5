//! Unifio - combine structured documents from several formats into one.
//!
//! JSON, XML, YAML and CSV inputs are parsed into a canonical
//! [`Value`](document::node::Value) tree, merged left to right, and optionally
//! reshaped through a template whose string leaves are JSONPath expressions.
//!
//! - [`converters`] - per-format parsers
//! - [`document`] - canonical value and merging
//! - [`jsonpath`] - path tokenizer and evaluator
//! - [`projection`] - template-driven reshaping with depth and size limits
//! - [`combine`] - the whole pipeline for a list of inputs
//!
//! # Example
//!
//! ```
//! use unifio::config::Config;
//! use unifio::converters::{parse_one, Format};
//! use unifio::document::merge_all;
//! use unifio::projection::project;
//!
//! let config = Config::default();
//! let docs = vec![
//!     parse_one(Format::Json, r#"{"user":{"name":"Alice"}}"#, &config).unwrap(),
//!     parse_one(Format::Yaml, "user:\n  age: 30", &config).unwrap(),
//! ];
//! let merged = merge_all(&docs);
//!
//! let template = serde_json::from_str(r#"{"who":"$.user.name","age":"$.user.age"}"#).unwrap();
//! let shaped = project(&template, &merged, &config);
//! assert_eq!(serde_json::to_string(&shaped.value).unwrap(), r#"{"who":"Alice","age":30}"#);
//! ```

pub mod combine;
pub mod config;
pub mod converters;
pub mod document;
pub mod file;
pub mod jsonpath;
pub mod policy;
pub mod projection;
