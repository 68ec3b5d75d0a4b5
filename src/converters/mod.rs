//! Format parsers that turn raw text into canonical [`Value`]s.
//!
//! Each supported format has one [`FormatParser`] implementation. Callers
//! normally go through [`parse_one`], which picks the parser for a [`Format`]
//! and applies the CSV cell sanitizer from the [`Config`].
//!
//! # Example
//!
//! ```
//! use unifio::config::Config;
//! use unifio::converters::{parse_one, Format};
//!
//! let doc = parse_one(Format::Xml, "<a>1</a><a>2</a>", &Config::default()).unwrap();
//! assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"a":["1","2"]}"#);
//! ```

pub mod csv;
pub mod json;
pub mod xml;
pub mod yaml;

pub use self::csv::{CellSanitizer, CsvParser};
pub use self::json::JsonParser;
pub use self::xml::XmlParser;
pub use self::yaml::YamlParser;

use crate::config::Config;
use crate::document::node::Value;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Input formats the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Format {
    Json,
    Xml,
    Yaml,
    Csv,
}

impl Format {
    /// All formats, in the order they are documented.
    pub const ALL: [Format; 4] = [Format::Json, Format::Xml, Format::Yaml, Format::Csv];

    /// Lowercase tag used on the wire and in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Csv => "csv",
        }
    }

    /// Maps a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "xml" => Some(Format::Xml),
            "yaml" | "yml" => Some(Format::Yaml),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }

    /// Returns the parser for this format, configured from `config`.
    pub fn parser(&self, config: &Config) -> Box<dyn FormatParser> {
        match self {
            Format::Json => Box::new(JsonParser),
            Format::Xml => Box::new(XmlParser),
            Format::Yaml => Box::new(YamlParser),
            Format::Csv => Box::new(CsvParser::new(config.cell_sanitizer())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A format tag that names no supported format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported input type: {0}")]
pub struct UnknownFormat(pub String);

impl TryFrom<String> for Format {
    type Error = UnknownFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "yaml" | "yml" => Ok(Format::Yaml),
            "csv" => Ok(Format::Csv),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// A document could not be parsed.
#[derive(Debug, Error)]
#[error("{format} parse error: {message}")]
pub struct ParseError {
    /// Format the parser was reading.
    pub format: Format,
    /// Human-readable reason.
    pub message: String,
    /// Underlying error from a lower-level parser, when there is one.
    #[source]
    pub cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ParseError {
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause<E>(format: Format, message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            format,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}

/// Converts one textual document into a canonical value.
pub trait FormatParser {
    /// The format this parser reads.
    fn format(&self) -> Format;

    /// Parses `text` into a canonical value.
    fn parse(&self, text: &str) -> Result<Value, ParseError>;
}

/// Parses `text` as `format`.
pub fn parse_one(format: Format, text: &str, config: &Config) -> Result<Value, ParseError> {
    debug!(format = %format, bytes = text.len(), "parsing input");
    format.parser(config).parse(text)
}
