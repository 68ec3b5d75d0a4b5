//! End-to-end combination of several inputs into one document.
//!
//! A [`CombineRequest`] lists inputs (a format tag and the raw text) and an
//! optional output template. [`combine`] checks the request, parses every
//! input, folds the documents together in order and, when a template is
//! given, projects the merged document through it.
//!
//! # Example
//!
//! ```
//! use unifio::combine::{combine, CombineRequest, Input};
//! use unifio::config::Config;
//! use unifio::converters::Format;
//!
//! let request = CombineRequest::new(vec![
//!     Input::new(Format::Json, r#"{"user":{"name":"Alice"}}"#),
//!     Input::new(Format::Xml, "<profile><age>30</age></profile>"),
//! ]);
//!
//! let response = combine(&request, &Config::default()).unwrap();
//! assert_eq!(
//!     serde_json::to_string(&response.result).unwrap(),
//!     r#"{"user":{"name":"Alice"},"profile":{"age":"30"}}"#
//! );
//! ```

use crate::config::Config;
use crate::converters::{parse_one, Format, ParseError};
use crate::document::merge::merge_all;
use crate::document::node::Value;
use crate::policy::encoding::is_likely_text;
use crate::projection::{project, ProjectionMetadata};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// One document to combine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Format tag; matched case-insensitively, `yml` is accepted for YAML.
    #[serde(rename = "type")]
    pub format: Format,
    /// Raw document text.
    pub data: String,
}

impl Input {
    pub fn new(format: Format, data: impl Into<String>) -> Self {
        Self {
            format,
            data: data.into(),
        }
    }
}

/// Inputs to merge plus an optional output template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineRequest {
    pub inputs: Vec<Input>,
    /// Template whose string leaves are path expressions; must be an object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<Value>,
}

impl CombineRequest {
    pub fn new(inputs: Vec<Input>) -> Self {
        Self {
            inputs,
            output_format: None,
        }
    }

    pub fn with_template(mut self, template: Value) -> Self {
        self.output_format = Some(template);
        self
    }
}

/// Result of a successful combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombineResponse {
    /// Merged document, projected when a template was given.
    pub result: Value,
    /// Projection bookkeeping; absent without a template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProjectionMetadata>,
}

/// Reasons a combination request is rejected.
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("Invalid input: inputs must not be empty")]
    NoInputs,
    #[error("Invalid input: output_format must be an object")]
    TemplateNotObject,
    #[error("Invalid input: inputs[{index}] does not look like text")]
    BinaryInput { index: usize },
    #[error("Failed to parse inputs[{index}] ({format}): {}", .source.message)]
    Parse {
        index: usize,
        format: Format,
        #[source]
        source: ParseError,
    },
}

/// Validates, parses, merges and optionally projects the request's inputs.
pub fn combine(request: &CombineRequest, config: &Config) -> Result<CombineResponse, CombineError> {
    validate(request, config)?;

    let mut documents = Vec::with_capacity(request.inputs.len());
    for (index, input) in request.inputs.iter().enumerate() {
        let document = parse_one(input.format, &input.data, config).map_err(|source| CombineError::Parse {
            index,
            format: input.format,
            source,
        })?;
        debug!(index, format = %input.format, kind = document.kind(), "input parsed");
        documents.push(document);
    }

    let merged = merge_all(&documents);

    Ok(match &request.output_format {
        Some(template) => {
            let projection = project(template, &merged, config);
            CombineResponse {
                result: projection.value,
                metadata: Some(projection.metadata),
            }
        }
        None => CombineResponse {
            result: merged,
            metadata: None,
        },
    })
}

fn validate(request: &CombineRequest, config: &Config) -> Result<(), CombineError> {
    if request.inputs.is_empty() {
        return Err(CombineError::NoInputs);
    }
    if matches!(&request.output_format, Some(template) if !template.is_object()) {
        return Err(CombineError::TemplateNotObject);
    }
    for (index, input) in request.inputs.iter().enumerate() {
        if !is_likely_text(&input.data, config.nonprintable_threshold) {
            return Err(CombineError::BinaryInput { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_request_deserializes_from_wire_form() {
        let request: CombineRequest = serde_json::from_str(
            r#"{"inputs":[{"type":"YAML","data":"a: 1"}],"output_format":{"x":"$.a"}}"#,
        )
        .unwrap();
        assert_eq!(request.inputs[0].format, Format::Yaml);
        assert_eq!(request.output_format, Some(json(r#"{"x":"$.a"}"#)));
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let err = combine(&CombineRequest::new(vec![]), &Config::default()).unwrap_err();
        assert!(matches!(err, CombineError::NoInputs));
    }

    #[test]
    fn test_rejects_non_object_template() {
        let request = CombineRequest::new(vec![Input::new(Format::Json, "{}")])
            .with_template(json(r#"["$.a"]"#));
        let err = combine(&request, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: output_format must be an object");
    }

    #[test]
    fn test_rejects_binary_payload() {
        let request = CombineRequest::new(vec![
            Input::new(Format::Json, "{}"),
            Input::new(Format::Csv, "\u{0}\u{1}\u{2}\u{3}binary"),
        ]);
        let err = combine(&request, &Config::default()).unwrap_err();
        assert!(matches!(err, CombineError::BinaryInput { index: 1 }));
    }

    #[test]
    fn test_unusable_threshold_still_accepts_text() {
        for setting in ["nonprintable_threshold = 0.0", "nonprintable_threshold = -0.5", "nonprintable_threshold = nan"] {
            let config: Config = toml::from_str(setting).unwrap();
            let request = CombineRequest::new(vec![Input::new(Format::Json, r#"{"a":1}"#)]);
            let response = combine(&request, &config).unwrap();
            assert_eq!(response.result, json(r#"{"a":1}"#));
        }
    }

    #[test]
    fn test_parse_failure_names_input() {
        let request = CombineRequest::new(vec![
            Input::new(Format::Json, "{}"),
            Input::new(Format::Xml, "<a><b></a>"),
        ]);
        let err = combine(&request, &Config::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse inputs[1] (xml): mismatched closing tag: a"
        );
    }

    #[test]
    fn test_template_projection_returns_metadata() {
        let request = CombineRequest::new(vec![
            Input::new(Format::Json, r#"{"user":{"name":"Bob","age":42}}"#),
        ])
        .with_template(json(r#"{"name":"$.user.name"}"#));
        let response = combine(&request, &Config::default()).unwrap();
        assert_eq!(response.result, json(r#"{"name":"Bob"}"#));
        assert_eq!(response.metadata, Some(ProjectionMetadata::default()));
    }

    #[test]
    fn test_csv_cells_sanitized_by_default() {
        let request = CombineRequest::new(vec![Input::new(Format::Csv, "col\n=SUM(A1:A1)\nplain")]);
        let response = combine(&request, &Config::default()).unwrap();
        assert_eq!(
            response.result,
            json(r#"{"rows":[{"col":"'=SUM(A1:A1)"},{"col":"plain"}]}"#)
        );
        assert!(response.metadata.is_none());
    }
}
