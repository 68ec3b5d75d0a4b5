//! Error type for malformed path expressions.

use thiserror::Error;

/// A path expression could not be tokenized.
///
/// Only the path text itself can be wrong; a well-formed path that matches
/// nothing is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path '{path}': {message}")]
pub struct PathSyntaxError {
    /// The path text as supplied.
    pub path: String,
    /// What was wrong with it.
    pub message: String,
}

impl PathSyntaxError {
    pub fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
