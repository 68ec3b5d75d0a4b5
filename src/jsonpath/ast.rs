//! Token types for parsed path expressions.

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// Named member (`.name`, `['name']` or `["name"]`)
    Property(String),
    /// Array index (`[0]`, `[-1]`); negative values count from the end
    Index(isize),
    /// Every element of an array (`[*]` or `.*`)
    Wildcard,
}

/// A parsed path expression: the implicit `$` root followed by its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    /// Tokens after the root, in order.
    pub tokens: Vec<PathToken>,
}

impl JsonPath {
    /// Creates a new path with the given tokens.
    pub fn new(tokens: Vec<PathToken>) -> Self {
        Self { tokens }
    }

    /// Returns true when the path is just `$`.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }
}
