//! Path expression tokenizer.

use super::ast::{JsonPath, PathToken};
use super::error::PathSyntaxError;

/// Parser for path expression strings.
pub struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given path string.
    pub fn new(path: &'a str) -> Self {
        Self {
            source: path,
            chars: path.chars().collect(),
            position: 0,
        }
    }

    /// Parses the path string into a `JsonPath`.
    pub fn parse(path: &str) -> Result<JsonPath, PathSyntaxError> {
        Parser::new(path).parse_path()
    }

    fn parse_path(&mut self) -> Result<JsonPath, PathSyntaxError> {
        match self.next() {
            Some('$') => {}
            None => return Err(self.error("path is empty")),
            Some(_) => return Err(self.error("path must start with '$'")),
        }

        let mut tokens = Vec::new();
        while let Some(ch) = self.peek() {
            match ch {
                '.' => {
                    self.next();
                    tokens.push(self.parse_dot_segment()?);
                }
                '[' => {
                    self.next();
                    tokens.push(self.parse_bracket_segment()?);
                }
                other => {
                    return Err(self.error(format!(
                        "invalid character '{}' at position {}",
                        other, self.position
                    )))
                }
            }
        }

        Ok(JsonPath::new(tokens))
    }

    fn error(&self, message: impl Into<String>) -> PathSyntaxError {
        PathSyntaxError::new(self.source, message)
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Returns the next character and advances position.
    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.position += 1;
        }
    }

    /// Consumes the closing `]` of a bracket segment.
    fn expect_close(&mut self) -> Result<(), PathSyntaxError> {
        self.skip_whitespace();
        let pos = self.position;
        match self.next() {
            Some(']') => Ok(()),
            Some(ch) => Err(self.error(format!(
                "expected ']' but found '{}' at position {}",
                ch, pos
            ))),
            None => Err(self.error("missing closing bracket")),
        }
    }

    /// Parses what follows a `.`: an identifier or `*`.
    fn parse_dot_segment(&mut self) -> Result<PathToken, PathSyntaxError> {
        match self.peek() {
            Some('*') => {
                self.next();
                Ok(PathToken::Wildcard)
            }
            Some('.') => Err(self.error("recursive descent is not supported")),
            _ => {
                let name = self.parse_identifier();
                if name.is_empty() {
                    Err(self.error(format!("empty property name at position {}", self.position)))
                } else {
                    Ok(PathToken::Property(name))
                }
            }
        }
    }

    /// Parses an identifier (property name).
    fn parse_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '@' {
                name.push(ch);
                self.next();
            } else {
                break;
            }
        }
        name
    }

    /// Parses a bracket segment after its opening `[`: `'key'`, `"key"`, `n` or `*`.
    fn parse_bracket_segment(&mut self) -> Result<PathToken, PathSyntaxError> {
        self.skip_whitespace();

        let token = match self.peek() {
            None => return Err(self.error("unterminated bracket")),
            Some('*') => {
                self.next();
                PathToken::Wildcard
            }
            Some(quote @ ('\'' | '"')) => {
                self.next();
                let name = self.parse_quoted(quote)?;
                if name.is_empty() {
                    return Err(self.error("empty property name"));
                }
                PathToken::Property(name)
            }
            Some('-' | '0'..='9') => PathToken::Index(self.parse_index()?),
            Some(']') => return Err(self.error("empty brackets")),
            Some(other) => {
                return Err(self.error(format!(
                    "invalid character '{}' at position {}",
                    other, self.position
                )))
            }
        };

        self.expect_close()?;
        Ok(token)
    }

    /// Parses the body of a quoted name up to and including the closing quote.
    fn parse_quoted(&mut self, quote: char) -> Result<String, PathSyntaxError> {
        let mut value = String::new();
        loop {
            match self.next() {
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => match self.next() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(ch @ ('\\' | '\'' | '"')) => value.push(ch),
                    Some(other) => {
                        return Err(self.error(format!("invalid escape sequence '\\{}'", other)))
                    }
                    None => return Err(self.error("unterminated quote")),
                },
                Some(ch) => value.push(ch),
                None => return Err(self.error("unterminated quote")),
            }
        }
    }

    /// Parses a signed integer index.
    ///
    /// Out-of-range literals saturate; they select nothing either way.
    fn parse_index(&mut self) -> Result<isize, PathSyntaxError> {
        let mut num = String::new();
        let negative = self.peek() == Some('-');
        if negative {
            num.push('-');
            self.next();
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num.push(ch);
                self.next();
            } else {
                break;
            }
        }
        if num.is_empty() || num == "-" {
            return Err(self.error("expected array index"));
        }
        Ok(num
            .parse::<isize>()
            .unwrap_or(if negative { isize::MIN } else { isize::MAX }))
    }
}
