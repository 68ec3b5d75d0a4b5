//! XML parsing into canonical values.
//!
//! Parsing happens in two passes. The tokenizer splits the input into start,
//! end, self-closing and text tokens, dropping comments, processing
//! instructions and DOCTYPE declarations on the way; entity references other
//! than the predefined five and numeric character references are rejected, so
//! nothing is ever expanded from a DTD. The tree builder then drives a stack of
//! open elements and converts the finished tree to a [`Value`]:
//!
//! - an element with no text and no child elements becomes `{}`
//! - an element with only text becomes that text (runs trimmed, joined by a space)
//! - child elements become a map keyed by tag name; a repeated tag becomes a list
//! - text mixed with child elements is kept under `_text`
//! - each attribute `k` appears as `@k`; a non-map value is then moved under `_value`
//!
//! Several top-level elements are combined exactly like repeated children.

use super::{Format, FormatParser, ParseError};
use crate::document::node::Value;
use indexmap::IndexMap;

/// Key under which text mixed with child elements is stored.
pub const TEXT_KEY: &str = "_text";
/// Key under which a text value is stored when its element also has attributes.
pub const VALUE_KEY: &str = "_value";
/// Prefix applied to attribute names.
pub const ATTRIBUTE_PREFIX: char = '@';
/// Deepest element nesting accepted.
pub const MAX_NESTING: usize = 256;

/// Parses XML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl FormatParser for XmlParser {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn parse(&self, text: &str) -> Result<Value, ParseError> {
        let tokens = Tokenizer::new(text).tokenize()?;
        let roots = build_tree(tokens)?;

        let mut map = IndexMap::new();
        for root in roots {
            let name = root.name.clone();
            let value = root.into_value(1)?;
            insert_child(&mut map, name, value);
        }
        Ok(Value::Object(map))
    }
}

fn error(message: impl Into<String>) -> ParseError {
    ParseError::new(Format::Xml, message)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Start {
        name: String,
        attributes: IndexMap<String, String>,
    },
    End {
        name: String,
    },
    SelfClosing {
        name: String,
        attributes: IndexMap<String, String>,
    },
    Text(String),
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.skip_past("-->", 4, "unterminated comment")?;
            } else if let Some(body) = rest.strip_prefix("<![CDATA[") {
                let end = body
                    .find("]]>")
                    .ok_or_else(|| error("unterminated CDATA section"))?;
                tokens.push(Token::Text(body[..end].to_string()));
                self.pos += "<![CDATA[".len() + end + "]]>".len();
            } else if rest.starts_with("<?") {
                self.skip_past("?>", 2, "unterminated processing instruction")?;
            } else if rest.starts_with("<!") {
                self.skip_declaration()?;
            } else if let Some(body) = rest.strip_prefix("</") {
                let end = body.find('>').ok_or_else(|| error("unterminated tag"))?;
                let name = body[..end].trim();
                if !is_valid_name(name) {
                    return Err(error(format!("invalid closing tag: </{}>", name)));
                }
                tokens.push(Token::End {
                    name: name.to_string(),
                });
                self.pos += 2 + end + 1;
            } else if rest.starts_with('<') {
                tokens.push(self.read_tag()?);
            } else {
                let end = rest.find('<').unwrap_or(rest.len());
                tokens.push(Token::Text(decode_entities(&rest[..end])?));
                self.pos += end;
            }
        }

        Ok(tokens)
    }

    /// Advances past the next `terminator`, searching after the `skip` opening bytes.
    fn skip_past(&mut self, terminator: &str, skip: usize, message: &str) -> Result<(), ParseError> {
        let end = self.rest()[skip..]
            .find(terminator)
            .ok_or_else(|| error(message))?;
        self.pos += skip + end + terminator.len();
        Ok(())
    }

    /// Skips `<!DOCTYPE ...>` including any internal `[...]` subset.
    fn skip_declaration(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        for (offset, ch) in self.rest().char_indices().skip(2) {
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '[') => depth += 1,
                (None, ']') => depth = depth.saturating_sub(1),
                (None, '>') if depth == 0 => {
                    self.pos += offset + 1;
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(error("unterminated declaration"))
    }

    /// Reads a start or self-closing tag, including its attributes.
    fn read_tag(&mut self) -> Result<Token, ParseError> {
        let rest = self.rest();
        let mut chars = rest.char_indices().skip(1).peekable();

        let mut name = String::new();
        while let Some(&(_, ch)) = chars.peek() {
            if ch.is_whitespace() || ch == '/' || ch == '>' {
                break;
            }
            name.push(ch);
            chars.next();
        }
        if !is_valid_name(&name) {
            return Err(error(format!("invalid tag name: <{}", name)));
        }

        let mut attributes = IndexMap::new();
        loop {
            while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
                chars.next();
            }
            match chars.next() {
                None => return Err(error(format!("unterminated tag: <{}", name))),
                Some((offset, '>')) => {
                    self.pos += offset + 1;
                    return Ok(Token::Start { name, attributes });
                }
                Some((_, '/')) => match chars.next() {
                    Some((offset, '>')) => {
                        self.pos += offset + 1;
                        return Ok(Token::SelfClosing { name, attributes });
                    }
                    _ => return Err(error(format!("malformed tag: <{}", name))),
                },
                Some((_, first)) => {
                    let mut attr = String::from(first);
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() || c == '=' || c == '/' || c == '>' {
                            break;
                        }
                        attr.push(c);
                        chars.next();
                    }
                    while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
                        chars.next();
                    }
                    if !matches!(chars.next(), Some((_, '='))) {
                        return Err(error(format!("attribute without value: {}", attr)));
                    }
                    while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
                        chars.next();
                    }
                    let quote = match chars.next() {
                        Some((_, q @ ('"' | '\''))) => q,
                        _ => return Err(error(format!("unquoted attribute value: {}", attr))),
                    };
                    let mut raw = String::new();
                    loop {
                        match chars.next() {
                            Some((_, c)) if c == quote => break,
                            Some((_, c)) => raw.push(c),
                            None => return Err(error(format!("unterminated tag: <{}", name))),
                        }
                    }
                    attributes.insert(attr, decode_entities(&raw)?);
                }
            }
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'' | '&'))
}

/// Decodes the predefined entities and numeric character references.
fn decode_entities(raw: &str) -> Result<String, ParseError> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| error("unterminated entity reference"))?;
        let entity = &after[..semi];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    return Err(error(format!("unknown entity: &{};", entity)));
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| error(format!("invalid character reference: &{};", entity)))?
            }
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Intermediate element node, private to the parser.
#[derive(Debug)]
struct XmlNode {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<XmlChild>,
}

#[derive(Debug)]
enum XmlChild {
    Text(String),
    Element(XmlNode),
}

impl XmlNode {
    fn new(name: String, attributes: IndexMap<String, String>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    fn into_value(self, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_NESTING {
            return Err(error("maximum nesting depth exceeded"));
        }

        let mut texts = Vec::new();
        let mut elements = Vec::new();
        for child in self.children {
            match child {
                XmlChild::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        texts.push(trimmed.to_string());
                    }
                }
                XmlChild::Element(node) => elements.push(node),
            }
        }
        let text = texts.join(" ");

        let mut map = IndexMap::new();
        for (key, value) in self.attributes {
            map.insert(format!("{}{}", ATTRIBUTE_PREFIX, key), Value::String(value));
        }

        if elements.is_empty() {
            if text.is_empty() {
                return Ok(Value::Object(map));
            }
            if map.is_empty() {
                return Ok(Value::String(text));
            }
            map.insert(VALUE_KEY.to_string(), Value::String(text));
            return Ok(Value::Object(map));
        }

        for element in elements {
            let name = element.name.clone();
            let value = element.into_value(depth + 1)?;
            insert_child(&mut map, name, value);
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        Ok(Value::Object(map))
    }
}

/// Adds a child under `name`, turning repeated names into a list.
fn insert_child(map: &mut IndexMap<String, Value>, name: String, value: Value) {
    // Element values are never lists themselves, so an existing list is an
    // accumulation of earlier siblings.
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::take(existing);
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

fn attach(stack: &mut [XmlNode], roots: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlChild::Element(node)),
        None => roots.push(node),
    }
}

/// Drives the open-element stack over the token stream.
fn build_tree(tokens: Vec<Token>) -> Result<Vec<XmlNode>, ParseError> {
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut roots = Vec::new();

    for token in tokens {
        match token {
            Token::Start { name, attributes } => {
                if stack.len() >= MAX_NESTING {
                    return Err(error("maximum nesting depth exceeded"));
                }
                stack.push(XmlNode::new(name, attributes));
            }
            Token::SelfClosing { name, attributes } => {
                if stack.len() >= MAX_NESTING {
                    return Err(error("maximum nesting depth exceeded"));
                }
                attach(&mut stack, &mut roots, XmlNode::new(name, attributes));
            }
            Token::End { name } => {
                let node = stack
                    .pop()
                    .ok_or_else(|| error(format!("unexpected closing tag: {}", name)))?;
                if node.name != name {
                    return Err(error(format!("mismatched closing tag: {}", name)));
                }
                attach(&mut stack, &mut roots, node);
            }
            Token::Text(text) => match stack.last_mut() {
                Some(parent) => parent.children.push(XmlChild::Text(text)),
                None if text.trim().is_empty() => {}
                None => return Err(error("text outside root element")),
            },
        }
    }

    if !stack.is_empty() {
        return Err(error("unmatched tags"));
    }
    Ok(roots)
}
