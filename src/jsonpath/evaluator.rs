use super::ast::PathToken;
use crate::document::node::Value;

/// Evaluates parsed path tokens against a document.
pub struct Evaluator<'a> {
    root: &'a Value,
}

impl<'a> Evaluator<'a> {
    pub fn new(root: &'a Value) -> Self {
        Evaluator { root }
    }

    /// Threads the match set through `tokens`, starting from the root.
    ///
    /// Matches that cannot take a step (wrong type, missing key, index out of
    /// range) are dropped silently. The result keeps derivation order.
    pub fn evaluate(&self, tokens: &[PathToken]) -> Vec<&'a Value> {
        let mut current: Vec<&'a Value> = vec![self.root];

        for token in tokens {
            if current.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for node in &current {
                self.evaluate_token(node, token, &mut next);
            }
            current = next;
        }

        current
    }

    fn evaluate_token(&self, node: &'a Value, token: &PathToken, out: &mut Vec<&'a Value>) {
        match token {
            PathToken::Property(name) => {
                if let Some(child) = self.find_child(node, name) {
                    out.push(child);
                }
            }
            PathToken::Index(idx) => {
                if let Some(item) = self.get_array_element(node, *idx) {
                    out.push(item);
                }
            }
            PathToken::Wildcard => {
                if let Value::Array(items) = node {
                    out.extend(items.iter());
                }
            }
        }
    }

    fn find_child(&self, node: &'a Value, name: &str) -> Option<&'a Value> {
        match node {
            Value::Object(props) => props.get(name),
            _ => None,
        }
    }

    fn get_array_element(&self, node: &'a Value, idx: isize) -> Option<&'a Value> {
        if let Value::Array(items) = node {
            let len = items.len() as isize;
            let normalized_idx = if idx < 0 { len + idx } else { idx };

            if normalized_idx >= 0 && (normalized_idx as usize) < items.len() {
                return Some(&items[normalized_idx as usize]);
            }
        }
        None
    }
}
