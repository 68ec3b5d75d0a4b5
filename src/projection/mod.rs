//! Template-driven reshaping of a merged document.
//!
//! A template is a [`Value`] whose string leaves are path expressions. The
//! projection walks the template, evaluates every string leaf against the
//! document and builds an output of the same shape. Other scalars pass
//! through unchanged.
//!
//! Two limits bound the walk. Template nodes deeper than the depth cap become
//! `null`. A leaf matching more values than the array cap is cut down to the
//! cap; the cut is recorded in the returned [`ProjectionMetadata`] and, when
//! the leaf sits in an object, in a [`TruncationNote`] stored under the
//! reserved [`SIDECAR_KEY`] of that object.
//!
//! # Example
//!
//! ```
//! use unifio::config::Config;
//! use unifio::document::node::Value;
//! use unifio::projection::project;
//!
//! let doc: Value = serde_json::from_str(r#"{"user":{"name":"Bob","age":42}}"#).unwrap();
//! let template: Value = serde_json::from_str(r#"{"name":"$.user.name"}"#).unwrap();
//!
//! let projection = project(&template, &doc, &Config::default());
//! assert_eq!(serde_json::to_string(&projection.value).unwrap(), r#"{"name":"Bob"}"#);
//! assert!(!projection.metadata.truncated);
//! assert!(!projection.metadata.max_depth_reached);
//! ```

pub mod metadata;

pub use metadata::{ProjectionMetadata, TruncationNote, ROOT_QUALIFIER, SIDECAR_KEY};

use crate::config::Config;
use crate::document::node::Value;
use crate::jsonpath;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

/// Output of one projection call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// The shaped document.
    pub value: Value,
    /// Truncation and depth events seen while shaping it.
    pub metadata: ProjectionMetadata,
}

/// Shapes `document` according to `template`.
///
/// Never fails: malformed paths inside the template produce `null` leaves.
pub fn project(template: &Value, document: &Value, config: &Config) -> Projection {
    let mut projector = Projector {
        document,
        depth_cap: config.depth_cap,
        array_cap: config.array_cap,
        metadata: ProjectionMetadata::default(),
    };
    let (shaped, _) = projector.walk(template, 0, ROOT_QUALIFIER);

    Projection {
        value: shaped.into_value(),
        metadata: projector.metadata,
    }
}

/// Output tree under construction.
///
/// A container that holds a truncated leaf is wrapped in `Annotated`; the
/// note is lowered into the container when converting to a [`Value`].
#[derive(Debug)]
enum Shaped {
    Leaf(Value),
    List(Vec<Shaped>),
    Map(IndexMap<String, Shaped>),
    Annotated {
        container: Box<Shaped>,
        note: TruncationNote,
    },
}

impl Shaped {
    fn into_value(self) -> Value {
        match self {
            Shaped::Leaf(value) => value,
            Shaped::List(items) => Value::Array(items.into_iter().map(Shaped::into_value).collect()),
            Shaped::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, shaped)| (key, shaped.into_value()))
                    .collect(),
            ),
            Shaped::Annotated { container, note } => match container.into_value() {
                Value::Object(mut map) => {
                    map.insert(SIDECAR_KEY.to_string(), note.to_value());
                    Value::Object(map)
                }
                // A list has nowhere to hold the note; it stays in the metadata.
                other => other,
            },
        }
    }

    fn annotate(self, note: Option<TruncationNote>) -> Shaped {
        match note {
            Some(note) => Shaped::Annotated {
                container: Box::new(self),
                note,
            },
            None => self,
        }
    }
}

struct Projector<'a> {
    document: &'a Value,
    depth_cap: usize,
    array_cap: usize,
    metadata: ProjectionMetadata,
}

impl Projector<'_> {
    /// Shapes one template node.
    ///
    /// `qualifier` names the node within its enclosing container. A returned
    /// note is meant for that enclosing container.
    fn walk(&mut self, template: &Value, depth: usize, qualifier: &str) -> (Shaped, Option<TruncationNote>) {
        if depth > self.depth_cap {
            if !self.metadata.max_depth_reached {
                warn!(depth_cap = self.depth_cap, "template exceeds depth cap, deeper nodes are null");
            }
            self.metadata.max_depth_reached = true;
            return (Shaped::Leaf(Value::Null), None);
        }

        match template {
            Value::String(path) => self.resolve(path, qualifier),
            Value::Array(items) => {
                let mut note = None;
                let mut shaped = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let (child, child_note) = self.walk(item, depth + 1, &index.to_string());
                    shaped.push(child);
                    note = child_note.or(note);
                }
                (Shaped::List(shaped).annotate(note), None)
            }
            Value::Object(entries) => {
                let mut note = None;
                let mut shaped = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    let (child, child_note) = self.walk(item, depth + 1, key);
                    shaped.insert(key.clone(), child);
                    note = child_note.or(note);
                }
                (Shaped::Map(shaped).annotate(note), None)
            }
            scalar => (Shaped::Leaf(scalar.clone()), None),
        }
    }

    /// Evaluates a path leaf and applies the array cap.
    fn resolve(&mut self, path: &str, qualifier: &str) -> (Shaped, Option<TruncationNote>) {
        let matches = match jsonpath::evaluate(self.document, path) {
            Ok(matches) => matches,
            Err(err) => {
                debug!(field = qualifier, error = %err, "malformed path in template, using null");
                return (Shaped::Leaf(Value::Null), None);
            }
        };

        match matches.len() {
            0 => (Shaped::Leaf(Value::Null), None),
            1 => (Shaped::Leaf(matches[0].clone()), None),
            total if total <= self.array_cap => (
                Shaped::Leaf(Value::Array(matches.into_iter().cloned().collect())),
                None,
            ),
            total => {
                let kept: Vec<Value> = matches.into_iter().take(self.array_cap).cloned().collect();
                warn!(
                    field = qualifier,
                    total,
                    returned = kept.len(),
                    "output truncated: {} capped at {} items",
                    qualifier,
                    self.array_cap
                );
                self.metadata.record_truncation(qualifier);
                let note = TruncationNote::new(qualifier, kept.len());
                (Shaped::Leaf(Value::Array(kept)), Some(note))
            }
        }
    }
}
