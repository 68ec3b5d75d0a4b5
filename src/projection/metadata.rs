//! Truncation and depth bookkeeping for a projection call.

use crate::document::node::Value;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// Reserved object key holding a [`TruncationNote`] in projected output.
///
/// The key and the note's field names are stable across releases.
pub const SIDECAR_KEY: &str = "__meta";

/// Qualifier used for a truncated leaf that has no enclosing container.
pub const ROOT_QUALIFIER: &str = "root";

/// Events recorded during one projection call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionMetadata {
    /// At least one leaf was cut to the array cap.
    pub truncated: bool,
    /// Qualifiers of every truncated leaf, in first-seen order.
    pub truncated_fields: IndexSet<String>,
    /// Part of the template lay beyond the depth cap.
    pub max_depth_reached: bool,
}

impl ProjectionMetadata {
    pub(crate) fn record_truncation(&mut self, qualifier: &str) {
        self.truncated = true;
        self.truncated_fields.insert(qualifier.to_string());
    }
}

/// Truncation record embedded next to the leaf it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncationNote {
    pub truncated: bool,
    pub truncated_field: String,
    pub returned_items: usize,
}

impl TruncationNote {
    pub fn new(field: &str, returned_items: usize) -> Self {
        Self {
            truncated: true,
            truncated_field: field.to_string(),
            returned_items,
        }
    }

    /// Converts the note to the object stored under [`SIDECAR_KEY`].
    pub fn to_value(&self) -> Value {
        let mut map = IndexMap::new();
        map.insert("truncated".to_string(), Value::Boolean(self.truncated));
        map.insert(
            "truncatedField".to_string(),
            Value::String(self.truncated_field.clone()),
        );
        map.insert(
            "returnedItems".to_string(),
            Value::from(i64::try_from(self.returned_items).unwrap_or(i64::MAX)),
        );
        Value::Object(map)
    }
}
