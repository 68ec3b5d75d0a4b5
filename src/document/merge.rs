//! Structural merge of canonical documents.
//!
//! Containers compose: arrays concatenate and objects merge key by key,
//! recursing where both sides hold a value for the same key. Anywhere the two
//! sides disagree on shape, the source value replaces the target value.
//! Neither argument is ever mutated; the result owns fresh copies of
//! everything it contains.

use super::node::Value;

/// Merges `source` into `target` and returns the combined document.
///
/// # Example
///
/// ```
/// use unifio::document::merge::merge;
/// use unifio::document::node::Value;
///
/// let a: Value = serde_json::from_str(r#"{"user":{"name":"Alice"},"tags":["x"]}"#).unwrap();
/// let b: Value = serde_json::from_str(r#"{"user":{"age":30},"tags":["y"]}"#).unwrap();
///
/// let merged = merge(&a, &b);
/// assert_eq!(
///     serde_json::to_string(&merged).unwrap(),
///     r#"{"user":{"name":"Alice","age":30},"tags":["x","y"]}"#
/// );
/// ```
pub fn merge(target: &Value, source: &Value) -> Value {
    merge_owned(target.clone(), source)
}

/// Left-folds a sequence of documents into one.
///
/// The first document seeds the accumulator and each following document is
/// merged in as the source, in order. An empty sequence yields `Value::Null`.
pub fn merge_all<'a, I>(documents: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut documents = documents.into_iter();
    let Some(first) = documents.next() else {
        return Value::Null;
    };

    documents.fold(first.clone(), merge_owned)
}

/// Merges into an accumulator the caller already owns, avoiding a re-clone of
/// the target side at every level.
fn merge_owned(target: Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Array(mut items), Value::Array(more)) => {
            items.extend(more.iter().cloned());
            Value::Array(items)
        }
        (Value::Object(mut map), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match map.get_mut(key) {
                    Some(existing) => {
                        let current = std::mem::take(existing);
                        *existing = merge_owned(current, value);
                    }
                    None => {
                        map.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(map)
        }
        (_, source) => source.clone(),
    }
}
