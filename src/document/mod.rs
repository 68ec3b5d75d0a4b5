//! Canonical document model and merging.

pub mod merge;
pub mod node;

pub use merge::{merge, merge_all};
pub use node::{Number, Value};
