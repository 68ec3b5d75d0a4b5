//! Input policies applied around the engine.
//!
//! These are not part of parsing or merging; they decide whether input is
//! accepted and how untrusted cell values are neutralized.

pub mod encoding;
pub mod sanitize;

pub use encoding::{effective_threshold, is_likely_text};
pub use sanitize::neutralize_formula;
