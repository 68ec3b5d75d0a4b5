//! Heuristic check that a payload is text rather than binary data.

/// Number of leading characters inspected.
pub const SAMPLE_CHARS: usize = 1000;

/// Threshold used when the configured one is not a ratio strictly between 0 and 1.
pub const DEFAULT_THRESHOLD: f64 = 0.05;

/// Returns `threshold` if it is a usable ratio, otherwise [`DEFAULT_THRESHOLD`].
pub fn effective_threshold(threshold: f64) -> f64 {
    if threshold.is_finite() && threshold > 0.0 && threshold < 1.0 {
        threshold
    } else {
        DEFAULT_THRESHOLD
    }
}

/// Returns true when the share of control characters in the first
/// [`SAMPLE_CHARS`] characters of `text` stays below `threshold`.
///
/// Tab, line feed, vertical tab, form feed and carriage return count as
/// printable. Empty text is text. A `threshold` outside `(0, 1)` falls back
/// to [`DEFAULT_THRESHOLD`].
pub fn is_likely_text(text: &str, threshold: f64) -> bool {
    let threshold = effective_threshold(threshold);
    let mut total = 0usize;
    let mut nonprintable = 0usize;
    for ch in text.chars().take(SAMPLE_CHARS) {
        total += 1;
        let code = ch as u32;
        if code < 9 || (code > 13 && code < 32) {
            nonprintable += 1;
        }
    }

    if total == 0 {
        return true;
    }
    (nonprintable as f64 / total as f64) < threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_regular_text() {
        assert!(is_likely_text("Hello, world!", 0.05));
        assert!(is_likely_text("こんにちは世界", 0.05));
        assert!(is_likely_text("a\tb\r\nc", 0.05));
        assert!(is_likely_text("", 0.05));
    }

    #[test]
    fn test_rejects_binary_like_payloads() {
        assert!(!is_likely_text("\u{0}\u{1}\u{2}\u{3}binary", 0.05));
    }

    #[test]
    fn test_unusable_threshold_falls_back_to_default() {
        for threshold in [0.0, -1.0, 1.0, 7.5, f64::NAN, f64::INFINITY] {
            assert_eq!(effective_threshold(threshold), DEFAULT_THRESHOLD);
            assert!(is_likely_text("{\"a\":1}", threshold));
            assert!(!is_likely_text("\u{0}\u{1}\u{2}\u{3}binary", threshold));
        }
        assert_eq!(effective_threshold(0.2), 0.2);
    }

    #[test]
    fn test_only_sample_is_inspected() {
        let text = format!("{}{}", "a".repeat(SAMPLE_CHARS), "\u{1}".repeat(500));
        assert!(is_likely_text(&text, 0.05));
    }
}
