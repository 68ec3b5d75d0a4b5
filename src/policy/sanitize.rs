//! Spreadsheet formula neutralization for CSV cells.

/// Leading characters that make spreadsheet applications evaluate a cell.
pub const DANGEROUS_PREFIXES: [char; 4] = ['=', '+', '-', '@'];

/// Prefixes a cell with `'` when it would otherwise be read as a formula.
///
/// # Example
///
/// ```
/// use unifio::policy::sanitize::neutralize_formula;
///
/// assert_eq!(neutralize_formula("=SUM(A1:A1)"), "'=SUM(A1:A1)");
/// assert_eq!(neutralize_formula("plain"), "plain");
/// ```
pub fn neutralize_formula(value: &str) -> String {
    match value.chars().next() {
        Some(first) if DANGEROUS_PREFIXES.contains(&first) => format!("'{}", value),
        _ => value.to_string(),
    }
}
