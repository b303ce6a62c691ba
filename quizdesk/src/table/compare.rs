use crate::table::column::ColumnType;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Leading numeric literal, accepted the same way a browser's `parseFloat` does
fn numeric_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("numeric prefix pattern is valid")
    })
}

/// Parse a cell as a number, reading the longest numeric prefix.
///
/// `"12.5 pts"` reads as `12.5`; text without a numeric prefix (including the
/// empty string) reads as `0.0`.
pub fn parse_numeric(value: &str) -> f64 {
    let trimmed = value.trim_start();
    numeric_prefix()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| !n.is_nan())
        .unwrap_or(0.0)
}

/// Compare two cell texts under the declared column type
pub fn compare_cells(a: &str, b: &str, column_type: ColumnType) -> Ordering {
    match column_type {
        ColumnType::Number => {
            let a = parse_numeric(a);
            let b = parse_numeric(b);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        ColumnType::Text => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Compare optional cell texts; a missing cell reads as the empty string
pub fn compare_optional_cells(a: Option<&str>, b: Option<&str>, column_type: ColumnType) -> Ordering {
    compare_cells(a.unwrap_or(""), b.unwrap_or(""), column_type)
}
