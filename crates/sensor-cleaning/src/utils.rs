//! Shared utilities for the cleaning pipeline.
//!
//! Numeric helpers here operate on plain slices so every stage computes
//! medians and quartiles the same way.

// =============================================================================
// Markers and Parsing
// =============================================================================

/// The literal token recognized as "no value". Matching is exact and
/// case-sensitive.
pub const ABSENT_TOKEN: &str = "NA";

/// Trailing delimiter artifact stripped by the sanitizer.
pub const TRAILING_DELIMITER: char = ';';

/// Check if a raw cell is the absent marker token.
#[inline]
pub fn is_absent_token(s: &str) -> bool {
    s == ABSENT_TOKEN
}

/// Check if a raw cell carries no value at all (empty, whitespace or `NA`).
#[inline]
pub fn is_blank_or_absent(s: &str) -> bool {
    s.trim().is_empty() || is_absent_token(s.trim())
}

/// Try to parse a cell as a finite number.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected so
/// they can never masquerade as measurements.
pub fn parse_numeric_cell(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a number the way it appears when a numeric column is turned into
/// text: integral values keep one decimal (`5.0`), others use `Display`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Sort a copy of the values in ascending order.
fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median of a slice, averaging the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Median of the present values of a nullable column.
pub fn median_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    median(&present)
}

/// Quantile using linear interpolation between closest ranks.
///
/// The position of quantile `q` in the sorted values is `q * (n - 1)`; a
/// fractional position interpolates between its two neighbours.
/// Returns `None` for an empty slice or `q` outside `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let sorted = sorted_copy(values);
    Some(quantile_sorted(&sorted, q))
}

/// Quantile of already sorted, non-empty values.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// First and third quartiles of a slice.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    Some((quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75)))
}

/// Count absent cells in a nullable column.
#[inline]
pub fn count_absent<T>(values: &[Option<T>]) -> usize {
    values.iter().filter(|v| v.is_none()).count()
}

// =============================================================================
// Tests
// =============================================================================
