//! Column-level missing value operations.
//!
//! Marker normalization, numeric coercion and median imputation for a
//! single column. The resolver composes them over a whole table.

use crate::cleaner::strip_trailing_delimiter;
use crate::error::{CleaningError, Result};
use crate::table::{Column, ColumnData};
use crate::utils::{count_absent, is_absent_token, median_present, parse_numeric_cell};

/// Replace `NA` tokens in a text column with the absent marker.
///
/// Returns the column and the number of tokens replaced. Numeric columns
/// already use the absent marker and are returned untouched.
pub(crate) fn normalize_markers(column: Column) -> (Column, usize) {
    let (name, data) = column.into_parts();
    match data {
        ColumnData::Text(values) => {
            let mut replaced = 0;
            let normalized: Vec<Option<String>> = values
                .into_iter()
                .map(|opt_val| match opt_val {
                    Some(val) if is_absent_token(&val) => {
                        replaced += 1;
                        None
                    }
                    other => other,
                })
                .collect();
            (Column::text(name, normalized), replaced)
        }
        numeric @ ColumnData::Numeric(_) => (Column::from_data(name, numeric), 0),
    }
}

/// Reinterpret a text column as numeric.
///
/// When `required` is set, one trailing delimiter is stripped from each cell
/// before parsing, so the check holds even when resolution runs ahead of the
/// sanitizer. A present cell that is still not a finite number is a
/// [`CleaningError::MalformedInput`]. Otherwise such a column, or one without
/// any present cell, is returned unchanged as text.
///
/// Returns the column and whether it was coerced.
pub(crate) fn coerce_to_numeric(column: Column, required: bool) -> Result<(Column, bool)> {
    let values = match column.as_text() {
        Some(values) => values,
        None => return Ok((column, false)),
    };

    if !required && values.iter().all(Option::is_none) {
        return Ok((column, false));
    }

    let mut parsed = Vec::with_capacity(values.len());
    for (row_idx, opt_val) in values.iter().enumerate() {
        match opt_val {
            None => parsed.push(None),
            Some(val) => {
                let cell = if required {
                    strip_trailing_delimiter(val)
                } else {
                    val.as_str()
                };
                match parse_numeric_cell(cell) {
                    Some(number) => parsed.push(Some(number)),
                    None if required => {
                        return Err(CleaningError::malformed(
                            column.name(),
                            format!("token '{}' at row {} is not numeric", val, row_idx + 1),
                        ));
                    }
                    None => return Ok((column, false)),
                }
            }
        }
    }

    Ok((Column::numeric(column.name(), parsed), true))
}

/// Median of the present values, failing if there are none.
fn required_median(name: &str, values: &[Option<f64>]) -> Result<f64> {
    median_present(values).ok_or_else(|| {
        CleaningError::data_quality(name, "median is undefined: every value is absent")
    })
}

/// Fill the absent cells of a numeric column with the median of its present
/// values.
///
/// A column without absent cells is returned as-is, even when it is empty.
/// A column whose cells are all absent is a [`CleaningError::DataQuality`].
///
/// Returns the dense values and the number of cells filled.
pub(crate) fn fill_with_median(name: &str, values: &[Option<f64>]) -> Result<(Vec<f64>, usize)> {
    let missing = count_absent(values);
    if missing == 0 {
        return Ok((values.iter().flatten().copied().collect(), 0));
    }

    let median = required_median(name, values)?;
    let filled = values.iter().map(|v| v.unwrap_or(median)).collect();
    Ok((filled, missing))
}

/// Apply median imputation to a numeric column.
///
/// Text columns are returned untouched with a count of zero.
pub(crate) fn impute_median(column: Column) -> Result<(Column, usize)> {
    let (filled, count) = match column.as_numeric() {
        Some(values) => fill_with_median(column.name(), values)?,
        None => return Ok((column, 0)),
    };

    if count == 0 {
        return Ok((column, 0));
    }
    Ok((Column::dense(column.name(), filled), count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;

    #[test]
    fn test_normalize_markers_is_case_sensitive() {
        let column = Column::text("t", [Some("NA"), Some("na"), Some("x"), None]);
        let (normalized, replaced) = normalize_markers(column);

        assert_eq!(replaced, 1);
        assert_eq!(
            normalized.as_text().unwrap(),
            &[None, Some("na".to_string()), Some("x".to_string()), None]
        );
    }

    #[test]
    fn test_coerce_numeric_text() {
        let column = Column::text("t", [Some("1"), None, Some(" 2.5")]);
        let (coerced, changed) = coerce_to_numeric(column, false).unwrap();

        assert!(changed);
        assert_eq!(coerced.as_numeric().unwrap(), &[Some(1.0), None, Some(2.5)]);
    }

    #[test]
    fn test_coerce_optional_keeps_text() {
        let column = Column::text("t", [Some("1"), Some("two")]);
        let (kept, changed) = coerce_to_numeric(column.clone(), false).unwrap();
        assert!(!changed);
        assert_eq!(kept, column);

        let empty = Column::text::<String>("t", [None, None]);
        let (kept, changed) = coerce_to_numeric(empty, false).unwrap();
        assert!(!changed);
        assert_eq!(kept.kind(), ColumnKind::Text);
    }

    #[test]
    fn test_coerce_required_fails_on_bad_token() {
        let column = Column::text("pulse", [Some("60"), Some("6O")]);
        let err = coerce_to_numeric(column, true).unwrap_err();

        assert_eq!(err.error_code(), "MALFORMED_INPUT");
        assert!(err.to_string().contains("'6O' at row 2"));
    }

    #[test]
    fn test_coerce_required_strips_one_trailing_delimiter() {
        let column = Column::text("bpm", [Some("72;"), None, Some("75")]);
        let (coerced, changed) = coerce_to_numeric(column, true).unwrap();
        assert!(changed);
        assert_eq!(coerced.as_numeric().unwrap(), &[Some(72.0), None, Some(75.0)]);

        let doubled = Column::text("bpm", [Some("72;;")]);
        let err = coerce_to_numeric(doubled, true).unwrap_err();
        assert!(err.to_string().contains("'72;;' at row 1"));
    }

    #[test]
    fn test_coerce_optional_leaves_delimited_text() {
        let column = Column::text("label", [Some("1;"), Some("0;")]);
        let (kept, changed) = coerce_to_numeric(column.clone(), false).unwrap();
        assert!(!changed);
        assert_eq!(kept, column);
    }

    #[test]
    fn test_coerce_required_accepts_all_absent() {
        let column = Column::text::<String>("pulse", [None, None]);
        let (coerced, changed) = coerce_to_numeric(column, true).unwrap();
        assert!(changed);
        assert_eq!(coerced.kind(), ColumnKind::Numeric);
        assert_eq!(coerced.absent_count(), 2);
    }

    #[test]
    fn test_fill_with_median() {
        let (filled, count) = fill_with_median("B", &[Some(5.0), None, Some(7.0), Some(8.0)]).unwrap();
        assert_eq!(count, 1);
        assert_eq!(filled, vec![5.0, 7.0, 7.0, 8.0]);
    }

    #[test]
    fn test_fill_with_median_all_absent() {
        let err = fill_with_median("B", &[None, None]).unwrap_err();
        assert!(err.is_data_quality());

        // Nothing to fill, nothing to compute
        let (filled, count) = fill_with_median("B", &[]).unwrap();
        assert!(filled.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn test_impute_median_skips_text() {
        let column = Column::text::<String>("t", [None]);
        let (same, count) = impute_median(column.clone()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(same, column);
    }
}
