//! Sanitization functions for text cells.

use crate::table::{Column, ColumnData};
use crate::utils::{TRAILING_DELIMITER, format_number};

/// Strip exactly one trailing delimiter from a cell.
///
/// `"abc;;"` becomes `"abc;"`, not `"abc"`.
#[inline]
pub fn strip_trailing_delimiter(value: &str) -> &str {
    value.strip_suffix(TRAILING_DELIMITER).unwrap_or(value)
}

/// Strip one trailing delimiter from every present cell of a text column.
///
/// Numeric columns are returned untouched. Returns the column and the
/// number of cells that changed.
pub(crate) fn sanitize_column(column: Column) -> (Column, usize) {
    let (name, data) = column.into_parts();
    match data {
        ColumnData::Text(values) => {
            let mut changed = 0;
            let cleaned: Vec<Option<String>> = values
                .into_iter()
                .map(|opt_val| {
                    opt_val.map(|val| {
                        let stripped = strip_trailing_delimiter(&val);
                        if stripped.len() == val.len() {
                            val
                        } else {
                            changed += 1;
                            stripped.to_string()
                        }
                    })
                })
                .collect();
            (Column::text(name, cleaned), changed)
        }
        numeric @ ColumnData::Numeric(_) => (Column::from_data(name, numeric), 0),
    }
}

/// Render a column as text and strip one trailing delimiter from each cell.
///
/// Numeric cells are formatted with [`format_number`]; absent cells stay
/// absent. Text columns are only trimmed.
pub(crate) fn label_as_text(column: Column) -> Column {
    let (name, data) = column.into_parts();
    let rendered: Vec<Option<String>> = match data {
        ColumnData::Numeric(values) => values
            .into_iter()
            .map(|v| v.map(format_number))
            .collect(),
        ColumnData::Text(values) => values,
    };
    let (trimmed, _) = sanitize_column(Column::text(name, rendered));
    trimmed
}
