//! In-memory table model.
//!
//! A [`Table`] is an ordered list of named [`Column`]s that all share the
//! same row count. Each column is either numeric or text; in both cases a
//! cell is an `Option`, with `None` as the absent marker.
//!
//! Numeric columns never store `NaN` or infinities: constructors turn
//! non-finite values into `None`, so no float bit pattern doubles as a
//! missing marker.

use crate::error::{CleaningError, Result};
use crate::utils::{count_absent, is_blank_or_absent, parse_numeric_cell};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Floating-point values
    Numeric,
    /// Strings
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Cell storage of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    /// Whether there are no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of the stored cells.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Text(_) => ColumnKind::Text,
        }
    }

    /// Number of absent cells.
    pub fn absent_count(&self) -> usize {
        match self {
            Self::Numeric(values) => count_absent(values),
            Self::Text(values) => count_absent(values),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a numeric column. Non-finite values are stored as absent.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Create a numeric column without absent cells.
    pub fn dense(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::numeric(name, values.into_iter().map(Some))
    }

    /// Create a text column.
    pub fn text<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect()),
        }
    }

    /// Create a column from existing storage.
    ///
    /// Numeric storage goes through the same non-finite filtering as
    /// [`Column::numeric`].
    pub fn from_data(name: impl Into<String>, data: ColumnData) -> Self {
        match data {
            ColumnData::Numeric(values) => Self::numeric(name, values),
            ColumnData::Text(values) => Self {
                name: name.into(),
                data: ColumnData::Text(values),
            },
        }
    }

    /// Infer a column from raw string cells.
    ///
    /// The column is numeric when every cell is blank, the `NA` token, or a
    /// finite number; blank and `NA` cells become absent. Otherwise the
    /// column is text, blank cells become absent and `NA` tokens are kept
    /// verbatim for the missing-value resolver.
    pub fn infer<S: AsRef<str>>(name: impl Into<String>, cells: &[Option<S>]) -> Self {
        let raw_cells: Vec<Option<&str>> = cells
            .iter()
            .map(|cell| cell.as_ref().map(|raw| raw.as_ref()))
            .collect();

        let is_numeric = raw_cells.iter().all(|cell| match cell {
            None => true,
            Some(raw) => is_blank_or_absent(raw) || parse_numeric_cell(raw).is_some(),
        });

        if is_numeric {
            Self::numeric(
                name,
                raw_cells
                    .iter()
                    .map(|cell| cell.and_then(parse_numeric_cell)),
            )
        } else {
            Self::text(
                name,
                raw_cells
                    .iter()
                    .map(|cell| cell.filter(|raw| !raw.trim().is_empty())),
            )
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column kind.
    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Cell storage.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Numeric cells, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Text(_) => None,
        }
    }

    /// Text cells, if this is a text column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(values) => Some(values),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Number of absent cells.
    pub fn absent_count(&self) -> usize {
        self.data.absent_count()
    }

    /// Split the column into its name and storage.
    pub fn into_parts(self) -> (String, ColumnData) {
        (self.name, self.data)
    }
}

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Create a table, checking that all columns have the same length and
    /// distinct names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != height {
                return Err(CleaningError::malformed(
                    column.name(),
                    format!("has {} rows, expected {}", column.len(), height),
                ));
            }
            if !seen.insert(column.name()) {
                return Err(CleaningError::malformed(
                    column.name(),
                    "column name appears more than once",
                ));
            }
        }

        Ok(Self { columns, height })
    }

    /// Build a table from a header row and raw string records.
    ///
    /// Records shorter than the header are padded with absent cells; longer
    /// records are rejected. Blank header names become `column_{index}`.
    /// Column kinds are inferred with [`Column::infer`].
    pub fn from_records<H, R, S>(headers: &[H], records: &[R]) -> Result<Self>
    where
        H: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let width = headers.len();
        let mut cells: Vec<Vec<Option<&str>>> = vec![Vec::with_capacity(records.len()); width];

        for (row_idx, record) in records.iter().enumerate() {
            let record = record.as_ref();
            if record.len() > width {
                return Err(CleaningError::malformed(
                    headers
                        .last()
                        .map(|h| h.as_ref().to_string())
                        .unwrap_or_default(),
                    format!(
                        "row {} has {} fields, header has {}",
                        row_idx + 1,
                        record.len(),
                        width
                    ),
                ));
            }
            for (col_idx, column_cells) in cells.iter_mut().enumerate() {
                column_cells.push(record.get(col_idx).map(|cell| cell.as_ref()));
            }
        }

        let columns = headers
            .iter()
            .zip(cells)
            .enumerate()
            .map(|(idx, (header, column_cells))| {
                let header = header.as_ref().trim();
                let name = if header.is_empty() {
                    format!("column_{idx}")
                } else {
                    header.to_string()
                };
                Column::infer(name, &column_cells)
            })
            .collect();

        Self::new(columns)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width())
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    }

    /// The last column, if any.
    pub fn last_column(&self) -> Option<&Column> {
        self.columns.last()
    }

    /// Total number of absent cells across all columns.
    pub fn absent_count(&self) -> usize {
        self.columns.iter().map(Column::absent_count).sum()
    }

    /// Transform every column, passing its index, and rebuild the table.
    ///
    /// The rebuilt table is validated again, so a transformation that
    /// changes a column's length is reported instead of silently breaking
    /// the row-count invariant.
    pub fn try_map_columns<F>(self, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, Column) -> Result<Column>,
    {
        let columns = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(idx, column)| f(idx, column))
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    /// Remove the last column, returning the remaining table and the column.
    pub fn split_last_column(mut self) -> (Self, Option<Column>) {
        let last = self.columns.pop();
        if self.columns.is_empty() {
            self.height = 0;
        }
        (self, last)
    }
}
