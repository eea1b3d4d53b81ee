//! Conversion between [`Table`] and polars [`DataFrame`].

use crate::error::{CleaningError, Result, ResultExt};
use crate::table::{Column as TableColumn, ColumnData, Table};
use polars::prelude::*;

/// Check if a DataType is a numeric type.
#[inline]
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Convert one frame column.
///
/// Numeric dtypes become numeric columns; strings stay text. Anything else
/// (booleans, dates, all-null columns) is rendered as text.
fn column_from_frame(column: &Column) -> Result<TableColumn> {
    let series = column.as_materialized_series();
    let name = series.name().to_string();

    if is_numeric_dtype(series.dtype()) {
        let floats = series
            .cast(&DataType::Float64)
            .context(format!("Failed to read column '{name}' as numbers"))?;
        let values: Vec<Option<f64>> = floats.f64()?.into_iter().collect();
        return Ok(TableColumn::numeric(name, values));
    }

    let strings = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series
            .cast(&DataType::String)
            .context(format!("Failed to render column '{name}' as text"))?
    };
    let values: Vec<Option<String>> = strings
        .str()?
        .into_iter()
        .map(|opt_val| opt_val.map(str::to_string))
        .collect();
    Ok(TableColumn::text(name, values))
}

impl Table {
    /// Build a table from a polars frame.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::MalformedInput`] if the frame has duplicate
    /// column names, or a polars error if a column cannot be read.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(column_from_frame)
            .collect::<Result<Vec<_>>>()?;
        Table::new(columns)
    }

    /// Convert the table into a polars frame.
    ///
    /// Numeric columns become `Float64`, text columns `String`. Absent cells
    /// are nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns()
            .iter()
            .map(|column| {
                let name = column.name().into();
                let series = match column.data() {
                    ColumnData::Numeric(values) => Series::new(name, values.clone()),
                    ColumnData::Text(values) => Series::new(name, values.clone()),
                };
                series.into()
            })
            .collect();

        DataFrame::new(columns).map_err(CleaningError::Polars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dataframe_to_table() {
        let df = df![
            "pulse" => [Some(60i64), None, Some(62)],
            "temp" => [Some(36.5f64), Some(36.7), None],
            "label" => [Some("a;"), Some("NA"), None],
            "ok" => [true, false, true],
        ]
        .unwrap();

        let table = Table::from_dataframe(&df).unwrap();

        assert_eq!(table.shape(), (3, 4));
        assert_eq!(
            table.column("pulse").unwrap().as_numeric().unwrap(),
            &[Some(60.0), None, Some(62.0)]
        );
        assert_eq!(table.column("temp").unwrap().absent_count(), 1);
        assert_eq!(
            table.column("label").unwrap().as_text().unwrap(),
            &[Some("a;".to_string()), Some("NA".to_string()), None]
        );
        assert_eq!(table.column("ok").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn test_table_to_dataframe() {
        let table = Table::new(vec![
            TableColumn::numeric("x", [Some(1.0), None]),
            TableColumn::text("t", [Some("a"), None]),
        ])
        .unwrap();

        let df = table.to_dataframe().unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("t").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("x").unwrap().null_count(), 1);

        let back = Table::from_dataframe(&df).unwrap();
        assert_eq!(back, table);
    }
}
