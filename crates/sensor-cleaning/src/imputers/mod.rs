//! Missing value resolution.
//!
//! The [`MissingValueResolver`] recognizes the `NA` token as absent,
//! reinterprets numeric text columns as numeric, and then applies one of two
//! policies:
//!
//! - [`MissingValuePolicy::NormalizeOnly`] (policy A) stops after
//!   normalization; absent cells stay absent.
//! - [`MissingValuePolicy::MedianImpute`] (policy B) fills every absent cell
//!   of a numeric column with that column's median. Text columns keep their
//!   absent markers.

mod statistical;

pub(crate) use statistical::fill_with_median;

use crate::config::{MissingValuePolicy, PipelineConfig, Stage};
use crate::error::Result;
use crate::pipeline::{CleaningStage, StageOutput};
use crate::table::{Column, Table};
use crate::types::{ActionType, CleaningAction};
use tracing::{debug, info, warn};

/// Counters collected while resolving a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ResolveStats {
    markers_normalized: usize,
    coerced_columns: Vec<String>,
    imputed: Vec<(String, usize)>,
}

impl ResolveStats {
    fn cells_imputed(&self) -> usize {
        self.imputed.iter().map(|(_, count)| count).sum()
    }
}

/// Detects absent values and resolves them according to a policy.
#[derive(Debug, Clone)]
pub struct MissingValueResolver {
    policy: MissingValuePolicy,
    numeric_columns: Vec<String>,
    coerce_numeric_text: bool,
}

impl MissingValueResolver {
    /// Create a resolver with the given policy.
    ///
    /// Numeric text coercion is enabled; no column is declared numeric.
    pub fn new(policy: MissingValuePolicy) -> Self {
        Self {
            policy,
            numeric_columns: Vec::new(),
            coerce_numeric_text: true,
        }
    }

    /// Create a resolver from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            policy: config.missing_policy,
            numeric_columns: config.numeric_columns.clone(),
            coerce_numeric_text: config.coerce_numeric_text,
        }
    }

    /// Declare columns that must be numeric after normalization.
    pub fn with_numeric_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.numeric_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable reinterpreting all-numeric text columns.
    pub fn coerce_numeric_text(mut self, coerce: bool) -> Self {
        self.coerce_numeric_text = coerce;
        self
    }

    /// Resolve missing values.
    ///
    /// Returns the table and the number of absent cells remaining in it.
    ///
    /// # Errors
    ///
    /// - `ColumnNotFound` if a declared numeric column does not exist.
    /// - `MalformedInput` if a declared numeric column holds a token that is
    ///   neither a number nor `NA`.
    /// - `DataQuality` under median imputation, if a numeric column with
    ///   absent cells has no present value.
    pub fn resolve(&self, table: Table) -> Result<(Table, usize)> {
        let (table, _) = self.resolve_with_stats(table)?;
        let remaining = table.absent_count();
        Ok((table, remaining))
    }

    fn resolve_with_stats(&self, table: Table) -> Result<(Table, ResolveStats)> {
        for name in &self.numeric_columns {
            table.column(name)?;
        }

        let mut stats = ResolveStats::default();

        let table = table.try_map_columns(|_, column| {
            let (column, replaced) = statistical::normalize_markers(column);
            stats.markers_normalized += replaced;

            let column = self.coerce(column, &mut stats)?;

            match self.policy {
                MissingValuePolicy::NormalizeOnly => Ok(column),
                MissingValuePolicy::MedianImpute => {
                    let (column, filled) = statistical::impute_median(column)?;
                    if filled > 0 {
                        debug!("Median imputed {} values in '{}'", filled, column.name());
                        stats.imputed.push((column.name().to_string(), filled));
                    }
                    Ok(column)
                }
            }
        })?;

        Ok((table, stats))
    }

    fn coerce(&self, column: Column, stats: &mut ResolveStats) -> Result<Column> {
        let required = self.numeric_columns.iter().any(|n| n == column.name());
        if !required && !self.coerce_numeric_text {
            return Ok(column);
        }

        let (column, coerced) = statistical::coerce_to_numeric(column, required)?;
        if coerced {
            debug!("Reinterpreted '{}' as numeric", column.name());
            stats.coerced_columns.push(column.name().to_string());
        }
        Ok(column)
    }
}

impl CleaningStage for MissingValueResolver {
    fn stage(&self) -> Stage {
        Stage::ResolveMissing
    }

    fn apply(&self, table: Table, actions: &mut Vec<CleaningAction>) -> Result<StageOutput> {
        info!("Resolving missing values ({:?})...", self.policy);
        let (table, stats) = self.resolve_with_stats(table)?;

        if stats.markers_normalized > 0 {
            actions.push(CleaningAction::new(
                ActionType::MarkersNormalized,
                "table",
                format!("Normalized {} NA markers", stats.markers_normalized),
            ));
        }
        for name in &stats.coerced_columns {
            actions.push(CleaningAction::new(
                ActionType::TypeCoerced,
                name,
                "Reinterpreted text column as numeric",
            ));
        }
        for (name, count) in &stats.imputed {
            actions.push(CleaningAction::new(
                ActionType::ValueImputed,
                name,
                format!("Filled {count} absent values with the column median"),
            ));
        }

        let remaining = table.absent_count();
        if remaining > 0 {
            warn!("{} absent values remain after resolution", remaining);
        }

        Ok(StageOutput {
            table,
            cells_changed: stats.markers_normalized + stats.cells_imputed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use pretty_assertions::assert_eq;

    fn missing_table() -> Table {
        Table::new(vec![
            Column::numeric("A", [Some(1.0), Some(2.0), None, Some(4.0)]),
            Column::numeric("B", [Some(5.0), None, Some(7.0), Some(8.0)]),
            Column::numeric("C", [None, Some(10.0), Some(11.0), Some(12.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_normalize_only_reports_all_absent() {
        let resolver = MissingValueResolver::new(MissingValuePolicy::NormalizeOnly);
        let (table, remaining) = resolver.resolve(missing_table()).unwrap();

        assert_eq!(remaining, 3);
        assert_eq!(table, missing_table());
    }

    #[test]
    fn test_median_impute_fills_numeric() {
        let resolver = MissingValueResolver::new(MissingValuePolicy::MedianImpute);
        let (table, remaining) = resolver.resolve(missing_table()).unwrap();

        assert_eq!(remaining, 0);
        assert_eq!(
            table.column("A").unwrap().as_numeric().unwrap(),
            &[Some(1.0), Some(2.0), Some(2.0), Some(4.0)]
        );
        assert_eq!(
            table.column("B").unwrap().as_numeric().unwrap(),
            &[Some(5.0), Some(7.0), Some(7.0), Some(8.0)]
        );
        assert_eq!(
            table.column("C").unwrap().as_numeric().unwrap(),
            &[Some(11.0), Some(10.0), Some(11.0), Some(12.0)]
        );
    }

    #[test]
    fn test_median_impute_is_idempotent() {
        let resolver = MissingValueResolver::new(MissingValuePolicy::MedianImpute);
        let (once, _) = resolver.resolve(missing_table()).unwrap();
        let (twice, remaining) = resolver.resolve(once.clone()).unwrap();

        assert_eq!(remaining, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_na_tokens_and_coercion() {
        let table = Table::new(vec![
            Column::text("reading", [Some("1"), Some("NA"), Some("3")]),
            Column::text("site", [Some("north"), Some("NA"), Some("south")]),
        ])
        .unwrap();

        let resolver = MissingValueResolver::new(MissingValuePolicy::MedianImpute);
        let (table, remaining) = resolver.resolve(table).unwrap();

        let reading = table.column("reading").unwrap();
        assert_eq!(reading.kind(), ColumnKind::Numeric);
        assert_eq!(reading.as_numeric().unwrap(), &[Some(1.0), Some(2.0), Some(3.0)]);

        let site = table.column("site").unwrap();
        assert_eq!(site.kind(), ColumnKind::Text);
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_coercion_can_be_disabled() {
        let table = Table::new(vec![Column::text("reading", [Some("1"), Some("2")])]).unwrap();
        let resolver =
            MissingValueResolver::new(MissingValuePolicy::NormalizeOnly).coerce_numeric_text(false);
        let (table, _) = resolver.resolve(table).unwrap();
        assert_eq!(table.column("reading").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn test_declared_numeric_column_with_bad_token() {
        let table = Table::new(vec![Column::text("bpm", [Some("72"), Some("seventy")])]).unwrap();
        let resolver = MissingValueResolver::new(MissingValuePolicy::NormalizeOnly)
            .with_numeric_columns(["bpm"]);

        let err = resolver.resolve(table).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_INPUT");
    }

    #[test]
    fn test_declared_numeric_column_must_exist() {
        let table = Table::new(vec![Column::dense("a", [1.0])]).unwrap();
        let resolver =
            MissingValueResolver::new(MissingValuePolicy::NormalizeOnly).with_numeric_columns(["b"]);
        let err = resolver.resolve(table).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_all_absent_numeric_column_is_data_quality_error() {
        let table = Table::new(vec![
            Column::dense("ok", [1.0, 2.0]),
            Column::numeric("empty", [None, None]),
        ])
        .unwrap();

        let resolver = MissingValueResolver::new(MissingValuePolicy::MedianImpute);
        let err = resolver.resolve(table.clone()).unwrap_err();
        assert!(err.is_data_quality());
        assert!(err.to_string().contains("'empty'"));

        // Normalization alone never needs a median
        let resolver = MissingValueResolver::new(MissingValuePolicy::NormalizeOnly);
        let (_, remaining) = resolver.resolve(table).unwrap();
        assert_eq!(remaining, 2);
    }

    #[test]
    fn test_apply_reports_actions() {
        let table = Table::new(vec![Column::text("reading", [Some("1"), Some("NA")])]).unwrap();
        let mut actions = Vec::new();
        let output = MissingValueResolver::new(MissingValuePolicy::MedianImpute)
            .apply(table, &mut actions)
            .unwrap();

        assert_eq!(output.cells_changed, 2);
        let kinds: Vec<ActionType> = actions.iter().map(|a| a.action_type).collect();
        assert_eq!(
            kinds,
            vec![
                ActionType::MarkersNormalized,
                ActionType::TypeCoerced,
                ActionType::ValueImputed
            ]
        );
    }
}
