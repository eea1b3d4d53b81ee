//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning workflow.

use crate::config::{LabelPolicy, PipelineConfig};
use crate::error::Result;
use crate::pipeline::StageExecutor;
use crate::pipeline::progress::{
    ClosureProgressReporter, ProgressReporter, ProgressStage, ProgressUpdate,
};
use crate::table::Table;
use crate::types::{ActionType, CleaningAction, CleaningResult, CleaningSummary, ColumnSummary};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sensor_cleaning::{Pipeline, PipelineConfig, Preset};
///
/// let (cleaned, missing) = Pipeline::builder()
///     .config(PipelineConfig::from_preset(Preset::Impute))
///     .build()?
///     .clean(table)?;
/// println!("{missing} missing values remain");
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    executor: StageExecutor,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean a table.
    ///
    /// Returns the cleaned table and the number of absent cells left in it.
    ///
    /// # Errors
    ///
    /// The first failing stage aborts the call; no partial table is returned.
    pub fn clean(&self, table: Table) -> Result<(Table, usize)> {
        let result = self.run(table)?;
        Ok((result.table, result.missing_values))
    }

    /// Clean a table and describe what was done.
    pub fn run(&self, table: Table) -> Result<CleaningResult> {
        match self.run_internal(table) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Cleaning complete: {} missing values",
                    result.missing_values
                )));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, table: Table) -> Result<CleaningResult> {
        let start_time = Instant::now();

        info!("Starting cleaning pipeline...");
        self.report_progress(ProgressUpdate::new(
            ProgressStage::Initializing,
            0.0,
            "Starting cleaning pipeline...",
        ));

        let mut summary = CleaningSummary::new();
        for warning in self.config.warnings() {
            summary.add_warning(warning);
        }
        summary.rows = table.height();
        summary.columns_before = table.width();
        summary.absent_before = table.absent_count();
        debug!(
            "Input shape: {:?}, {} absent cells",
            table.shape(),
            summary.absent_before
        );

        let table = self.apply_label_policy(table, &mut summary);

        let table = self
            .executor
            .execute(table, &mut summary, self.progress_reporter.as_deref())?;

        let missing_values = table.absent_count();
        summary.columns_after = table.width();
        summary.absent_after = missing_values;
        summary.column_summaries = table
            .columns()
            .iter()
            .map(|column| ColumnSummary {
                name: column.name().to_string(),
                kind: column.kind().to_string(),
                missing: column.absent_count(),
            })
            .collect();

        if missing_values > 0 {
            warn!("{} missing values remain in the cleaned table", missing_values);
            summary.add_warning(format!(
                "{missing_values} missing values remain in the cleaned table"
            ));
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Cleaning completed in {}ms: {} rows x {} columns",
            summary.duration_ms, summary.rows, summary.columns_after
        );

        Ok(CleaningResult {
            table,
            missing_values,
            summary,
        })
    }

    fn apply_label_policy(&self, table: Table, summary: &mut CleaningSummary) -> Table {
        if self.config.label_policy != LabelPolicy::Drop {
            return table;
        }

        let (table, dropped) = table.split_last_column();
        if let Some(column) = dropped {
            info!("Dropping label column '{}'", column.name());
            summary.add_action(CleaningAction::new(
                ActionType::ColumnRemoved,
                column.name(),
                "Dropped the last column before cleaning",
            ));
        }
        table
    }
}

/// Clean a table with the given configuration.
///
/// Shorthand for building a [`Pipeline`] and calling [`Pipeline::clean`].
pub fn clean(table: Table, config: &PipelineConfig) -> Result<(Table, usize)> {
    Pipeline::builder().config(config.clone()).build()?.clean(table)
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        for warning in config.warnings() {
            warn!("{}", warning);
        }

        let executor = StageExecutor::from_config(&config)?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
            executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MissingValuePolicy, Preset, Stage};
    use crate::table::{Column, ColumnKind};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn missing_table() -> Table {
        Table::new(vec![
            Column::numeric("A", [Some(1.0), Some(2.0), None, Some(4.0)]),
            Column::numeric("B", [Some(5.0), None, Some(7.0), Some(8.0)]),
            Column::numeric("C", [None, Some(10.0), Some(11.0), Some(12.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            window_size: 4,
            ..PipelineConfig::default()
        };
        let err = Pipeline::builder().config(config).build().err().unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_resolve_only_reports_missing_count() {
        let config = PipelineConfig::builder()
            .missing_policy(MissingValuePolicy::NormalizeOnly)
            .stages([Stage::ResolveMissing])
            .build()
            .unwrap();
        let (_, missing) = clean(missing_table(), &config).unwrap();
        assert_eq!(missing, 3);

        let config = PipelineConfig::builder()
            .missing_policy(MissingValuePolicy::MedianImpute)
            .stages([Stage::ResolveMissing])
            .build()
            .unwrap();
        let (table, missing) = clean(missing_table(), &config).unwrap();
        assert_eq!(missing, 0);
        assert_eq!(
            table.column("C").unwrap().as_numeric().unwrap()[0],
            Some(11.0)
        );
    }

    #[test]
    fn test_drop_label_removes_last_column() {
        let table = Table::new(vec![
            Column::dense("x", [1.0, 2.0, 3.0]),
            Column::text("label", [Some("a;"), Some("b;"), Some("c;")]),
        ])
        .unwrap();

        let result = Pipeline::builder()
            .config(PipelineConfig::from_preset(Preset::Impute))
            .build()
            .unwrap()
            .run(table)
            .unwrap();

        assert_eq!(result.table.column_names(), vec!["x"]);
        assert_eq!(result.summary.columns_before, 2);
        assert_eq!(result.summary.columns_after, 1);
        assert_eq!(result.summary.actions[0].action_type, ActionType::ColumnRemoved);
    }

    #[test]
    fn test_normalize_preset_keeps_label_as_text() {
        let table = Table::new(vec![
            Column::text("x", [Some("2"), Some("NA"), Some("3"), Some("2")]),
            Column::text("label", [Some("1;"), Some("0;"), Some("1;"), Some("NA")]),
        ])
        .unwrap();

        let (cleaned, missing) = Pipeline::builder()
            .config(PipelineConfig::from_preset(Preset::Normalize))
            .build()
            .unwrap()
            .clean(table)
            .unwrap();

        let label = cleaned.column("label").unwrap();
        assert_eq!(label.kind(), ColumnKind::Text);
        assert_eq!(cleaned.height(), 4);
        // NA in x is median-filled by the smoother; NA label stays absent
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_label_policy_without_outlier_stage_is_reported() {
        let config = PipelineConfig::builder()
            .label_policy(LabelPolicy::TrimAsText)
            .stages([Stage::Sanitize, Stage::ResolveMissing])
            .build()
            .unwrap();

        let result = Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .run(missing_table())
            .unwrap();

        assert!(
            result
                .summary
                .warnings
                .iter()
                .any(|w| w.contains("TrimAsText") && w.contains("Outlier rejection"))
        );
    }

    #[test]
    fn test_summary_tracks_stages() {
        let result = Pipeline::builder().build().unwrap().run(missing_table()).unwrap();

        let stages: Vec<Stage> = result.summary.stages.iter().map(|s| s.stage).collect();
        assert_eq!(stages, Stage::DEFAULT_ORDER.to_vec());
        assert_eq!(result.summary.absent_before, 3);
        assert_eq!(
            result.summary.stage(Stage::ResolveMissing).unwrap().absent_after,
            0
        );
        assert_eq!(result.summary.column_summaries.len(), 3);
    }

    #[test]
    fn test_progress_ends_with_complete_or_failed() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let stages_clone = stages.clone();
        let pipeline = Pipeline::builder()
            .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        pipeline.clean(missing_table()).unwrap();
        assert_eq!(stages.lock().unwrap().first(), Some(&ProgressStage::Initializing));
        assert_eq!(stages.lock().unwrap().last(), Some(&ProgressStage::Complete));
        assert_eq!(stages.lock().unwrap().len(), 6);

        let bad = Table::new(vec![Column::numeric("x", [None, None])]).unwrap();
        assert!(pipeline.clean(bad).is_err());
        assert_eq!(stages.lock().unwrap().last(), Some(&ProgressStage::Failed));
    }
}
