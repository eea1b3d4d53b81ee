//! Stage executor module.
//!
//! Turns the configured stage list into stage objects and runs them in
//! order over a table.

use crate::cleaner::Sanitizer;
use crate::config::{PipelineConfig, Stage};
use crate::error::Result;
use crate::imputers::MissingValueResolver;
use crate::pipeline::outliers::OutlierRejector;
use crate::pipeline::progress::{ProgressReporter, ProgressUpdate};
use crate::pipeline::smoothing::MedianSmoother;
use crate::pipeline::CleaningStage;
use crate::table::Table;
use crate::types::{CleaningSummary, StageReport};
use tracing::{debug, info};

/// Runs an ordered list of cleaning stages.
pub struct StageExecutor {
    stages: Vec<Box<dyn CleaningStage>>,
}

static_assertions::assert_impl_all!(StageExecutor: Send, Sync);

impl StageExecutor {
    /// Build the stages named by the configuration, in its order.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let stages = config
            .stages
            .iter()
            .map(|stage| Self::build_stage(*stage, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { stages })
    }

    /// Build an executor from already constructed stages.
    pub fn from_stages(stages: Vec<Box<dyn CleaningStage>>) -> Self {
        Self { stages }
    }

    fn build_stage(stage: Stage, config: &PipelineConfig) -> Result<Box<dyn CleaningStage>> {
        Ok(match stage {
            Stage::Sanitize => Box::new(Sanitizer),
            Stage::ResolveMissing => Box::new(MissingValueResolver::from_config(config)),
            Stage::Smooth => Box::new(MedianSmoother::from_config(config)?),
            Stage::RejectOutliers => Box::new(OutlierRejector::from_config(config)?),
        })
    }

    /// The stages in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.iter().map(|s| s.stage()).collect()
    }

    /// Run every stage in order.
    ///
    /// Stage reports and actions are appended to `summary`. The first failing
    /// stage aborts the run.
    pub fn execute(
        &self,
        mut table: Table,
        summary: &mut CleaningSummary,
        reporter: Option<&dyn ProgressReporter>,
    ) -> Result<Table> {
        let count = self.stages.len();

        for (idx, stage) in self.stages.iter().enumerate() {
            let kind = stage.stage();
            if let Some(reporter) = reporter {
                reporter.report(ProgressUpdate::starting(kind, idx, count));
            }
            info!("Step {}/{}: {}", idx + 1, count, kind);

            let output = stage.apply(table, &mut summary.actions)?;
            table = output.table;

            let absent_after = table.absent_count();
            debug!(
                "{} changed {} cells; {} absent cells remain",
                kind, output.cells_changed, absent_after
            );
            summary.stages.push(StageReport {
                stage: kind,
                absent_after,
                cells_changed: output.cells_changed,
            });
        }

        Ok(table)
    }
}
