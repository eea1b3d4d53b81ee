//! Pipeline module.
//!
//! This module provides the cleaning pipeline, the smoothing and outlier
//! stages, and the [`CleaningStage`] seam every stage implements.

mod builder;
mod executor;
pub mod outliers;
pub mod progress;
pub mod smoothing;

pub use builder::{Pipeline, PipelineBuilder, clean};
pub use executor::StageExecutor;
pub use outliers::{IqrFences, OutlierRejector};
pub use progress::{ClosureProgressReporter, ProgressReporter, ProgressStage, ProgressUpdate};
pub use smoothing::{MedianSmoother, median_filter};

use crate::config::Stage;
use crate::error::Result;
use crate::table::Table;
use crate::types::CleaningAction;

/// Table produced by a stage, with the number of cells it changed.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub table: Table,
    pub cells_changed: usize,
}

/// A single step of the cleaning pipeline.
///
/// Stages take ownership of the table and return a new one with the same
/// number of rows. Implementations record what they did in `actions`.
pub trait CleaningStage: Send + Sync {
    /// Which stage this is.
    fn stage(&self) -> Stage;

    /// Run the stage.
    fn apply(&self, table: Table, actions: &mut Vec<CleaningAction>) -> Result<StageOutput>;
}
