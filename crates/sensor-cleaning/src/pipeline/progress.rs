//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline emits one update when it starts, one before each configured
//! stage, and a final `Complete` or `Failed` update.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensor_cleaning::Pipeline;
//!
//! let (table, missing) = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(table)?;
//! ```

use crate::config::Stage;
use serde::{Deserialize, Serialize};

/// Phases reported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStage {
    /// Pipeline is validating its input
    Initializing,
    /// Stripping trailing delimiters
    Sanitizing,
    /// Normalizing markers and imputing
    ResolvingMissing,
    /// Applying the median filter
    Smoothing,
    /// Nulling out-of-fence values
    RejectingOutliers,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl ProgressStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Sanitizing => "Sanitizing Text",
            Self::ResolvingMissing => "Resolving Missing Values",
            Self::Smoothing => "Smoothing",
            Self::RejectingOutliers => "Rejecting Outliers",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

impl From<Stage> for ProgressStage {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Sanitize => Self::Sanitizing,
            Stage::ResolveMissing => Self::ResolvingMissing,
            Stage::Smooth => Self::Smoothing,
            Stage::RejectOutliers => Self::RejectingOutliers,
        }
    }
}

/// A single progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current phase
    pub stage: ProgressStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Zero-based index of the running stage among the configured stages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_index: Option<usize>,

    /// Number of configured stages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_count: Option<usize>,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a progress update without stage position.
    pub fn new(stage: ProgressStage, progress: f32, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_index: None,
            stage_count: None,
            message: message.into(),
        }
    }

    /// Creates the update emitted before stage `index` of `count` runs.
    pub fn starting(stage: Stage, index: usize, count: usize) -> Self {
        let progress = if count > 0 {
            index as f32 / count as f32
        } else {
            0.0
        };
        Self {
            stage: stage.into(),
            progress: progress.clamp(0.0, 1.0),
            stage_index: Some(index),
            stage_count: Some(count),
            message: format!("{} ({}/{})", stage.display_name(), index + 1, count),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(ProgressStage::Complete, 1.0, message)
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ProgressStage::Failed, 0.0, message)
    }
}

/// Trait for receiving progress updates during cleaning.
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// shared across threads.
pub trait ProgressReporter: Send + Sync {
    /// Called at every phase change. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_starting_update_position() {
        let update = ProgressUpdate::starting(Stage::Smooth, 2, 4);
        assert_eq!(update.stage, ProgressStage::Smoothing);
        assert_eq!(update.progress, 0.5);
        assert_eq!(update.stage_index, Some(2));
        assert_eq!(update.message, "Median smoothing (3/4)");
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(ProgressUpdate::new(ProgressStage::Initializing, 1.7, "x").progress, 1.0);
        assert_eq!(ProgressUpdate::new(ProgressStage::Initializing, -0.2, "x").progress, 0.0);
    }

    #[test]
    fn test_closure_reporter() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::starting(Stage::Sanitize, 0, 4));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_update_serialization_skips_missing_position() {
        let json = serde_json::to_string(&ProgressUpdate::complete("Done")).unwrap();
        assert!(json.contains("\"complete\""));
        assert!(!json.contains("stage_index"));
    }
}
