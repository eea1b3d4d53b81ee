//! Sensor Data Cleaning Library
//!
//! A deterministic cleaning pipeline for tabular measurement data, built with
//! Rust and Polars.
//!
//! # Overview
//!
//! A [`Table`] of named columns moves through an ordered list of stages:
//!
//! - **Sanitize**: strip one trailing `;` left over from delimited exports
//! - **Resolve missing values**: recognize `NA`, reinterpret numeric text and
//!   optionally fill absent cells with the column median
//! - **Smooth**: centered median filter over every numeric column
//! - **Reject outliers**: values outside the IQR fences become absent
//!
//! The pipeline returns the cleaned table and the number of absent cells
//! left in it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sensor_cleaning::{Pipeline, PipelineConfig, Preset, io};
//!
//! let table = io::load_table("data/heart.txt")?;
//!
//! let (cleaned, missing) = Pipeline::builder()
//!     .config(PipelineConfig::from_preset(Preset::Impute))
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(table)?;
//!
//! io::write_csv(&cleaned, "uploads/heart_cleaned.csv")?;
//! println!("Missing values: {missing}");
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use sensor_cleaning::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .window_size(5)
//!     .edge_padding(EdgePadding::Nearest)
//!     .iqr_multiplier(3.0)
//!     .missing_policy(MissingValuePolicy::NormalizeOnly)
//!     .label_policy(LabelPolicy::Exempt)
//!     .stages([Stage::ResolveMissing, Stage::Sanitize, Stage::Smooth])
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{Sanitizer, strip_trailing_delimiter};
pub use config::{
    ConfigValidationError, EdgePadding, LabelPolicy, MissingValuePolicy, PipelineConfig,
    PipelineConfigBuilder, Preset, Stage,
};
pub use error::{CleaningError, Result as SensorCleaningResult, ResultExt};
pub use imputers::MissingValueResolver;
pub use pipeline::{
    CleaningStage, ClosureProgressReporter, IqrFences, MedianSmoother, OutlierRejector, Pipeline,
    PipelineBuilder, ProgressReporter, ProgressStage, ProgressUpdate, StageExecutor, StageOutput,
    clean, median_filter,
};
pub use reporting::{CleaningReport, ReportGenerator};
pub use table::{Column, ColumnData, ColumnKind, Table};
pub use types::{
    ActionType, CleaningAction, CleaningResult, CleaningSummary, ColumnSummary, StageReport,
};
