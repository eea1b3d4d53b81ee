//! Report generation module.
//!
//! Use [`CleaningReport`] for both JSON output to stdout (`--json`) and
//! JSON file output (`--emit-report`).
//!
//! # Example
//!
//! ```rust,ignore
//! use sensor_cleaning::reporting::{CleaningReport, ReportGenerator};
//!
//! let report = CleaningReport::new("data/heart.txt", Some("uploads/heart_cleaned.csv"), &config, &result);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! ReportGenerator::new("uploads").write_report_to_file(&report, "heart")?;
//! ```

mod generator;

pub use generator::{CleaningReport, ReportGenerator};
