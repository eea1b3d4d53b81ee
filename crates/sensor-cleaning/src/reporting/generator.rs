use crate::config::PipelineConfig;
use crate::error::{Result, ResultExt};
use crate::io::{cleaned_output_path, write_csv};
use crate::table::Table;
use crate::types::{CleaningResult, CleaningSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Report of a single cleaning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the output file (if written)
    pub output_file: Option<String>,

    /// Configuration the pipeline ran with
    pub config: PipelineConfig,

    /// Absent cells in the cleaned table
    pub missing_values: usize,

    /// Shape of the cleaned table (rows, columns)
    pub final_shape: (usize, usize),

    /// Share of present cells in the cleaned table (0.0 - 1.0)
    pub completeness: f32,

    /// Actions, per-stage reports and warnings
    pub summary: CleaningSummary,
}

impl CleaningReport {
    /// Build a report from a pipeline result.
    pub fn new(
        input_file: &str,
        output_file: Option<&str>,
        config: &PipelineConfig,
        result: &CleaningResult,
    ) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: output_file.map(String::from),
            config: config.clone(),
            missing_values: result.missing_values,
            final_shape: result.table.shape(),
            completeness: result.summary.completeness_after(),
            summary: result.summary.clone(),
        }
    }
}

/// Writes cleaned tables and reports into an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Save the cleaned table for `input` as `<stem>_cleaned.csv`.
    pub fn write_table(&self, table: &Table, input: impl AsRef<Path>) -> Result<PathBuf> {
        let output_path = cleaned_output_path(input, &self.output_dir);
        write_csv(table, &output_path)?;
        Ok(output_path)
    }

    /// Write a report to `<base_name>_report.json`.
    pub fn write_report_to_file(&self, report: &CleaningReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Failed to create {}", self.output_dir.display()))?;

        let report_path = self.output_dir.join(format!("{base_name}_report.json"));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
