//! Result and summary types produced by the pipeline.

use crate::config::Stage;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Output of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningResult {
    /// The cleaned table.
    pub table: Table,
    /// Absent cells remaining in the cleaned table.
    pub missing_values: usize,
    /// What the pipeline did.
    pub summary: CleaningSummary,
}

/// Human-readable summary of what the pipeline did.
///
/// # Example
///
/// ```rust,ignore
/// let result = pipeline.run(table)?;
/// println!("Cleaned {} rows in {}ms", result.summary.rows, result.summary.duration_ms);
/// for stage in &result.summary.stages {
///     println!("{}: {} absent cells", stage.stage, stage.absent_after);
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows (unchanged by every stage).
    pub rows: usize,

    /// Number of columns before cleaning.
    pub columns_before: usize,
    /// Number of columns after cleaning.
    pub columns_after: usize,

    /// Absent cells in the input table.
    pub absent_before: usize,
    /// Absent cells in the output table.
    pub absent_after: usize,

    /// Per-stage reports, in execution order.
    pub stages: Vec<StageReport>,

    /// List of actions taken during cleaning.
    pub actions: Vec<CleaningAction>,

    /// Per-column summaries of the output.
    pub column_summaries: Vec<ColumnSummary>,

    /// Warnings and notes generated during cleaning.
    pub warnings: Vec<String>,
}

impl CleaningSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Report of a stage, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Share of present cells in the output (0.0 - 1.0).
    pub fn completeness_after(&self) -> f32 {
        let cells = self.rows * self.columns_after;
        if cells == 0 {
            1.0
        } else {
            1.0 - self.absent_after as f32 / cells as f32
        }
    }
}

/// What a single stage did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage.
    pub stage: Stage,
    /// Absent cells after the stage.
    pub absent_after: usize,
    /// Cells the stage changed (trimmed, imputed, smoothed, nulled).
    pub cells_changed: usize,
}

/// A single action taken during cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name or "table").
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
}

impl CleaningAction {
    /// Create a new cleaning action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
        }
    }
}

/// Types of actions that can be taken during cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Trailing delimiters were stripped from text cells.
    ValueCleaned,
    /// `NA` tokens were normalized to the absent marker.
    MarkersNormalized,
    /// A text column was reinterpreted as numeric.
    TypeCoerced,
    /// The label column was rendered as text.
    LabelConverted,
    /// Missing values were imputed.
    ValueImputed,
    /// A median filter was applied.
    Smoothed,
    /// Out-of-fence values were nulled.
    OutlierRejected,
    /// A column was removed from the table.
    ColumnRemoved,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ValueCleaned => "Value Cleaned",
            Self::MarkersNormalized => "Markers Normalized",
            Self::TypeCoerced => "Type Coerced",
            Self::LabelConverted => "Label Converted",
            Self::ValueImputed => "Value Imputed",
            Self::Smoothed => "Smoothed",
            Self::OutlierRejected => "Outlier Rejected",
            Self::ColumnRemoved => "Column Removed",
        }
    }
}

/// Summary of a single output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Name of the column.
    pub name: String,
    /// Final kind ("numeric" or "text").
    pub kind: String,
    /// Absent cells in the output.
    pub missing: usize,
}
