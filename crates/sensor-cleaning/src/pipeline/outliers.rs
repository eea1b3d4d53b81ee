//! Outlier rejection module.
//!
//! Values outside the interquartile fences of their column are replaced by
//! the absent marker. Rows are never removed.

use crate::cleaner::label_as_text;
use crate::config::{ConfigValidationError, LabelPolicy, PipelineConfig, Stage};
use crate::error::Result;
use crate::pipeline::{CleaningStage, StageOutput};
use crate::table::{Column, Table};
use crate::types::{ActionType, CleaningAction};
use crate::utils::quartiles;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Interquartile fences of a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFences {
    /// Compute fences `[Q1 - m*IQR, Q3 + m*IQR]` over the given values.
    ///
    /// Quartiles use linear interpolation between closest ranks. Returns
    /// `None` when there are no values.
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let (q1, q3) = quartiles(values)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whether a value lies within the fences (bounds inclusive).
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Nulls out numeric values outside the IQR fences of their column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierRejector {
    multiplier: f64,
    label_policy: LabelPolicy,
}

impl OutlierRejector {
    /// Create a rejector that treats every column alike.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CleaningError::Config`] if `multiplier` is not a
    /// positive finite number.
    pub fn new(multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(multiplier).into());
        }
        Ok(Self {
            multiplier,
            label_policy: LabelPolicy::Include,
        })
    }

    /// Create a rejector from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(config.iqr_multiplier)?.with_label_policy(config.label_policy))
    }

    /// Set how the last column is treated.
    pub fn with_label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }

    /// Reject outliers in every eligible numeric column.
    ///
    /// Returns the table (same shape) and the total number of values nulled.
    pub fn reject(&self, table: Table) -> Result<(Table, usize)> {
        let (table, rejected, _) = self.reject_with_stats(table)?;
        Ok((table, rejected.iter().map(|(_, count)| count).sum()))
    }

    fn exempts_last_column(&self) -> bool {
        matches!(self.label_policy, LabelPolicy::Exempt | LabelPolicy::TrimAsText)
    }

    fn reject_with_stats(&self, table: Table) -> Result<(Table, Vec<(String, usize)>, bool)> {
        let last_idx = table.width().checked_sub(1);
        let mut rejected = Vec::new();
        let mut label_converted = false;

        let table = table.try_map_columns(|idx, column| {
            if Some(idx) == last_idx && self.exempts_last_column() {
                if self.label_policy == LabelPolicy::TrimAsText {
                    label_converted = true;
                    return Ok(label_as_text(column));
                }
                return Ok(column);
            }

            let (column, count) = self.reject_column(column);
            if count > 0 {
                rejected.push((column.name().to_string(), count));
            }
            Ok(column)
        })?;

        Ok((table, rejected, label_converted))
    }

    fn reject_column(&self, column: Column) -> (Column, usize) {
        let Some(values) = column.as_numeric() else {
            return (column, 0);
        };

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let Some(fences) = IqrFences::from_values(&present, self.multiplier) else {
            debug!("Skipping '{}': no present values", column.name());
            return (column, 0);
        };

        let mut count = 0;
        let kept: Vec<Option<f64>> = values
            .iter()
            .map(|opt_val| match opt_val {
                Some(v) if !fences.contains(*v) => {
                    count += 1;
                    None
                }
                other => *other,
            })
            .collect();

        if count == 0 {
            return (column, 0);
        }

        debug!(
            "Rejected {} values in '{}' outside [{:.4}, {:.4}]",
            count,
            column.name(),
            fences.lower,
            fences.upper
        );
        (Column::numeric(column.name(), kept), count)
    }
}

impl CleaningStage for OutlierRejector {
    fn stage(&self) -> Stage {
        Stage::RejectOutliers
    }

    fn apply(&self, table: Table, actions: &mut Vec<CleaningAction>) -> Result<StageOutput> {
        info!("Rejecting outliers (IQR x {})...", self.multiplier);
        let label_name = table.last_column().map(|c| c.name().to_string());
        let (table, rejected, label_converted) = self.reject_with_stats(table)?;

        if label_converted && let Some(name) = label_name {
            actions.push(CleaningAction::new(
                ActionType::LabelConverted,
                name,
                "Rendered label column as text and stripped a trailing delimiter",
            ));
        }

        let mut total = 0;
        for (name, count) in &rejected {
            total += count;
            actions.push(CleaningAction::new(
                ActionType::OutlierRejected,
                name,
                format!("Nulled {count} values outside {}x IQR fences", self.multiplier),
            ));
        }

        Ok(StageOutput {
            table,
            cells_changed: total,
        })
    }
}
