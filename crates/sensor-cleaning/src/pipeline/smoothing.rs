//! Median filter smoothing.
//!
//! Each numeric column is replaced by a centered sliding-window median.
//! Absent cells are filled with the column median first, so the filter
//! always sees a dense signal.

use crate::config::{ConfigValidationError, EdgePadding, PipelineConfig, Stage};
use crate::error::Result;
use crate::imputers::fill_with_median;
use crate::pipeline::{CleaningStage, StageOutput};
use crate::table::{Column, Table};
use crate::types::{ActionType, CleaningAction};
use crate::utils::median;
use tracing::{debug, info};

/// Apply a median filter of odd width `window_size` to a dense signal.
///
/// `out[i]` is the median of the `window_size` values centered at `i`.
/// Neighbours outside the signal come from `padding`. The output always has
/// the same length as the input.
pub fn median_filter(values: &[f64], window_size: usize, padding: EdgePadding) -> Vec<f64> {
    let n = values.len();
    if n == 0 || window_size <= 1 {
        return values.to_vec();
    }

    let half = window_size / 2;
    let mut window = Vec::with_capacity(window_size);

    (0..n)
        .map(|i| {
            window.clear();
            for offset in 0..window_size {
                let pos = (i + offset).checked_sub(half).filter(|&p| p < n);
                let value = match (pos, padding) {
                    (Some(p), _) => values[p],
                    (None, EdgePadding::Zero) => 0.0,
                    (None, EdgePadding::Nearest) => {
                        if i + offset < half {
                            values[0]
                        } else {
                            values[n - 1]
                        }
                    }
                };
                window.push(value);
            }
            // Odd window: the median is a single element
            median(&window).unwrap_or(values[i])
        })
        .collect()
}

/// Smooths numeric columns with a centered median filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MedianSmoother {
    window_size: usize,
    padding: EdgePadding,
}

impl MedianSmoother {
    /// Create a smoother with zero edge padding.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::Config`] if `window_size` is zero or even.
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(ConfigValidationError::ZeroWindowSize.into());
        }
        if window_size % 2 == 0 {
            return Err(ConfigValidationError::EvenWindowSize(window_size).into());
        }
        Ok(Self {
            window_size,
            padding: EdgePadding::Zero,
        })
    }

    /// Create a smoother from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(config.window_size)?.with_padding(config.edge_padding))
    }

    /// Use a different edge padding.
    pub fn with_padding(mut self, padding: EdgePadding) -> Self {
        self.padding = padding;
        self
    }

    /// Smooth every numeric column of the table.
    ///
    /// Text columns pass through. The table keeps its shape.
    ///
    /// # Errors
    ///
    /// Returns [`CleaningError::DataQuality`] if a numeric column has absent
    /// cells but no present value to take the median of.
    pub fn smooth(&self, table: Table) -> Result<Table> {
        let (table, _) = self.smooth_with_count(table)?;
        Ok(table)
    }

    fn smooth_with_count(&self, table: Table) -> Result<(Table, usize)> {
        let mut changed = 0;

        let table = table.try_map_columns(|_, column| {
            let Some(values) = column.as_numeric() else {
                return Ok(column);
            };

            let (dense, filled) = fill_with_median(column.name(), values)?;
            let smoothed = median_filter(&dense, self.window_size, self.padding);

            let column_changed = values
                .iter()
                .zip(&smoothed)
                .filter(|(before, after)| **before != Some(**after))
                .count();
            if column_changed > 0 {
                debug!(
                    "Smoothed '{}': {} cells changed ({} filled first)",
                    column.name(),
                    column_changed,
                    filled
                );
            }
            changed += column_changed;

            Ok(Column::dense(column.name(), smoothed))
        })?;

        Ok((table, changed))
    }
}

impl CleaningStage for MedianSmoother {
    fn stage(&self) -> Stage {
        Stage::Smooth
    }

    fn apply(&self, table: Table, actions: &mut Vec<CleaningAction>) -> Result<StageOutput> {
        info!("Smoothing numeric columns (window {})...", self.window_size);
        let (table, changed) = self
            .smooth_with_count(table)
            .map_err(|e| e.with_context("Median smoothing failed"))?;

        if changed > 0 {
            actions.push(CleaningAction::new(
                ActionType::Smoothed,
                "table",
                format!(
                    "Applied a median filter of width {} ({} cells changed)",
                    self.window_size, changed
                ),
            ));
        }

        Ok(StageOutput {
            table,
            cells_changed: changed,
        })
    }
}
