//! Text sanitization.
//!
//! Delimited exports often leave a trailing `;` on the last field of every
//! line. The [`Sanitizer`] strips one such delimiter from each text cell so
//! that numeric text can later be recognized as numbers.

mod sanitizers;

pub(crate) use sanitizers::label_as_text;
pub use sanitizers::strip_trailing_delimiter;

use crate::config::Stage;
use crate::error::Result;
use crate::pipeline::{CleaningStage, StageOutput};
use crate::table::Table;
use crate::types::{ActionType, CleaningAction};
use tracing::{debug, info};

/// Strips trailing delimiter artifacts from text columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer;

impl Sanitizer {
    /// Strip one trailing `;` from every present cell of every text column.
    ///
    /// Returns the table (same shape) and the number of cells changed.
    pub fn sanitize(&self, table: Table) -> Result<(Table, usize)> {
        let mut total_changed = 0;

        let table = table.try_map_columns(|_, column| {
            let (cleaned, changed) = sanitizers::sanitize_column(column);
            if changed > 0 {
                debug!("Stripped trailing delimiters from {} cells in '{}'", changed, cleaned.name());
            }
            total_changed += changed;
            Ok(cleaned)
        })?;

        Ok((table, total_changed))
    }
}

impl CleaningStage for Sanitizer {
    fn stage(&self) -> Stage {
        Stage::Sanitize
    }

    fn apply(&self, table: Table, actions: &mut Vec<CleaningAction>) -> Result<StageOutput> {
        info!("Sanitizing text columns...");
        let (table, changed) = self.sanitize(table)?;

        if changed > 0 {
            actions.push(CleaningAction::new(
                ActionType::ValueCleaned,
                "table",
                format!("Stripped a trailing delimiter from {changed} cells"),
            ));
        }

        Ok(StageOutput {
            table,
            cells_changed: changed,
        })
    }
}
