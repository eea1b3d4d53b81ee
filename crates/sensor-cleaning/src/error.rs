//! Error types for the cleaning pipeline.
//!
//! Every failure surfaced by the library is a [`CleaningError`]. The three
//! pipeline-level kinds callers usually care about are:
//!
//! - [`CleaningError::Config`] for invalid configuration,
//! - [`CleaningError::MalformedInput`] for tables that cannot be interpreted,
//! - [`CleaningError::DataQuality`] for columns whose statistics are undefined.
//!
//! Errors serialize as `{ "code": ..., "message": ... }` so the CLI can emit
//! them inside JSON output.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    /// A cell, row or column cannot be interpreted as declared.
    #[error("Malformed input in column '{column}': {reason}")]
    MalformedInput { column: String, reason: String },

    /// A statistic required for cleaning is undefined for a column.
    #[error("Data quality problem in column '{column}': {reason}")]
    DataQuality { column: String, reason: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Input file has an extension the loader does not understand.
    #[error("Unsupported input format: '{0}' (expected .csv or .txt)")]
    UnsupportedFormat(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Shorthand for a [`CleaningError::MalformedInput`].
    pub fn malformed(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`CleaningError::DataQuality`].
    pub fn data_quality(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataQuality {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::MalformedInput { .. } => "MALFORMED_INPUT",
            Self::DataQuality { .. } => "DATA_QUALITY",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by the configuration rather than the data.
    pub fn is_config_error(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::WithContext { source, .. } => source.is_config_error(),
            _ => false,
        }
    }

    /// Check if this error is a data-quality failure.
    ///
    /// Callers may choose to skip the offending column and retry, unlike
    /// malformed input which always aborts.
    pub fn is_data_quality(&self) -> bool {
        match self {
            Self::DataQuality { .. } => true,
            Self::WithContext { source, .. } => source.is_data_quality(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::Config(ConfigValidationError::EvenWindowSize(4)).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            CleaningError::malformed("A", "bad token").error_code(),
            "MALFORMED_INPUT"
        );
        assert_eq!(
            CleaningError::data_quality("A", "all absent").error_code(),
            "DATA_QUALITY"
        );
    }

    #[test]
    fn test_predicates_see_through_context() {
        let error = CleaningError::data_quality("A", "all absent").with_context("During smoothing");
        assert!(error.is_data_quality());
        assert!(!error.is_config_error());

        let error = CleaningError::Config(ConfigValidationError::EmptyStages)
            .with_context("Building pipeline");
        assert!(error.is_config_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::malformed("Pulse", "token 'abc' at row 3 is not numeric");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("MALFORMED_INPUT"));
        assert!(json.contains("Pulse"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::ColumnNotFound("test".to_string()).with_context("During resolve");
        assert!(error.to_string().contains("During resolve"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
