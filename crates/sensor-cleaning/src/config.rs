//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! The two historical variants of the pipeline are available as [`Preset`]s;
//! every choice they differ on is also an individual option.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default smoothing window width.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Default IQR fence multiplier ("mild outlier" fence).
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// A single cleaning stage. The pipeline runs stages in the configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Strip trailing `;` artifacts from text cells
    Sanitize,
    /// Normalize `NA` markers, coerce numeric text, optionally impute
    ResolveMissing,
    /// Sliding-window median filter over numeric columns
    Smooth,
    /// Null out values outside the IQR fences
    RejectOutliers,
}

impl Stage {
    /// The default stage order.
    pub const DEFAULT_ORDER: [Stage; 4] = [
        Stage::Sanitize,
        Stage::ResolveMissing,
        Stage::Smooth,
        Stage::RejectOutliers,
    ];

    /// Human-readable stage name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sanitize => "Sanitize",
            Self::ResolveMissing => "Resolve missing values",
            Self::Smooth => "Median smoothing",
            Self::RejectOutliers => "Outlier rejection",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How missing values are handled by the resolve stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Policy A: normalize `NA` tokens to the absent marker, impute nothing
    NormalizeOnly,
    /// Policy B: fill absent numeric cells with the column median
    #[default]
    MedianImpute,
}

/// Treatment of the last column, which usually holds a label or class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// The last column is an ordinary column
    #[default]
    Include,
    /// The last column is left alone by outlier rejection
    Exempt,
    /// The last column is rendered as text and trimmed of one trailing `;`
    /// before outlier rejection, which then skips it.
    ///
    /// Like `Exempt`, this only acts inside [`Stage::RejectOutliers`]; see
    /// [`PipelineConfig::warnings`].
    TrimAsText,
    /// The last column is removed before cleaning starts
    Drop,
}

/// Values used for window positions outside the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgePadding {
    /// Out-of-range neighbours are 0.0
    #[default]
    Zero,
    /// Out-of-range neighbours repeat the nearest edge value
    Nearest,
}

/// Named bundles of options matching the two known variants of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Normalize markers first, sanitize, smooth, 1.5 IQR fence, label kept as text
    Normalize,
    /// Sanitize, median-impute, smooth, 3.0 IQR fence, label dropped
    Impute,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sensor_cleaning::config::{PipelineConfig, MissingValuePolicy};
///
/// let config = PipelineConfig::builder()
///     .window_size(5)
///     .iqr_multiplier(3.0)
///     .missing_policy(MissingValuePolicy::MedianImpute)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Smoothing window width. Must be odd and at least 1.
    /// Default: 3
    pub window_size: usize,

    /// Padding used by the median filter at the column edges.
    /// Default: Zero
    pub edge_padding: EdgePadding,

    /// IQR fence multiplier. Must be finite and positive.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Missing value handling.
    /// Default: MedianImpute
    pub missing_policy: MissingValuePolicy,

    /// Treatment of the last column.
    /// Default: Include
    pub label_policy: LabelPolicy,

    /// Stages to run, in order.
    /// Default: Sanitize, ResolveMissing, Smooth, RejectOutliers
    pub stages: Vec<Stage>,

    /// Columns that must be numeric once `NA` markers are normalized.
    /// Default: empty
    pub numeric_columns: Vec<String>,

    /// Whether text columns whose present cells all parse as numbers are
    /// reinterpreted as numeric.
    /// Default: true
    pub coerce_numeric_text: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            edge_padding: EdgePadding::default(),
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            missing_policy: MissingValuePolicy::default(),
            label_policy: LabelPolicy::default(),
            stages: Stage::DEFAULT_ORDER.to_vec(),
            numeric_columns: Vec::new(),
            coerce_numeric_text: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Configuration of one of the named variants.
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Normalize => Self {
                stages: vec![
                    Stage::ResolveMissing,
                    Stage::Sanitize,
                    Stage::Smooth,
                    Stage::RejectOutliers,
                ],
                missing_policy: MissingValuePolicy::NormalizeOnly,
                iqr_multiplier: 1.5,
                label_policy: LabelPolicy::TrimAsText,
                ..Self::default()
            },
            Preset::Impute => Self {
                stages: Stage::DEFAULT_ORDER.to_vec(),
                missing_policy: MissingValuePolicy::MedianImpute,
                iqr_multiplier: 3.0,
                label_policy: LabelPolicy::Drop,
                ..Self::default()
            },
        }
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Whether the stage is part of this configuration.
    pub fn runs(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Options that have no effect with the selected stages.
    ///
    /// These are not errors: the pipeline logs them and records them in the
    /// run summary.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let label_needs_outliers =
            matches!(self.label_policy, LabelPolicy::Exempt | LabelPolicy::TrimAsText);
        if label_needs_outliers && !self.runs(Stage::RejectOutliers) {
            warnings.push(format!(
                "label policy {:?} has no effect without the {} stage",
                self.label_policy,
                Stage::RejectOutliers
            ));
        }
        warnings
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.window_size == 0 {
            return Err(ConfigValidationError::ZeroWindowSize);
        }

        if self.window_size % 2 == 0 {
            return Err(ConfigValidationError::EvenWindowSize(self.window_size));
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if self.stages.is_empty() {
            return Err(ConfigValidationError::EmptyStages);
        }

        for (idx, stage) in self.stages.iter().enumerate() {
            if self.stages[..idx].contains(stage) {
                return Err(ConfigValidationError::DuplicateStage(*stage));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Window size must be at least 1")]
    ZeroWindowSize,

    #[error("Window size must be odd, got {0}")]
    EvenWindowSize(usize),

    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidMultiplier(f64),

    #[error("At least one stage must be configured")]
    EmptyStages,

    #[error("Stage '{0}' is configured more than once")]
    DuplicateStage(Stage),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    preset: Option<Preset>,
    window_size: Option<usize>,
    edge_padding: Option<EdgePadding>,
    iqr_multiplier: Option<f64>,
    missing_policy: Option<MissingValuePolicy>,
    label_policy: Option<LabelPolicy>,
    stages: Option<Vec<Stage>>,
    numeric_columns: Vec<String>,
    coerce_numeric_text: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Start from a named variant. Options set on the builder override it.
    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    /// Set the smoothing window width (odd, at least 1).
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = Some(size);
        self
    }

    /// Set the median filter edge padding.
    pub fn edge_padding(mut self, padding: EdgePadding) -> Self {
        self.edge_padding = Some(padding);
        self
    }

    /// Set the IQR fence multiplier.
    ///
    /// # Arguments
    /// * `multiplier` - 1.5 for the mild-outlier fence, 3.0 for the extreme fence
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the missing value policy.
    pub fn missing_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_policy = Some(policy);
        self
    }

    /// Set the last-column policy.
    pub fn label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = Some(policy);
        self
    }

    /// Drop the last column before cleaning (`true`) or treat it as an
    /// ordinary column (`false`).
    pub fn drop_last_column(mut self, drop: bool) -> Self {
        self.label_policy = Some(if drop {
            LabelPolicy::Drop
        } else {
            LabelPolicy::Include
        });
        self
    }

    /// Set the stages to run, in order.
    pub fn stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.stages = Some(stages.into_iter().collect());
        self
    }

    /// Declare a column that must be numeric.
    pub fn numeric_column(mut self, name: impl Into<String>) -> Self {
        self.numeric_columns.push(name.into());
        self
    }

    /// Enable or disable reinterpreting all-numeric text columns as numeric.
    pub fn coerce_numeric_text(mut self, coerce: bool) -> Self {
        self.coerce_numeric_text = Some(coerce);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let base = self
            .preset
            .map(PipelineConfig::from_preset)
            .unwrap_or_default();

        let mut numeric_columns = base.numeric_columns;
        numeric_columns.extend(self.numeric_columns);

        let config = PipelineConfig {
            window_size: self.window_size.unwrap_or(base.window_size),
            edge_padding: self.edge_padding.unwrap_or(base.edge_padding),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(base.iqr_multiplier),
            missing_policy: self.missing_policy.unwrap_or(base.missing_policy),
            label_policy: self.label_policy.unwrap_or(base.label_policy),
            stages: self.stages.unwrap_or(base.stages),
            numeric_columns,
            coerce_numeric_text: self.coerce_numeric_text.unwrap_or(base.coerce_numeric_text),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.window_size, 3);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.missing_policy, MissingValuePolicy::MedianImpute);
        assert_eq!(config.label_policy, LabelPolicy::Include);
        assert_eq!(config.stages, Stage::DEFAULT_ORDER.to_vec());
        assert!(config.coerce_numeric_text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .window_size(5)
            .iqr_multiplier(3.0)
            .missing_policy(MissingValuePolicy::NormalizeOnly)
            .drop_last_column(true)
            .numeric_column("bpm")
            .build()
            .unwrap();

        assert_eq!(config.window_size, 5);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.missing_policy, MissingValuePolicy::NormalizeOnly);
        assert_eq!(config.label_policy, LabelPolicy::Drop);
        assert_eq!(config.numeric_columns, vec!["bpm".to_string()]);
    }

    #[test]
    fn test_presets() {
        let normalize = PipelineConfig::from_preset(Preset::Normalize);
        assert_eq!(normalize.stages[0], Stage::ResolveMissing);
        assert_eq!(normalize.missing_policy, MissingValuePolicy::NormalizeOnly);
        assert_eq!(normalize.label_policy, LabelPolicy::TrimAsText);
        assert_eq!(normalize.iqr_multiplier, 1.5);

        let impute = PipelineConfig::from_preset(Preset::Impute);
        assert_eq!(impute.stages[0], Stage::Sanitize);
        assert_eq!(impute.missing_policy, MissingValuePolicy::MedianImpute);
        assert_eq!(impute.label_policy, LabelPolicy::Drop);
        assert_eq!(impute.iqr_multiplier, 3.0);
    }

    #[test]
    fn test_warnings_for_unused_label_policy() {
        assert!(PipelineConfig::from_preset(Preset::Normalize).warnings().is_empty());
        assert!(PipelineConfig::default().warnings().is_empty());

        let config = PipelineConfig::builder()
            .preset(Preset::Normalize)
            .stages([Stage::ResolveMissing, Stage::Sanitize, Stage::Smooth])
            .build()
            .unwrap();
        assert!(!config.runs(Stage::RejectOutliers));
        assert_eq!(config.warnings().len(), 1);

        let dropped = PipelineConfig::builder()
            .label_policy(LabelPolicy::Drop)
            .stages([Stage::Smooth])
            .build()
            .unwrap();
        assert!(dropped.warnings().is_empty());
    }

    #[test]
    fn test_builder_overrides_preset() {
        let config = PipelineConfig::builder()
            .preset(Preset::Impute)
            .iqr_multiplier(2.0)
            .build()
            .unwrap();

        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(config.label_policy, LabelPolicy::Drop);
    }

    #[test]
    fn test_validation_even_window() {
        let result = PipelineConfig::builder().window_size(4).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EvenWindowSize(4)
        ));

        let result = PipelineConfig::builder().window_size(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ZeroWindowSize
        ));
    }

    #[test]
    fn test_validation_multiplier() {
        for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let result = PipelineConfig::builder().iqr_multiplier(bad).build();
            assert!(
                matches!(result, Err(ConfigValidationError::InvalidMultiplier(_))),
                "multiplier {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_validation_stages() {
        let result = PipelineConfig::builder().stages([]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyStages
        ));

        let result = PipelineConfig::builder()
            .stages([Stage::Smooth, Stage::Sanitize, Stage::Smooth])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DuplicateStage(Stage::Smooth)
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "window_size": 5,
            "iqr_multiplier": 3.0,
            "missing_policy": "normalize_only",
            "label_policy": "trim_as_text",
            "stages": ["resolve_missing", "sanitize", "smooth", "reject_outliers"]
        }"#;

        let config: PipelineConfig = serde_json::from_str(json).expect("valid config JSON");

        assert_eq!(config.window_size, 5);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.missing_policy, MissingValuePolicy::NormalizeOnly);
        assert_eq!(config.label_policy, LabelPolicy::TrimAsText);
        assert_eq!(config.stages[0], Stage::ResolveMissing);
        // Unspecified fields fall back to defaults
        assert_eq!(config.edge_padding, EdgePadding::Zero);
        assert!(config.coerce_numeric_text);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PipelineConfig::from_preset(Preset::Impute);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
