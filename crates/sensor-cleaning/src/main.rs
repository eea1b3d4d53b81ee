//! CLI entry point for the sensor data cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use sensor_cleaning::io::{file_stem, load_table};
use sensor_cleaning::{
    CleaningReport, CleaningResult, EdgePadding, LabelPolicy, MissingValuePolicy, Pipeline,
    PipelineConfig, Preset, ReportGenerator,
};
use std::path::Path;
use tracing::{error, info};

/// CLI-compatible preset enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPreset {
    /// Normalize NA markers first, 1.5 IQR fence, label kept as text
    Normalize,
    /// Median-impute, 3.0 IQR fence, label column dropped
    Impute,
}

impl From<CliPreset> for Preset {
    fn from(cli: CliPreset) -> Self {
        match cli {
            CliPreset::Normalize => Preset::Normalize,
            CliPreset::Impute => Preset::Impute,
        }
    }
}

/// CLI-compatible missing value policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingPolicy {
    /// Recognize NA markers; leave absent cells absent
    Normalize,
    /// Fill absent numeric cells with the column median
    Median,
}

impl From<CliMissingPolicy> for MissingValuePolicy {
    fn from(cli: CliMissingPolicy) -> Self {
        match cli {
            CliMissingPolicy::Normalize => MissingValuePolicy::NormalizeOnly,
            CliMissingPolicy::Median => MissingValuePolicy::MedianImpute,
        }
    }
}

/// CLI-compatible label policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLabelPolicy {
    /// Treat the last column like any other
    Include,
    /// Skip the last column during outlier rejection
    Exempt,
    /// Render the last column as text and trim one trailing ';'
    TrimAsText,
    /// Remove the last column before cleaning
    Drop,
}

impl From<CliLabelPolicy> for LabelPolicy {
    fn from(cli: CliLabelPolicy) -> Self {
        match cli {
            CliLabelPolicy::Include => LabelPolicy::Include,
            CliLabelPolicy::Exempt => LabelPolicy::Exempt,
            CliLabelPolicy::TrimAsText => LabelPolicy::TrimAsText,
            CliLabelPolicy::Drop => LabelPolicy::Drop,
        }
    }
}

/// CLI-compatible edge padding enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEdgePadding {
    /// Out-of-range neighbours are 0.0
    Zero,
    /// Out-of-range neighbours repeat the edge value
    Nearest,
}

impl From<CliEdgePadding> for EdgePadding {
    fn from(cli: CliEdgePadding) -> Self {
        match cli {
            CliEdgePadding::Zero => EdgePadding::Zero,
            CliEdgePadding::Nearest => EdgePadding::Nearest,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Deterministic cleaning pipeline for sensor data",
    long_about = "Cleans a .csv or .txt table: strips trailing ';' artifacts, resolves NA markers,\n\
                  applies a median filter and nulls IQR outliers. Prints the number of missing\n\
                  values left in the cleaned output.\n\n\
                  EXAMPLES:\n  \
                  # Default pipeline\n  \
                  sensor-cleaning -i heart.txt\n\n  \
                  # Median imputation variant with a wider window\n  \
                  sensor-cleaning -i heart.csv --preset impute --window-size 5\n\n  \
                  # Configuration file plus a JSON report\n  \
                  sensor-cleaning -i heart.csv --config cleaning.json -r"
)]
struct Args {
    /// Path to the .csv or .txt file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned file and report
    #[arg(short, long, default_value = "./uploads")]
    output: String,

    /// JSON configuration file (missing fields take defaults)
    #[arg(long, conflicts_with = "preset")]
    config: Option<String>,

    /// Start from a named preset
    #[arg(long, value_enum)]
    preset: Option<CliPreset>,

    /// Median filter window (odd, >= 1)
    #[arg(long)]
    window_size: Option<usize>,

    /// Edge padding of the median filter
    #[arg(long, value_enum)]
    edge_padding: Option<CliEdgePadding>,

    /// IQR fence multiplier (> 0)
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Missing value policy
    #[arg(long, value_enum)]
    missing_policy: Option<CliMissingPolicy>,

    /// Treatment of the last (label) column
    #[arg(long, value_enum)]
    label_policy: Option<CliLabelPolicy>,

    /// Column that must be numeric after NA normalization (repeatable)
    #[arg(long = "numeric-column")]
    numeric_columns: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config.clone())?;

    let table = load_table(&args.input)
        .with_context(|| format!("Failed to load {}", args.input))?;

    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let result = pipeline.run(table).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed: {}", e)
    })?;

    handle_pipeline_output(&result, &config, &args)
}

/// Resolve the configuration: file or preset first, then flag overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match (&args.config, args.preset) {
        (Some(path), _) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        (None, Some(preset)) => PipelineConfig::from_preset(preset.into()),
        (None, None) => PipelineConfig::default(),
    };

    let mut builder = PipelineConfig::builder()
        .window_size(args.window_size.unwrap_or(base.window_size))
        .edge_padding(args.edge_padding.map(Into::into).unwrap_or(base.edge_padding))
        .iqr_multiplier(args.iqr_multiplier.unwrap_or(base.iqr_multiplier))
        .missing_policy(args.missing_policy.map(Into::into).unwrap_or(base.missing_policy))
        .label_policy(args.label_policy.map(Into::into).unwrap_or(base.label_policy))
        .stages(base.stages.iter().copied())
        .coerce_numeric_text(base.coerce_numeric_text);

    for name in base.numeric_columns.iter().chain(&args.numeric_columns) {
        builder = builder.numeric_column(name);
    }

    Ok(builder.build()?)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn handle_pipeline_output(
    result: &CleaningResult,
    config: &PipelineConfig,
    args: &Args,
) -> Result<()> {
    let input_stem = file_stem(&args.input);
    let generator = ReportGenerator::new(&args.output);

    let output_path = generator.write_table(&result.table, &args.input)?;
    let output_file = output_path.display().to_string();

    let report = CleaningReport::new(&args.input, Some(output_file.as_str()), config, result);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report, args);

    Ok(())
}

/// Print a human-readable summary of the cleaning results.
fn print_human_readable_summary(report: &CleaningReport, args: &Args) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, summary.rows, summary.columns_before
    );
    if let Some(ref output_file) = report.output_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            output_file, report.final_shape.0, report.final_shape.1
        );
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Absent cells: {} -> {}",
        summary.absent_before, summary.absent_after
    );
    println!("  Completeness: {:.1}%", report.completeness * 100.0);
    for stage in &summary.stages {
        println!(
            "  {:<24} {:>6} cells changed, {:>6} absent after",
            stage.stage.display_name(),
            stage.cells_changed,
            stage.absent_after
        );
    }
    println!();

    if !summary.actions.is_empty() {
        println!("Actions Taken:");
        for action in summary.actions.iter().take(10) {
            println!(
                "  - [{}] {}: {}",
                action.action_type.display_name(),
                action.target,
                action.description
            );
        }
        if summary.actions.len() > 10 {
            println!("  ... and {} more actions", summary.actions.len() - 10);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("Warnings:");
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Missing values: {}", report.missing_values);
    println!();

    if !args.emit_report {
        println!("Use --emit-report to save a JSON report");
    }
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
