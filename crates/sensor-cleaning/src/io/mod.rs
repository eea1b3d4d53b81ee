//! Loading and writing tables.
//!
//! `.csv` files are read with polars (header row, schema inference over the
//! first 100 rows). `.txt` exports separate fields with either `;` or `,`
//! and are split with a regex. Output is always comma-separated CSV.

mod frame;

use crate::error::{CleaningError, Result, ResultExt};
use crate::table::Table;
use once_cell::sync::Lazy;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// Field separator of `.txt` exports - compiled once at startup
static TXT_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;,]").expect("Invalid regex: TXT delimiter"));

/// Rows used by polars to infer the schema of a CSV file.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a table from a `.csv` or `.txt` file.
///
/// # Errors
///
/// - [`CleaningError::UnsupportedFormat`] for any other extension.
/// - [`CleaningError::MalformedInput`] for rows with more fields than the
///   header.
/// - IO and polars errors while reading.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    info!("Loading dataset from: {}", path.display());
    let table = match extension.as_str() {
        "csv" => load_csv(path)?,
        "txt" => load_txt(path)?,
        _ => return Err(CleaningError::UnsupportedFormat(path.display().to_string())),
    };
    info!("Dataset loaded: {:?}", table.shape());

    Ok(table)
}

/// Read a comma-separated file with a header row.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    debug!("Read {:?} with dtypes {:?}", df.shape(), df.dtypes());
    Table::from_dataframe(&df)
}

/// Read a `;`/`,` separated text export. The first line is the header.
pub fn load_txt(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    parse_delimited(&content)
}

/// Parse delimited text whose fields are separated by `;` or `,`.
///
/// Blank lines are skipped. When every line ends with a delimiter, the empty
/// trailing field it produces is dropped.
pub fn parse_delimited(content: &str) -> Result<Table> {
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let Some((header_line, data_lines)) = lines.split_first() else {
        return Ok(Table::default());
    };

    let trailing_delimiter = lines
        .iter()
        .all(|line| line.ends_with([';', ',']));

    let split = |line: &str| -> Vec<String> {
        let mut fields: Vec<String> = TXT_DELIMITER.split(line).map(str::to_string).collect();
        if trailing_delimiter {
            fields.pop();
        }
        fields
    };

    let headers = split(*header_line);
    let records: Vec<Vec<String>> = data_lines.iter().map(|&line| split(line)).collect();
    debug!(
        "Split {} records into {} fields (trailing delimiter: {})",
        records.len(),
        headers.len(),
        trailing_delimiter
    );

    Table::from_records(&headers, &records)
}

/// Write a table as comma-separated CSV with a header row.
///
/// Absent cells are written as empty fields.
pub fn write_csv_to<W: Write>(table: &Table, writer: &mut W) -> Result<()> {
    let mut df = table.to_dataframe()?;
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context("Failed to write CSV")?;
    Ok(())
}

/// Write a table to a CSV file, creating parent directories as needed.
pub fn write_csv(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    write_csv_to(table, &mut file)?;
    info!("Dataset saved: {}", path.display());
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
pub fn file_stem(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Output path of the cleaned table for an input file: `<stem>_cleaned.csv`
/// inside `output_dir`.
pub fn cleaned_output_path(input: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("{}_cleaned.csv", file_stem(input)))
}
