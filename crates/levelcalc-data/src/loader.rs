//! Format detection (RON/TOML/JSON/CSV), file discovery, and deserialization
//! helpers used by the season and config loaders.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::sheet::{self, CsvSheet};

// ===========================================================================
// Errors
// ===========================================================================

/// Why a sheet or config file could not be turned into data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// Extension is not ron / toml / json / csv, or the format cannot
    /// carry the requested shape.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same base name exists in two formats; neither is preferred.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// Syntax or shape error reported by the format's parser.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A row parsed but its values make no sense (no level, negative cost).
    #[error("invalid row {row} in {file}: {detail}")]
    InvalidRow {
        file: PathBuf,
        row: usize,
        detail: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
    Csv,
}

const EXTENSIONS: [&str; 4] = ["ron", "toml", "json", "csv"];

/// Format from the file extension alone.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        Some("csv") => Ok(Format::Csv),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Locate `{base_name}.{ron,toml,json,csv}` in `dir`.
///
/// `Ok(None)` when none exists; `ConflictingFormats` when more than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut hits = EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{base_name}.{ext}")))
        .filter(|candidate| candidate.exists());

    let Some(first) = hits.next() else {
        return Ok(None);
    };
    match hits.next() {
        Some(second) => Err(DataLoadError::ConflictingFormats { a: first, b: second }),
        None => Ok(Some(first)),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_err(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

fn unsupported(path: &Path) -> DataLoadError {
    DataLoadError::UnsupportedFormat {
        file: path.to_path_buf(),
    }
}

fn from_str_as<T: DeserializeOwned>(
    format: Format,
    content: &str,
    path: &Path,
) -> Result<T, DataLoadError> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(path, e)),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(path, e)),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(path, e)),
        Format::Csv => Err(unsupported(path)),
    }
}

/// Read a structured file and deserialize it according to its format.
/// CSV has no nested structure and is rejected here; use [`read_sheet`].
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    if format == Format::Csv {
        return Err(unsupported(path));
    }
    let content = std::fs::read_to_string(path)?;
    from_str_as(format, &content, path)
}

/// Read a row list. RON and JSON files hold the list at the top level; TOML
/// cannot, so its rows live under `toml_key` (`[[rows]]`).
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    if format == Format::Csv {
        return Err(unsupported(path));
    }
    let content = std::fs::read_to_string(path)?;

    if format != Format::Toml {
        return from_str_as(format, &content, path);
    }
    let table: toml::Value = toml::from_str(&content).map_err(|e| parse_err(path, e))?;
    let array = table
        .get(toml_key)
        .ok_or_else(|| parse_err(path, format!("missing key '{toml_key}' in TOML file")))?
        .clone();
    array
        .try_into()
        .map_err(|e: toml::de::Error| parse_err(path, e))
}

/// Read a CSV file into a header-normalized sheet.
pub fn read_sheet(path: &Path) -> Result<CsvSheet, DataLoadError> {
    if detect_format(path)? != Format::Csv {
        return Err(unsupported(path));
    }
    let content = std::fs::read_to_string(path)?;
    sheet::parse(&content).map_err(|e| parse_err(path, e))
}

// ===========================================================================
// Tests
// ===========================================================================
