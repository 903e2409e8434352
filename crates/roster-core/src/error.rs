//! Error types for roster-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in roster-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV document is structurally unusable
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Same unit id seen twice for one faction (strict mode only)
    #[error("duplicate unit id '{id}' in faction '{faction}'")]
    DuplicateUnitId { id: String, faction: String },

    /// Category name that maps to no unit type
    #[error("unknown unit category: {0}")]
    UnknownCategory(String),

    /// Generated source text without a unit array literal
    #[error("malformed generated source: {0}")]
    MalformedSource(String),

    /// Unrecognized option value
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
