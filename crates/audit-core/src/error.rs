use std::path::PathBuf;
use thiserror::Error;

/// All errors produced outside the pure report pipeline.
///
/// The pipeline itself never fails; these cover input loading, configuration
/// and output.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A record in an input file was not a JSON object.
    #[error("Invalid row in {path}: expected a JSON object, found {found}")]
    InvalidRow { path: PathBuf, found: String },

    /// No `.json` / `.jsonl` input files were found.
    #[error("No input files found in {0}")]
    NoInputFiles(PathBuf),

    /// The input holds more rows than the configured bound.
    #[error("Input has more than {limit} rows")]
    InputTooLarge { limit: usize },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the audit crates.
pub type Result<T> = std::result::Result<T, AuditError>;
