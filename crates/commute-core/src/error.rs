use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the commute tracker.
#[derive(Error, Debug)]
pub enum TrackerError {
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

    /// The export holds neither a non-empty `timelineObjects` nor a
    /// non-empty `semanticSegments` list.
    #[error("Empty or unrecognized schema: no 'timelineObjects' or 'semanticSegments' found")]
    EmptyOrUnrecognizedSchema,

    /// A date argument was not a valid `YYYY-MM-DD` string.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The geocoding service failed or answered with an error status.
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// The home address did not resolve to any candidate.
    #[error("Could not geocode home address: {0}")]
    HomeUnresolved(String),

    /// None of the work destinations could be resolved.
    #[error("No work locations could be geocoded")]
    NoWorkLocations,

    /// The report file could not be written.
    #[error("Failed to write report {path}: {message}")]
    ReportWrite { path: PathBuf, message: String },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the tracker crates.
pub type Result<T> = std::result::Result<T, TrackerError>;
