// Reasons a telemetry file cannot be turned into a dashboard
use std::path::PathBuf;
use thiserror::Error;

/// Every variant means the data is unavailable for the whole request.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read telemetry file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed telemetry CSV: {0}")]
    Malformed(String),
    #[error("telemetry CSV has no `timestamp` column")]
    MissingTimestamp,
    #[error("invalid timestamp {value:?} on line {line}")]
    InvalidTimestamp { line: usize, value: String },
    #[error("telemetry CSV contains no rows")]
    Empty,
    #[error("telemetry reader task failed: {0}")]
    Reader(String),
}
