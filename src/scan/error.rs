//! Error types for the scan pipeline

use thiserror::Error;

/// Errors that abort a scan run
///
/// Per-instrument problems never surface here; they become
/// [`SkipReason`](crate::scan::loader::SkipReason) values so the batch
/// keeps going.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Every candidate file was skipped during loading
    #[error("no usable instrument data: {candidates} file(s) examined, all skipped")]
    NoUsableData { candidates: usize },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (data directory or report output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
