//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Recording could not be opened or read
    #[error("failed to read recording {path}: {source}")]
    RecordingIo {
        /// Recording path
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A recording line is not a valid reading
    #[error("recording {path} line {line}: {message}")]
    RecordingParse {
        /// Recording path
        path: String,
        /// 1-based line number
        line: usize,
        /// Decoder message
        message: String,
    },

    /// Source configuration cannot produce readings
    #[error("invalid source {source_id}: {message}")]
    InvalidSource {
        /// Source ID
        source_id: String,
        /// Reason
        message: String,
    },
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
