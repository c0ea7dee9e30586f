use thiserror::Error;

/// Configuration rejected before any text is processed.
///
/// This is the only failure the pipeline reports to callers; everything past
/// validation degrades to empty or null fields instead of erroring.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_chunk_chars must be positive, got {0}")]
    InvalidChunkSize(usize),

    #[error("unknown chunking strategy: {0:?}")]
    UnknownStrategy(String),

    #[error("invalid pipeline config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure converting records to or from Arrow batches.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing column {0:?}")]
    MissingColumn(&'static str),

    #[error("column {column:?} is not {expected}")]
    ColumnType {
        column: &'static str,
        expected: &'static str,
    },

    #[error("null value in non-nullable column {column:?} at row {row}")]
    NullValue { column: &'static str, row: usize },
}
