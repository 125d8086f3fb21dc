use thiserror::Error;

/// Fatal failures of a profile computation.
///
/// Per-row and per-file problems are swallowed inside the pipeline and
/// never reach this type; these variants are the only ways a compute
/// invocation fails, and each maps to a distinct status for the
/// response layer.
#[derive(Debug, Error)]
pub enum StatsError {
    /// No source files were found, or none could be read at all.
    #[error("no source data found at {path}")]
    NoSourceData { path: String },

    /// Files were readable, but no header across any of them carried a
    /// usable identity or name/artist column.
    #[error("source data present but no usable identity or name columns found")]
    MissingColumns,

    /// The compute deadline passed before ingestion finished. No
    /// partial result is returned in this case.
    #[error("profile computation timed out")]
    Timeout,

    /// An unexpected internal failure during aggregation.
    #[error("profile computation failed: {0}")]
    Unexpected(String),
}
