//! Error types for cubical persistence.
//!
//! Every fallible operation in the crate returns [`TdaResult`]. All errors are
//! terminal for the operation that raised them: nothing is retried and no
//! partial result is returned, so the caller fixes its parameters and re-runs.

use thiserror::Error;

/// Convenient `Result` alias used throughout the crate.
pub type TdaResult<T> = Result<T, TdaError>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum TdaError {
    /// Bad precision or margin, a degenerate axis, or non-finite coordinates.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// The density field produced values that cannot be normalised.
    #[error("Invalid density field: {0}")]
    InvalidDensityField(String),

    /// A cube entered the filtration before one of its faces, or out of order.
    #[error("Non-monotone filtration: {0}")]
    NonMonotoneFiltration(String),

    /// A point cloud without points or without axes.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A tunable parameter outside its documented range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed point data (ragged axes, unparsable CSV values).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
