//! Error types shared by the windbarbs crates.

use thiserror::Error;

/// Result type alias using WindError.
pub type WindResult<T> = Result<T, WindError>;

/// Errors raised by the shared value types.
#[derive(Debug, Error)]
pub enum WindError {
    #[error("Invalid date stamp {date} / time stamp {time}: {reason}")]
    InvalidStamp { date: u32, time: u32, reason: String },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Grid shape mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
}
