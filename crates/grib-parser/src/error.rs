//! Error type for GRIB decoding.

use thiserror::Error;
use wind_common::WindError;

/// Errors raised while locating, parsing or unpacking GRIB messages.
#[derive(Debug, Error)]
pub enum GribError {
    #[error("Invalid GRIB data: {0}")]
    InvalidFormat(String),

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Unsupported GRIB edition {0}")]
    UnsupportedEdition(u8),

    #[error("Unsupported template {template} in section {section}")]
    UnsupportedTemplate { section: u8, template: u16 },

    #[error("Message at offset {offset} truncated: needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unpacking failed: {0}")]
    UnpackingError(String),

    #[error(transparent)]
    Grid(#[from] WindError),
}
