//! Rendering errors.

use std::path::PathBuf;

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas: {0}")]
    InvalidCanvas(String),

    #[error("SVG error: {0}")]
    Svg(#[from] usvg::Error),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid coastline data in {path}: {reason}")]
    Coastlines { path: PathBuf, reason: String },

    #[error("Invalid color '{0}'")]
    InvalidColor(String),
}
