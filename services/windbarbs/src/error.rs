//! Error type for the plotting pipeline.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use grib_parser::GribError;
use renderer::RenderError;
use thiserror::Error;
use wind_common::{DataStamp, WindComponent, WindError};

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GRIB message {index}: {source}")]
    Grib {
        index: usize,
        #[source]
        source: GribError,
    },

    #[error("Invalid reference time: {0}")]
    Stamp(#[source] WindError),

    #[error("No {missing} component for validity time {time} (found {found} only)")]
    UnpairedComponent {
        time: NaiveDateTime,
        found: WindComponent,
        missing: WindComponent,
    },

    #[error("Second {component} component for validity time {time} in message {index}")]
    DuplicateComponent {
        time: NaiveDateTime,
        component: WindComponent,
        index: usize,
    },

    #[error("U grid is {u_width}x{u_height} but V grid is {v_width}x{v_height} at {time}")]
    ShapeMismatch {
        time: NaiveDateTime,
        u_width: usize,
        u_height: usize,
        v_width: usize,
        v_height: usize,
    },

    #[error("U stamps {u:?} differ from V stamps {v:?}")]
    TimeMismatch { u: DataStamp, v: DataStamp },

    #[error("{panels} panels do not fill rows of {columns} columns")]
    LayoutMismatch { panels: usize, columns: usize },

    #[error("No wind panels to plot")]
    NoPanels,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Grid(#[from] WindError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to load config {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}
