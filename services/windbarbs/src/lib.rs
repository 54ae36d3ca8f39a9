//! Multi-panel wind barb maps from GRIB wind fields.
//!
//! One run reads one GRIB file, pairs its U/V wind messages into
//! snapshots, lays them out on a fixed-column grid of map panels and
//! writes a single PNG named after the first message's reference stamps.
//!
//! - [`loader`]: GRIB messages to [`Record`]s
//! - [`snapshot`]: U/V pairing, stride and grid layout
//! - [`panel`]: one map panel
//! - [`driver`]: the whole run

pub mod config;
pub mod driver;
pub mod error;
pub mod loader;
pub mod panel;
pub mod snapshot;

pub use config::{Config, Overrides, SpeedUnit};
pub use driver::{run, RunSummary};
pub use error::{PlotError, PlotResult};
pub use loader::{decode_records, extract_records, Record};
pub use panel::{magnitude, panel_title, render_panel, to_units, PanelOptions, KNOTS_PER_MS};
pub use snapshot::{
    pair_snapshots, reference_time, select_stride, GridLayout, LayoutPolicy, WindSnapshot,
};
