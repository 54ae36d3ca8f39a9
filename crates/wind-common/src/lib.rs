//! Common types and utilities shared across the windbarbs crates.

pub mod bbox;
pub mod component;
pub mod error;
pub mod grid;
pub mod time;

pub use bbox::BoundingBox;
pub use component::WindComponent;
pub use error::{WindError, WindResult};
pub use grid::{GridField, ScanMode};
pub use time::{format_panel_time, panel_offset_hours, panel_time, parse_reference_time, DataStamp};
