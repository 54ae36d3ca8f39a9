//! Raster rendering of multi-panel wind maps.
//!
//! - [`figure`]: figure, subplot axes and per-panel canvases
//! - [`barbs`]: wind barb glyphs (SVG via usvg/resvg)
//! - [`map`]: frame, graticule, land, coastlines and titles
//! - [`coastline`]: GeoJSON coastline polygons
//! - [`text`]: TrueType text
//! - [`png`]: PNG encoding with a resolution chunk

pub mod barbs;
pub mod coastline;
pub mod error;
pub mod figure;
pub mod map;
pub mod png;
pub mod style;
pub mod text;

pub use barbs::{uv_to_speed_direction, BarbRenderer, BarbShape};
pub use coastline::{Coastlines, LandPolygon, DEFAULT_AREA_THRESHOLD_KM2};
pub use error::{RenderError, RenderResult};
pub use figure::{Axes, Canvas, Figure, SubplotParams};
pub use style::{BarbStyle, ColorSpec, MapStyle};
pub use text::{HAlign, TextRenderer, VAlign};
