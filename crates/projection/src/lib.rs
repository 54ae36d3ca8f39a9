//! Map geometry for the wind panels.
//!
//! A cylindrical equidistant projection bounded by the data extent, the
//! graticule drawn over it, and the regular mesh the barbs are placed on.
//! Implemented from scratch without external dependencies.

pub mod equirectangular;
pub mod graticule;
pub mod mesh;

pub use equirectangular::{Equirectangular, Frame, Viewport};
pub use graticule::{
    format_latitude, format_longitude, ticks, Graticule, GraticuleLine, LineKind,
    DEFAULT_MERIDIANS, DEFAULT_PARALLELS,
};
pub use mesh::{ColumnOrder, RegularMesh, RowOrder};
