//! GRIB decoding for gridded wind fields.
//!
//! Pure Rust reader for WMO FM 92 GRIB edition 1 and edition 2 messages
//! on regular latitude/longitude grids with simple packing, which is what
//! marine and NWP wind products are distributed in.
//!
//! ```ignore
//! let mut reader = GribReader::new(bytes);
//! while let Some(message) = reader.next_message()? {
//!     let values = message.values()?;
//!     let (lats, lons) = message.latlons();
//! }
//! ```

pub mod bits;
pub mod error;
pub mod message;
pub mod reader;
pub mod sections;
pub mod tables;
pub mod unpacking;

pub use error::GribError;
pub use message::{ForecastTime, GribMessage, LatLonGrid};
pub use reader::GribReader;
pub use tables::{GribTables, LevelDescription, ParameterId, ParameterInfo};
pub use unpacking::{unpack_simple, SimplePacking};
