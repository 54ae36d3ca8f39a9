//! Wind vector component tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which horizontal component of the wind vector a grid carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindComponent {
    /// Eastward component.
    U,
    /// Northward component.
    V,
}

impl WindComponent {
    /// Map a parameter short name onto a component.
    ///
    /// Accepts the NCEP names (`UGRD`/`VGRD`) and the ECMWF names
    /// (`10u`/`10v`, `u`/`v`).
    pub fn from_short_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "UGRD" | "U" | "10U" | "100U" => Some(Self::U),
            "VGRD" | "V" | "10V" | "100V" => Some(Self::V),
            _ => None,
        }
    }
}

impl fmt::Display for WindComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U => write!(f, "U"),
            Self::V => write!(f, "V"),
        }
    }
}
