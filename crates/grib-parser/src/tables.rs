//! Parameter and level lookup tables for both GRIB editions.
//!
//! Translates numeric codes into the short names and units that wgrib and
//! ecCodes print (`UGRD`, `m s**-1`, `10 m above ground`, ...).

use std::collections::HashMap;

/// Identifies a parameter independently of the edition that encoded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterId {
    /// GRIB1: (table version, parameter number)
    Edition1 { table: u8, number: u8 },
    /// GRIB2: (discipline, category, number)
    Edition2 { discipline: u8, category: u8, number: u8 },
}

/// Short name and units of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub short_name: String,
    pub units: String,
}

/// Level description - either static text or a template with {value} placeholder
#[derive(Debug, Clone)]
pub enum LevelDescription {
    /// Static description (e.g., "surface", "mean sea level")
    Static(String),
    /// Template with {value} placeholder (e.g., "{value} mb", "{value} m above ground")
    Template(String),
}

impl LevelDescription {
    /// Format the level description, substituting placeholders if it's a template.
    ///
    /// Supported placeholders:
    /// - `{value}` - Raw level value
    /// - `{value_mb}` - Value converted from Pa to mb (divided by 100)
    pub fn format(&self, value: u32) -> String {
        match self {
            LevelDescription::Static(s) => s.clone(),
            LevelDescription::Template(t) => t
                .replace("{value}", &value.to_string())
                .replace("{value_mb}", &(value / 100).to_string()),
        }
    }
}

/// Parameter and level lookup tables.
#[derive(Debug, Clone, Default)]
pub struct GribTables {
    parameters: HashMap<ParameterId, ParameterInfo>,
    /// (edition, level_type) -> description pattern
    levels: HashMap<(u8, u8), LevelDescription>,
}

impl GribTables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables covering the WMO wind, pressure and temperature parameters
    /// and the common level types of both editions.
    pub fn standard() -> Self {
        let mut tables = Self::new();

        // GRIB1 WMO table 2 (versions 1-3 share these entries)
        for table in 1..=3 {
            for (number, name, units) in [
                (1, "PRES", "Pa"),
                (2, "PRMSL", "Pa"),
                (7, "HGT", "gpm"),
                (11, "TMP", "K"),
                (31, "WDIR", "deg"),
                (32, "WIND", "m s**-1"),
                (33, "UGRD", "m s**-1"),
                (34, "VGRD", "m s**-1"),
                (52, "RH", "%"),
                (61, "APCP", "kg m**-2"),
                (180, "GUST", "m s**-1"),
            ] {
                tables.add_parameter(ParameterId::Edition1 { table, number }, name, units);
            }
        }

        // GRIB2 discipline 0
        for (category, number, name, units) in [
            (0, 0, "TMP", "K"),
            (1, 1, "RH", "%"),
            (2, 0, "WDIR", "deg"),
            (2, 1, "WIND", "m s**-1"),
            (2, 2, "UGRD", "m s**-1"),
            (2, 3, "VGRD", "m s**-1"),
            (2, 22, "GUST", "m s**-1"),
            (3, 0, "PRES", "Pa"),
            (3, 1, "PRMSL", "Pa"),
            (3, 5, "HGT", "gpm"),
        ] {
            tables.add_parameter(
                ParameterId::Edition2 {
                    discipline: 0,
                    category,
                    number,
                },
                name,
                units,
            );
        }

        use LevelDescription::{Static, Template};
        for (edition, level_type, description) in [
            (1, 1, Static("surface".to_string())),
            (1, 100, Template("{value} mb".to_string())),
            (1, 102, Static("mean sea level".to_string())),
            (1, 103, Template("{value} m above MSL".to_string())),
            (1, 105, Template("{value} m above ground".to_string())),
            (2, 1, Static("surface".to_string())),
            (2, 100, Template("{value_mb} mb".to_string())),
            (2, 101, Static("mean sea level".to_string())),
            (2, 102, Template("{value} m above MSL".to_string())),
            (2, 103, Template("{value} m above ground".to_string())),
        ] {
            tables.add_level(edition, level_type, description);
        }

        tables
    }

    /// Add a parameter mapping
    pub fn add_parameter(&mut self, id: ParameterId, short_name: &str, units: &str) {
        self.parameters.insert(
            id,
            ParameterInfo {
                short_name: short_name.to_string(),
                units: units.to_string(),
            },
        );
    }

    /// Add a level description mapping
    pub fn add_level(&mut self, edition: u8, level_type: u8, description: LevelDescription) {
        self.levels.insert((edition, level_type), description);
    }

    /// Look up a parameter, falling back to a name built from its codes
    /// (`var33` for GRIB1, `P0_2_2` for GRIB2) and unknown units.
    pub fn parameter(&self, id: ParameterId) -> ParameterInfo {
        self.parameters.get(&id).cloned().unwrap_or_else(|| {
            let short_name = match id {
                ParameterId::Edition1 { number, .. } => format!("var{}", number),
                ParameterId::Edition2 {
                    discipline,
                    category,
                    number,
                } => format!("P{}_{}_{}", discipline, category, number),
            };
            ParameterInfo {
                short_name,
                units: "unknown".to_string(),
            }
        })
    }

    /// Look up level description by edition, type code and value.
    pub fn level_description(&self, edition: u8, level_type: u8, level_value: u32) -> String {
        match self.levels.get(&(edition, level_type)) {
            Some(desc) => desc.format(level_value),
            None => format!("Level type {} value {}", level_type, level_value),
        }
    }
}
