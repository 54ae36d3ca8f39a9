//! Run configuration.
//!
//! Values come from three layers: built-in defaults, an optional YAML
//! file, then command-line overrides.
//!
//! ```yaml
//! input: data/Mediterranean.wind.3day.grb
//! output_dir: plots
//! stride: 2
//! columns: 3
//! units: knots
//! layout: pad
//! coastlines: data/land.geojson
//! barbs:
//!   length: 7
//! ```

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use renderer::{BarbStyle, MapStyle, DEFAULT_AREA_THRESHOLD_KM2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlotError, PlotResult};
use crate::snapshot::LayoutPolicy;

/// Unit the barbs are drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum SpeedUnit {
    #[serde(rename = "ms")]
    #[value(name = "ms")]
    MetersPerSecond,
    #[default]
    #[serde(rename = "knots")]
    #[value(name = "knots")]
    Knots,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Plot every `stride`-th snapshot
    #[serde(default = "default_stride")]
    pub stride: usize,
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Size of one panel in inches
    #[serde(default = "default_panel_width")]
    pub panel_width_in: f64,
    #[serde(default = "default_panel_height")]
    pub panel_height_in: f64,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default)]
    pub units: SpeedUnit,
    /// Hours between consecutive snapshots
    #[serde(default = "default_step_hours")]
    pub step_hours: u32,
    #[serde(default)]
    pub layout: LayoutPolicy,
    /// GeoJSON land polygons; the bundled outline is used when unset
    #[serde(default)]
    pub coastlines: Option<PathBuf>,
    /// TrueType font for titles and labels; DejaVu Sans when unset
    #[serde(default)]
    pub font: Option<PathBuf>,
    /// Land polygons smaller than this are not drawn
    #[serde(default = "default_area_thresh")]
    pub area_thresh_km2: f64,
    /// Log a summary of every decoded message
    #[serde(default = "default_diagnostics")]
    pub diagnostics: bool,
    #[serde(default)]
    pub barbs: BarbStyle,
    #[serde(default)]
    pub map: MapStyle,
}

fn default_input() -> PathBuf {
    PathBuf::from("Mediterranean.wind.3day.grb")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_stride() -> usize {
    1
}

fn default_columns() -> usize {
    3
}

fn default_panel_width() -> f64 {
    10.0
}

fn default_panel_height() -> f64 {
    6.0
}

fn default_dpi() -> u32 {
    150
}

fn default_step_hours() -> u32 {
    6
}

fn default_area_thresh() -> f64 {
    DEFAULT_AREA_THRESHOLD_KM2
}

fn default_diagnostics() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            stride: default_stride(),
            columns: default_columns(),
            panel_width_in: default_panel_width(),
            panel_height_in: default_panel_height(),
            dpi: default_dpi(),
            units: SpeedUnit::default(),
            step_hours: default_step_hours(),
            layout: LayoutPolicy::default(),
            coastlines: None,
            font: None,
            area_thresh_km2: default_area_thresh(),
            diagnostics: default_diagnostics(),
            barbs: BarbStyle::default(),
            map: MapStyle::default(),
        }
    }
}

impl Config {
    /// Parse a YAML document; missing keys take their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn load(path: &Path) -> PlotResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PlotError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::from_yaml(&text).map_err(|e| PlotError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Replace every field the overrides set.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(stride) = overrides.stride {
            self.stride = stride;
        }
        if let Some(columns) = overrides.columns {
            self.columns = columns;
        }
        if let Some(dpi) = overrides.dpi {
            self.dpi = dpi;
        }
        if let Some(units) = overrides.units {
            self.units = units;
        }
        if let Some(layout) = overrides.layout {
            self.layout = layout;
        }
        if let Some(coastlines) = overrides.coastlines {
            self.coastlines = Some(coastlines);
        }
        if let Some(font) = overrides.font {
            self.font = Some(font);
        }
        if overrides.quiet {
            self.diagnostics = false;
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        let invalid = |msg: &str| Err(PlotError::InvalidConfig(msg.to_string()));
        if self.stride == 0 {
            return invalid("stride must be at least 1");
        }
        if self.columns == 0 {
            return invalid("columns must be at least 1");
        }
        if self.dpi == 0 {
            return invalid("dpi must be at least 1");
        }
        if self.step_hours == 0 {
            return invalid("step_hours must be at least 1");
        }
        if !(self.panel_width_in > 0.0 && self.panel_height_in > 0.0) {
            return invalid("panel size must be positive");
        }
        if self.area_thresh_km2.is_nan() || self.area_thresh_km2 < 0.0 {
            return invalid("area_thresh_km2 must not be negative");
        }
        Ok(())
    }

    /// `<output_dir>/<stem>.png`
    pub fn output_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.png", stem))
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub stride: Option<usize>,
    pub columns: Option<usize>,
    pub dpi: Option<u32>,
    pub units: Option<SpeedUnit>,
    pub layout: Option<LayoutPolicy>,
    pub coastlines: Option<PathBuf>,
    pub font: Option<PathBuf>,
    /// Turn off per-message diagnostics
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input, PathBuf::from("Mediterranean.wind.3day.grb"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.stride, 1);
        assert_eq!(config.columns, 3);
        assert_eq!((config.panel_width_in, config.panel_height_in), (10.0, 6.0));
        assert_eq!(config.dpi, 150);
        assert_eq!(config.units, SpeedUnit::Knots);
        assert_eq!(config.step_hours, 6);
        assert_eq!(config.layout, LayoutPolicy::Pad);
        assert_eq!(config.area_thresh_km2, 10000.0);
        assert!(config.diagnostics);
        assert!(config.coastlines.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
input: data/wind.grb2
stride: 2
units: ms
layout: strict
barbs:
  length: 7
  flag_color: blue
map:
  land:
    color: green
    alpha: 0.5
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.input, PathBuf::from("data/wind.grb2"));
        assert_eq!(config.stride, 2);
        assert_eq!(config.columns, 3);
        assert_eq!(config.units, SpeedUnit::MetersPerSecond);
        assert_eq!(config.layout, LayoutPolicy::Strict);
        assert_eq!(config.barbs.length, 7.0);
        assert_eq!(config.barbs.flag_color, "blue");
        assert_eq!(config.barbs.barb_color, "black");
        assert_eq!(config.map.land.alpha, 0.5);
        assert_eq!(config.map.coastline_width, 1.0);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        assert!(Config::from_yaml("units: mph").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::from_yaml("stride: 2\ncolumns: 4\n").unwrap();
        config.apply(Overrides {
            stride: Some(3),
            output_dir: Some(PathBuf::from("/tmp/plots")),
            layout: Some(LayoutPolicy::Truncate),
            quiet: true,
            ..Default::default()
        });
        assert_eq!(config.stride, 3);
        assert_eq!(config.columns, 4);
        assert_eq!(config.layout, LayoutPolicy::Truncate);
        assert!(!config.diagnostics);
        assert_eq!(
            config.output_path("t_0__20140201_600"),
            PathBuf::from("/tmp/plots/t_0__20140201_600.png")
        );
    }

    #[test]
    fn test_validate_rejects_zero_stride() {
        let config = Config {
            stride: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlotError::InvalidConfig(_))));

        let config = Config {
            columns: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/windbarbs.yaml")).unwrap_err();
        assert!(matches!(err, PlotError::Config { .. }));
    }
}
