//! Colors and drawing styles for the map panels.
//!
//! Styles deserialize from the `style` block of the run configuration;
//! every field has a default matching the classic barb map look.

use serde::{Deserialize, Serialize};
use tiny_skia::Color;

use crate::error::{RenderError, RenderResult};

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Named colors understood besides `#rrggbb`.
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("red", (255, 0, 0)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("coral", (255, 127, 80)),
    ("blue", (0, 0, 255)),
    ("navy", (0, 0, 128)),
];

/// Parse `#rrggbb` or a color name into RGB.
pub fn parse_color(spec: &str) -> RenderResult<(u8, u8, u8)> {
    let trimmed = spec.trim();
    if trimmed.starts_with('#') {
        return hex_to_rgb(trimmed).ok_or_else(|| RenderError::InvalidColor(spec.to_string()));
    }
    NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, rgb)| *rgb)
        .ok_or_else(|| RenderError::InvalidColor(spec.to_string()))
}

/// A color with opacity, as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub color: String,
    #[serde(default = "opaque")]
    pub alpha: f32,
}

fn opaque() -> f32 {
    1.0
}

impl ColorSpec {
    pub fn new(color: &str, alpha: f32) -> Self {
        Self {
            color: color.to_string(),
            alpha,
        }
    }

    pub fn to_color(&self) -> RenderResult<Color> {
        let (r, g, b) = parse_color(&self.color)?;
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Ok(Color::from_rgba8(r, g, b, a))
    }

    pub fn rgb(&self) -> RenderResult<(u8, u8, u8)> {
        parse_color(&self.color)
    }
}

/// Wind barb appearance. Lengths are in points (1/72 inch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarbStyle {
    /// Staff length
    pub length: f32,
    pub line_width: f32,
    pub barb_color: String,
    /// Fill of the 50-knot pennants
    pub flag_color: String,
}

impl Default for BarbStyle {
    fn default() -> Self {
        Self {
            length: 6.0,
            line_width: 0.5,
            barb_color: "black".to_string(),
            flag_color: "red".to_string(),
        }
    }
}

/// Map furniture appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    pub coastline: ColorSpec,
    pub coastline_width: f32,
    pub land: ColorSpec,
    pub graticule: ColorSpec,
    pub graticule_width: f32,
    /// On/off dash lengths of graticule lines, in points
    pub graticule_dash: [f32; 2],
    /// Point sizes
    pub label_size: f32,
    pub title_size: f32,
    pub suptitle_size: f32,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            coastline: ColorSpec::new("gray", 1.0),
            coastline_width: 1.0,
            land: ColorSpec::new("coral", 0.2),
            graticule: ColorSpec::new("black", 1.0),
            graticule_width: 0.5,
            graticule_dash: [1.0, 1.0],
            label_size: 9.0,
            title_size: 12.0,
            suptitle_size: 14.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("00ff7f"), Some((0, 255, 127)));
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
        assert_eq!(hex_to_rgb("#€abc"), None);
        assert!(parse_color("#ab€c").is_err());
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("coral").unwrap(), (255, 127, 80));
        assert_eq!(parse_color("Red").unwrap(), (255, 0, 0));
        assert!(matches!(parse_color("mauve"), Err(RenderError::InvalidColor(_))));
    }

    #[test]
    fn test_paint_alpha() {
        let color = ColorSpec::new("coral", 0.2).to_color().unwrap();
        assert!((color.alpha() - 51.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_style_defaults_from_partial_yaml_like_json() {
        let style: BarbStyle = serde_json::from_str(r#"{"length": 8.0}"#).unwrap();
        assert_eq!(style.length, 8.0);
        assert_eq!(style.flag_color, "red");
    }
}
