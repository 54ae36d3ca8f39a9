//! Wind barb glyphs.
//!
//! A speed is rounded to the nearest 5 knots and decomposed into 50-knot
//! pennants, 10-knot barbs and a 5-knot half barb; calm winds get an empty
//! circle. Each distinct glyph is generated once as SVG, parsed with usvg
//! and rasterised with resvg at every point that needs it.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use projection::{RegularMesh, Viewport};
use tiny_skia::Transform;
use tracing::trace;
use wind_common::GridField;

use crate::error::RenderResult;
use crate::figure::Canvas;
use crate::style::{parse_color, BarbStyle};

/// Speed represented by a half barb.
pub const HALF_BARB: f64 = 5.0;
/// Speed represented by a full barb.
pub const FULL_BARB: f64 = 10.0;
/// Speed represented by a pennant.
pub const PENNANT: f64 = 50.0;

/// Glyph proportions relative to the staff length.
const SPACING: f32 = 0.125;
const FEATHER_HEIGHT: f32 = 0.4;
const FEATHER_WIDTH: f32 = 0.25;
const CALM_RADIUS: f32 = 0.15;

/// Convert U and V wind components to speed and direction.
///
/// Returns (speed, direction_rad) where:
/// - speed: in the units of the components
/// - direction_rad: direction the wind blows FROM, clockwise from north,
///   in [0, 2π) (0 = from north, π/2 = from east)
pub fn uv_to_speed_direction(u: f32, v: f32) -> (f64, f64) {
    let u = u as f64;
    let v = v as f64;

    let speed = (u * u + v * v).sqrt();

    // The wind comes from the direction of (-u, -v)
    let mut direction = (-u).atan2(-v);

    // Normalize to [0, 2π)
    if direction < 0.0 {
        direction += 2.0 * PI;
    }
    if direction >= 2.0 * PI {
        direction -= 2.0 * PI;
    }

    (speed, direction)
}

/// Decomposition of a speed into barb features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarbShape {
    pub pennants: u32,
    pub full_barbs: u32,
    pub half_barb: bool,
}

impl BarbShape {
    /// Round `speed` to the nearest half-barb increment and decompose it.
    /// Exact halves round to the even increment, so 2.5 is calm and 12.5
    /// is a single full barb.
    pub fn from_speed(speed: f64) -> Self {
        let rounded = (speed.max(0.0) / HALF_BARB).round_ties_even() * HALF_BARB;
        let pennants = (rounded / PENNANT).floor();
        let rest = rounded - pennants * PENNANT;
        let full_barbs = (rest / FULL_BARB).floor();
        let rest = rest - full_barbs * FULL_BARB;
        Self {
            pennants: pennants as u32,
            full_barbs: full_barbs as u32,
            half_barb: rest >= HALF_BARB,
        }
    }

    /// No features: drawn as an empty circle.
    pub fn is_calm(&self) -> bool {
        self.pennants == 0 && self.full_barbs == 0 && !self.half_barb
    }

    /// Speed the glyph stands for.
    pub fn speed(&self) -> f64 {
        self.pennants as f64 * PENNANT
            + self.full_barbs as f64 * FULL_BARB
            + if self.half_barb { HALF_BARB } else { 0.0 }
    }
}

fn hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// SVG for one glyph, in points, with the station at the centre of a
/// `2L × 2L` box and the staff pointing up (wind from the north).
pub fn barb_svg(shape: &BarbShape, style: &BarbStyle) -> RenderResult<String> {
    let len = style.length;
    let stroke = hex(parse_color(&style.barb_color)?);
    let flag = hex(parse_color(&style.flag_color)?);
    let lw = style.line_width;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{w}" viewBox="{o} {o} {w} {w}">"#,
        w = 2.0 * len,
        o = -len
    );

    if shape.is_calm() {
        let _ = write!(
            svg,
            r#"<circle cx="0" cy="0" r="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            CALM_RADIUS * len,
            stroke,
            lw
        );
        svg.push_str("</svg>");
        return Ok(svg);
    }

    let spacing = SPACING * len;
    let height = FEATHER_HEIGHT * len;
    let width = FEATHER_WIDTH * len;

    // Distance from the station along the staff; features start at the tip
    let mut offset = len;
    let mut lines = format!("M0 0 L0 {}", -len);
    let mut pennants = String::new();

    for i in 0..shape.pennants {
        if i > 0 {
            offset += spacing / 2.0;
        }
        let _ = write!(
            pennants,
            "M0 {} L{} {} L0 {} Z ",
            -offset,
            height,
            -(offset - width / 2.0),
            -(offset - width)
        );
        offset -= width + spacing;
    }

    for _ in 0..shape.full_barbs {
        let _ = write!(lines, " M0 {} L{} {}", -offset, height, -(offset + width / 2.0));
        offset -= spacing;
    }

    if shape.half_barb {
        // A lone half barb sits away from the tip
        if shape.pennants == 0 && shape.full_barbs == 0 {
            offset -= 1.5 * spacing;
        }
        let _ = write!(
            lines,
            " M0 {} L{} {}",
            -offset,
            height / 2.0,
            -(offset + width / 4.0)
        );
    }

    let _ = write!(
        svg,
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
        lines, stroke, lw
    );
    if !pennants.is_empty() {
        let _ = write!(
            svg,
            r#"<path d="{}" fill="{}" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
            pennants.trim_end(),
            flag,
            stroke,
            lw
        );
    }
    svg.push_str("</svg>");
    Ok(svg)
}

/// Draws barbs, caching the parsed glyph for each shape.
pub struct BarbRenderer {
    style: BarbStyle,
    cache: HashMap<BarbShape, usvg::Tree>,
}

impl BarbRenderer {
    /// Fails if the style names an unknown color.
    pub fn new(style: BarbStyle) -> RenderResult<Self> {
        parse_color(&style.barb_color)?;
        parse_color(&style.flag_color)?;
        Ok(Self {
            style,
            cache: HashMap::new(),
        })
    }

    pub fn style(&self) -> &BarbStyle {
        &self.style
    }

    /// Number of distinct glyphs parsed so far.
    pub fn cached_glyphs(&self) -> usize {
        self.cache.len()
    }

    fn glyph(&mut self, shape: BarbShape) -> RenderResult<&usvg::Tree> {
        if !self.cache.contains_key(&shape) {
            let svg = barb_svg(&shape, &self.style)?;
            let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())?;
            trace!(?shape, "Parsed barb glyph");
            self.cache.insert(shape, tree);
        }
        // Inserted above
        Ok(&self.cache[&shape])
    }

    /// Draw one barb for `(u, v)` at figure pixel `(x, y)` onto `layer`,
    /// a pixmap whose top-left sits at figure pixel `origin`.
    pub fn draw_barb(
        &mut self,
        layer: &mut tiny_skia::Pixmap,
        origin: (i32, i32),
        dpi: f32,
        (x, y): (f64, f64),
        (u, v): (f32, f32),
    ) -> RenderResult<()> {
        let (speed, direction) = uv_to_speed_direction(u, v);
        let shape = BarbShape::from_speed(speed);
        let half = self.style.length;
        let scale = dpi / 72.0;
        let angle_deg = direction.to_degrees() as f32;

        let tree = self.glyph(shape)?;

        // glyph centre -> origin, rotate to the source direction, scale
        // points to pixels, move to the station
        let transform = Transform::from_translate(-half, -half)
            .post_rotate(angle_deg)
            .post_scale(scale, scale)
            .post_translate(x as f32 - origin.0 as f32, y as f32 - origin.1 as f32);

        resvg::render(tree, transform, &mut layer.as_mut());
        Ok(())
    }

    /// Draw a barb at every mesh point with finite components, clipped to
    /// the map. `u` and `v` share the mesh shape. Returns the number drawn.
    pub fn draw_field(
        &mut self,
        canvas: &mut Canvas,
        viewport: &Viewport,
        mesh: &RegularMesh,
        u: &GridField,
        v: &GridField,
    ) -> RenderResult<usize> {
        let mut layer = canvas.blank_layer()?;
        let origin = canvas.origin();
        let dpi = canvas.dpi();
        let mut drawn = 0;

        for row in 0..mesh.ny {
            for col in 0..mesh.nx {
                let (Some(uc), Some(vc)) = (u.get(col, row), v.get(col, row)) else {
                    continue;
                };
                if !uc.is_finite() || !vc.is_finite() {
                    continue;
                }
                let Some((lon, lat)) = mesh.point(col, row) else {
                    continue;
                };
                let position = viewport.to_pixel(lon, lat);
                self.draw_barb(&mut layer, origin, dpi, position, (uc, vc))?;
                drawn += 1;
            }
        }

        let clip = canvas.clip_mask(&viewport.frame);
        canvas.draw_layer(&layer, clip.as_ref());
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_to_speed_direction_north_wind() {
        // North wind: U=0, V=-10 (wind FROM north)
        let (speed, dir) = uv_to_speed_direction(0.0, -10.0);
        assert!((speed - 10.0).abs() < 0.01, "Speed should be 10");
        assert!(dir.abs() < 1e-9, "Direction should be 0 (from north)");
    }

    #[test]
    fn test_uv_to_speed_direction_west_wind() {
        // West wind: U=10, V=0 (wind FROM west)
        let (_, dir) = uv_to_speed_direction(10.0, 0.0);
        assert!((dir - 3.0 * PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_decomposition() {
        assert!(BarbShape::from_speed(0.0).is_calm());
        assert!(BarbShape::from_speed(2.4).is_calm());
        assert!(BarbShape::from_speed(2.5).is_calm());
        assert_eq!(
            BarbShape::from_speed(7.5),
            BarbShape { pennants: 0, full_barbs: 1, half_barb: false }
        );
        assert_eq!(
            BarbShape::from_speed(12.5),
            BarbShape { pennants: 0, full_barbs: 1, half_barb: false }
        );
        assert_eq!(
            BarbShape::from_speed(2.6),
            BarbShape { pennants: 0, full_barbs: 0, half_barb: true }
        );
        assert_eq!(
            BarbShape::from_speed(15.0),
            BarbShape { pennants: 0, full_barbs: 1, half_barb: true }
        );
        assert_eq!(
            BarbShape::from_speed(63.0),
            BarbShape { pennants: 1, full_barbs: 1, half_barb: true }
        );
        assert_eq!(
            BarbShape::from_speed(101.0),
            BarbShape { pennants: 2, full_barbs: 0, half_barb: false }
        );
        assert_eq!(BarbShape::from_speed(63.0).speed(), 65.0);
    }

    #[test]
    fn test_calm_svg_is_circle() {
        let svg = barb_svg(&BarbShape::from_speed(0.0), &BarbStyle::default()).unwrap();
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_pennant_svg_uses_flag_color() {
        let svg = barb_svg(&BarbShape::from_speed(55.0), &BarbStyle::default()).unwrap();
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(r##"stroke="#000000""##));
    }

    #[test]
    fn test_glyphs_parse_and_cache() {
        let mut renderer = BarbRenderer::new(BarbStyle::default()).unwrap();
        let mut layer = tiny_skia::Pixmap::new(40, 40).unwrap();
        for (u, v) in [(0.0, 0.0), (10.0, 0.0), (10.0, 0.0), (-40.0, 30.0)] {
            renderer
                .draw_barb(&mut layer, (0, 0), 144.0, (20.0, 20.0), (u, v))
                .unwrap();
        }
        assert_eq!(renderer.cached_glyphs(), 3);
        assert!(layer.data().chunks(4).any(|p| p[3] > 0));
    }

    #[test]
    fn test_unknown_color_rejected() {
        let style = BarbStyle {
            flag_color: "octarine".to_string(),
            ..BarbStyle::default()
        };
        assert!(BarbRenderer::new(style).is_err());
    }
}
