//! Rendering of one map panel.

use chrono::NaiveDateTime;
use projection::{ColumnOrder, Equirectangular, Graticule, RegularMesh, RowOrder};
use renderer::{map, Axes, BarbRenderer, BarbStyle, Canvas, Coastlines, MapStyle, TextRenderer};
use tracing::debug;
use wind_common::{format_panel_time, panel_offset_hours, panel_time, BoundingBox, GridField};

use crate::config::SpeedUnit;
use crate::error::PlotResult;
use crate::snapshot::WindSnapshot;

/// Knots per metre per second, as the plots have always used.
pub const KNOTS_PER_MS: f32 = 1.944;

/// Shared, read-only inputs of every panel.
pub struct PanelOptions<'a> {
    pub units: SpeedUnit,
    pub step_hours: u32,
    pub barbs: &'a BarbStyle,
    pub map: &'a MapStyle,
    pub text: &'a TextRenderer,
    pub coastlines: &'a Coastlines,
}

/// Convert a field in m/s to `unit`.
pub fn to_units(field: &GridField, unit: SpeedUnit) -> GridField {
    match unit {
        SpeedUnit::Knots => field.map(|v| v * KNOTS_PER_MS),
        SpeedUnit::MetersPerSecond => field.clone(),
    }
}

/// Elementwise `sqrt(u² + v²)`.
pub fn magnitude(u: &GridField, v: &GridField) -> PlotResult<GridField> {
    Ok(u.zip_with(v, |a, b| a.hypot(b))?)
}

/// `t_0 + 18h | 2014-02-02, 00:00`
pub fn panel_title(reference: NaiveDateTime, index: usize, stride: usize, step_hours: u32) -> String {
    let offset = panel_offset_hours(index, stride, step_hours);
    let time = panel_time(reference, index, stride, step_hours);
    format!("t_0 + {}h | {}", offset, format_panel_time(&time))
}

/// Mesh over `bounds` with one point per grid value, its rows and columns
/// running in the same directions as the data's.
pub fn barb_mesh(lats: &GridField, lons: &GridField, bounds: &BoundingBox) -> RegularMesh {
    let rows = match (lats.get(0, 0), lats.get(0, lats.height.saturating_sub(1))) {
        (Some(first), Some(last)) => RowOrder::from_latitudes(first as f64, last as f64),
        _ => RowOrder::NorthToSouth,
    };
    let columns = match (lons.get(0, 0), lons.get(lons.width.saturating_sub(1), 0)) {
        (Some(first), Some(last)) => ColumnOrder::from_longitudes(first as f64, last as f64),
        _ => ColumnOrder::WestToEast,
    };
    RegularMesh::new(bounds, lons.width, lons.height, rows).with_columns(columns)
}

/// Draw the map of `snapshot` into the cell of `axes`.
///
/// The returned canvas covers only the axes cell; the caller composites it
/// onto the figure.
pub fn render_panel(
    axes: &Axes,
    snapshot: &WindSnapshot,
    panel_index: usize,
    stride: usize,
    reference: NaiveDateTime,
    options: &PanelOptions<'_>,
) -> PlotResult<Canvas> {
    let mut canvas = Canvas::for_axes(axes)?;

    let u = to_units(&snapshot.u.values, options.units);
    let v = to_units(&snapshot.v.values, options.units);
    let speed = magnitude(&u, &v)?;
    if let Some((min, max)) = speed.min_max() {
        debug!(panel = panel_index, min, max, units = ?options.units, "Wind speed range");
    }

    let projection = Equirectangular::from_grids(&snapshot.u.lats, &snapshot.u.lons)?;
    let viewport = projection.fit(axes.frame);
    let bounds = *viewport.bounds();

    let filled = map::draw_land(&mut canvas, &viewport, options.coastlines, options.map)?;
    let outlined = map::draw_coastlines(&mut canvas, &viewport, options.coastlines, options.map)?;
    debug!(panel = panel_index, filled, outlined, "Drew land polygons");

    let graticule = Graticule::standard(&bounds);
    map::draw_graticule(&mut canvas, &viewport, &graticule, options.map, options.text)?;
    map::draw_frame(&mut canvas, &viewport);

    let mesh = barb_mesh(&snapshot.u.lats, &snapshot.u.lons, &bounds);

    let mut barbs = BarbRenderer::new(options.barbs.clone())?;
    let drawn = barbs.draw_field(&mut canvas, &viewport, &mesh, &u, &v)?;

    let title = panel_title(reference, panel_index, stride, options.step_hours);
    map::draw_title(&mut canvas, &viewport, &title, options.map, options.text)?;

    debug!(
        panel = panel_index,
        barbs = drawn,
        glyphs = barbs.cached_glyphs(),
        title = %title,
        "Rendered panel"
    );
    Ok(canvas)
}
