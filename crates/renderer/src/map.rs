//! Map furniture: frame, graticule, land fill and coastlines.

use projection::{Graticule, LineKind, Viewport};
use tiny_skia::{Paint, PathBuilder, Stroke, StrokeDash};

use crate::coastline::Coastlines;
use crate::error::RenderResult;
use crate::figure::{Canvas, Figure};
use crate::style::{parse_color, MapStyle};
use crate::text::{HAlign, TextRenderer, VAlign};

fn paint(color: tiny_skia::Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// Black border around the map area.
pub fn draw_frame(canvas: &mut Canvas, viewport: &Viewport) {
    let f = viewport.frame;
    let mut pb = PathBuilder::new();
    pb.move_to(f.x as f32, f.y as f32);
    pb.line_to(f.right() as f32, f.y as f32);
    pb.line_to(f.right() as f32, f.bottom() as f32);
    pb.line_to(f.x as f32, f.bottom() as f32);
    pb.close();
    let Some(path) = pb.finish() else { return };

    let stroke = Stroke {
        width: canvas.points(1.0),
        ..Stroke::default()
    };
    canvas.stroke(&path, &paint(tiny_skia::Color::BLACK), &stroke, None);
}

/// Dashed parallels and meridians, labelled left and bottom.
pub fn draw_graticule(
    canvas: &mut Canvas,
    viewport: &Viewport,
    graticule: &Graticule,
    style: &MapStyle,
    text: &TextRenderer,
) -> RenderResult<()> {
    let color = style.graticule.to_color()?;
    let label_rgb = style.graticule.rgb()?;
    let mut stroke = Stroke {
        width: canvas.points(style.graticule_width),
        ..Stroke::default()
    };
    stroke.dash = StrokeDash::new(
        vec![
            canvas.points(style.graticule_dash[0]),
            canvas.points(style.graticule_dash[1]),
        ],
        0.0,
    );

    let clip = canvas.clip_mask(&viewport.frame);
    let bounds = *viewport.bounds();
    let pad = canvas.points(3.0) as f64;

    for line in &graticule.lines {
        let ((x0, y0), (x1, y1)) = match line.kind {
            LineKind::Parallel => (
                viewport.to_pixel(bounds.min_lon, line.value),
                viewport.to_pixel(bounds.max_lon, line.value),
            ),
            LineKind::Meridian => (
                viewport.to_pixel(line.value, bounds.max_lat),
                viewport.to_pixel(line.value, bounds.min_lat),
            ),
        };

        let mut pb = PathBuilder::new();
        pb.move_to(x0 as f32, y0 as f32);
        pb.line_to(x1 as f32, y1 as f32);
        if let Some(path) = pb.finish() {
            canvas.stroke(&path, &paint(color), &stroke, clip.as_ref());
        }

        match line.kind {
            LineKind::Parallel => text.draw(
                canvas,
                &line.label,
                style.label_size,
                (x0 - pad, y0),
                (HAlign::Right, VAlign::Center),
                label_rgb,
            ),
            LineKind::Meridian => text.draw(
                canvas,
                &line.label,
                style.label_size,
                (x1, y1 + pad),
                (HAlign::Center, VAlign::Top),
                label_rgb,
            ),
        }
    }
    Ok(())
}

fn polygon_paths<'a>(
    coastlines: &'a Coastlines,
    viewport: &'a Viewport,
) -> impl Iterator<Item = tiny_skia::Path> + 'a {
    coastlines.within(viewport.bounds()).filter_map(move |polygon| {
        let mut pb = PathBuilder::new();
        for ring in &polygon.rings {
            for (i, &(lon, lat)) in ring.iter().enumerate() {
                let (x, y) = viewport.to_pixel(lon, lat);
                if i == 0 {
                    pb.move_to(x as f32, y as f32);
                } else {
                    pb.line_to(x as f32, y as f32);
                }
            }
            pb.close();
        }
        pb.finish()
    })
}

/// Translucent fill of the land polygons. Returns the number filled.
pub fn draw_land(
    canvas: &mut Canvas,
    viewport: &Viewport,
    coastlines: &Coastlines,
    style: &MapStyle,
) -> RenderResult<usize> {
    let fill = paint(style.land.to_color()?);
    let clip = canvas.clip_mask(&viewport.frame);
    let mut count = 0;
    for path in polygon_paths(coastlines, viewport) {
        canvas.fill(&path, &fill, clip.as_ref());
        count += 1;
    }
    Ok(count)
}

/// Coastline outlines. Returns the number of polygons stroked.
pub fn draw_coastlines(
    canvas: &mut Canvas,
    viewport: &Viewport,
    coastlines: &Coastlines,
    style: &MapStyle,
) -> RenderResult<usize> {
    let outline = paint(style.coastline.to_color()?);
    let stroke = Stroke {
        width: canvas.points(style.coastline_width),
        ..Stroke::default()
    };
    let clip = canvas.clip_mask(&viewport.frame);
    let mut count = 0;
    for path in polygon_paths(coastlines, viewport) {
        canvas.stroke(&path, &outline, &stroke, clip.as_ref());
        count += 1;
    }
    Ok(count)
}

/// Title centred above the map.
pub fn draw_title(
    canvas: &mut Canvas,
    viewport: &Viewport,
    title: &str,
    style: &MapStyle,
    text: &TextRenderer,
) -> RenderResult<()> {
    let pad = canvas.points(6.0) as f64;
    let f = viewport.frame;
    text.draw(
        canvas,
        title,
        style.title_size,
        (f.x + f.width / 2.0, f.y - pad),
        (HAlign::Center, VAlign::Bottom),
        parse_color("black")?,
    );
    Ok(())
}

/// Figure title, centred near the top edge.
pub fn draw_suptitle(
    figure: &mut Figure,
    title: &str,
    style: &MapStyle,
    text: &TextRenderer,
) -> RenderResult<()> {
    let (width, height) = figure.size_pixels();
    text.draw(
        figure.canvas_mut(),
        title,
        style.suptitle_size,
        (width as f64 / 2.0, height as f64 * 0.02),
        (HAlign::Center, VAlign::Top),
        parse_color("black")?,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::{Equirectangular, Frame};
    use wind_common::BoundingBox;

    fn setup() -> (Canvas, Viewport) {
        let canvas = Canvas::new(Frame::new(0.0, 0.0, 200.0, 120.0), 72.0).unwrap();
        let proj = Equirectangular::new(BoundingBox::new(-6.0, 30.0, 36.0, 46.0)).unwrap();
        let viewport = proj.fit(Frame::new(20.0, 20.0, 160.0, 80.0));
        (canvas, viewport)
    }

    fn non_white(canvas: &Canvas) -> usize {
        canvas
            .pixmap()
            .data()
            .chunks(4)
            .filter(|p| p[0] != 255 || p[1] != 255 || p[2] != 255)
            .count()
    }

    #[test]
    fn test_frame_and_graticule_draw() {
        let (mut canvas, viewport) = setup();
        draw_frame(&mut canvas, &viewport);
        let framed = non_white(&canvas);
        assert!(framed > 0);

        let graticule = Graticule::standard(viewport.bounds());
        draw_graticule(
            &mut canvas,
            &viewport,
            &graticule,
            &MapStyle::default(),
            &TextRenderer::disabled(),
        )
        .unwrap();
        assert!(non_white(&canvas) > framed);
    }

    #[test]
    fn test_land_fill_inside_map_only() {
        let (mut canvas, viewport) = setup();
        let coast = Coastlines::from_geojson(
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":
                {"type":"Polygon","coordinates":[[[-20,20],[10,20],[10,50],[-20,50],[-20,20]]]}}]}"#,
            0.0,
        )
        .unwrap();

        assert_eq!(draw_land(&mut canvas, &viewport, &coast, &MapStyle::default()).unwrap(), 1);
        // Polygon extends west past the map; the clip keeps the margin white
        let pixel = canvas.pixmap().pixel(2, 60).unwrap();
        assert_eq!((pixel.red(), pixel.green(), pixel.blue()), (255, 255, 255));
        let (x, y) = viewport.to_pixel(0.0, 38.0);
        let inside = canvas.pixmap().pixel(x as u32, y as u32).unwrap();
        assert!(inside.blue() < 255);
    }
}
