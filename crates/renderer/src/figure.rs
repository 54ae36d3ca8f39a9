//! Figure and axes: the pixel canvas a multi-panel plot is drawn on.
//!
//! A [`Figure`] is sized in inches at a DPI. [`Figure::subplots`] splits it
//! into a grid of [`Axes`] using matplotlib's default spacing. Each panel
//! draws into its own [`Canvas`] covering the axes' cell, so panels can be
//! rendered on separate threads and composited afterwards.

use projection::Frame;
use tiny_skia::{
    FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use crate::error::{RenderError, RenderResult};

/// Fractions of the figure left free around the subplot grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubplotParams {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    /// Horizontal gap between axes, as a fraction of the axes width
    pub wspace: f64,
    /// Vertical gap between axes, as a fraction of the axes height
    pub hspace: f64,
}

impl Default for SubplotParams {
    fn default() -> Self {
        Self {
            left: 0.1,
            bottom: 0.1,
            right: 0.9,
            top: 0.9,
            wspace: 0.2,
            hspace: 0.2,
        }
    }
}

/// One subplot slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    /// Slot index in row-major order
    pub index: usize,
    pub row: usize,
    pub col: usize,
    /// Plot area in figure pixels
    pub frame: Frame,
    /// Pixel-aligned region owned by this slot, the plot area plus its
    /// share of the surrounding margins (titles and tick labels go here)
    pub cell: Frame,
    pub dpi: f32,
}

/// A raster surface positioned in figure coordinates.
///
/// All drawing methods take figure pixel coordinates; the canvas
/// translates them into its own pixmap.
pub struct Canvas {
    pixmap: Pixmap,
    origin_x: i32,
    origin_y: i32,
    dpi: f32,
}

impl Canvas {
    /// Opaque white canvas covering `region` (rounded to whole pixels).
    pub fn new(region: Frame, dpi: f32) -> RenderResult<Self> {
        let origin_x = region.x.floor() as i32;
        let origin_y = region.y.floor() as i32;
        let width = (region.right().ceil() as i32 - origin_x).max(0) as u32;
        let height = (region.bottom().ceil() as i32 - origin_y).max(0) as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::InvalidCanvas(format!("cannot allocate {}x{} canvas", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self {
            pixmap,
            origin_x,
            origin_y,
            dpi,
        })
    }

    /// Canvas for one subplot slot.
    pub fn for_axes(axes: &Axes) -> RenderResult<Self> {
        Self::new(axes.cell, axes.dpi)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Convert a length in points to pixels at this canvas' DPI.
    pub fn points(&self, pt: f32) -> f32 {
        pt * self.dpi / 72.0
    }

    /// Figure-to-pixmap transform.
    pub fn transform(&self) -> Transform {
        Transform::from_translate(-self.origin_x as f32, -self.origin_y as f32)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Transparent layer with the same size and placement.
    pub fn blank_layer(&self) -> RenderResult<Pixmap> {
        Pixmap::new(self.pixmap.width(), self.pixmap.height())
            .ok_or_else(|| RenderError::InvalidCanvas("cannot allocate layer".to_string()))
    }

    /// Mask admitting only pixels inside `frame` (figure coordinates).
    pub fn clip_mask(&self, frame: &Frame) -> Option<Mask> {
        let rect = Rect::from_xywh(
            frame.x as f32,
            frame.y as f32,
            frame.width as f32,
            frame.height as f32,
        )?;
        let path = PathBuilder::from_rect(rect);
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())?;
        mask.fill_path(&path, FillRule::Winding, true, self.transform());
        Some(mask)
    }

    pub fn stroke(&mut self, path: &Path, paint: &Paint, stroke: &Stroke, clip: Option<&Mask>) {
        let transform = self.transform();
        self.pixmap.stroke_path(path, paint, stroke, transform, clip);
    }

    pub fn fill(&mut self, path: &Path, paint: &Paint, clip: Option<&Mask>) {
        let transform = self.transform();
        self.pixmap
            .fill_path(path, paint, FillRule::EvenOdd, transform, clip);
    }

    /// Draw a layer produced by [`blank_layer`](Self::blank_layer).
    pub fn draw_layer(&mut self, layer: &Pixmap, clip: Option<&Mask>) {
        self.pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            clip,
        );
    }

    /// Copy another canvas onto this one at its figure position.
    pub fn composite(&mut self, other: &Canvas) {
        self.pixmap.draw_pixmap(
            other.origin_x - self.origin_x,
            other.origin_y - self.origin_y,
            other.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

/// The whole output image.
pub struct Figure {
    canvas: Canvas,
    width_in: f64,
    height_in: f64,
    params: SubplotParams,
}

impl Figure {
    /// A white figure of `width_in × height_in` inches at `dpi`.
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> RenderResult<Self> {
        if !(width_in > 0.0 && height_in > 0.0) || dpi == 0 {
            return Err(RenderError::InvalidCanvas(format!(
                "figure {}x{} in at {} dpi",
                width_in, height_in, dpi
            )));
        }
        let width = (width_in * dpi as f64).round();
        let height = (height_in * dpi as f64).round();
        let canvas = Canvas::new(Frame::new(0.0, 0.0, width, height), dpi as f32)?;
        Ok(Self {
            canvas,
            width_in,
            height_in,
            params: SubplotParams::default(),
        })
    }

    pub fn size_inches(&self) -> (f64, f64) {
        (self.width_in, self.height_in)
    }

    pub fn size_pixels(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    pub fn dpi(&self) -> f32 {
        self.canvas.dpi()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Lay out a `rows × cols` grid of axes, row-major.
    pub fn subplots(&self, rows: usize, cols: usize) -> Vec<Axes> {
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        let p = &self.params;

        let total_w = (p.right - p.left) * w;
        let total_h = (p.top - p.bottom) * h;
        let axes_w = total_w / (cols as f64 + p.wspace * (cols as f64 - 1.0));
        let axes_h = total_h / (rows as f64 + p.hspace * (rows as f64 - 1.0));
        let gap_w = p.wspace * axes_w;
        let gap_h = p.hspace * axes_h;

        let mut axes = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let x = p.left * w + col as f64 * (axes_w + gap_w);
                let y = (1.0 - p.top) * h + row as f64 * (axes_h + gap_h);
                let frame = Frame::new(x, y, axes_w, axes_h);

                let x0 = if col == 0 { 0.0 } else { (x - gap_w / 2.0).round() };
                let x1 = if col + 1 == cols { w } else { (x + axes_w + gap_w / 2.0).round() };
                let y0 = if row == 0 { 0.0 } else { (y - gap_h / 2.0).round() };
                let y1 = if row + 1 == rows { h } else { (y + axes_h + gap_h / 2.0).round() };

                axes.push(Axes {
                    index: row * cols + col,
                    row,
                    col,
                    frame,
                    cell: Frame::new(x0, y0, x1 - x0, y1 - y0),
                    dpi: self.canvas.dpi(),
                });
            }
        }
        axes
    }

    /// Paste a rendered panel in place.
    pub fn composite(&mut self, panel: &Canvas) {
        self.canvas.composite(panel);
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.canvas.into_pixmap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_size() {
        let figure = Figure::new(30.0, 12.0, 150).unwrap();
        assert_eq!(figure.size_pixels(), (4500, 1800));
        assert_eq!(figure.size_inches(), (30.0, 12.0));
    }

    #[test]
    fn test_invalid_figure() {
        assert!(Figure::new(0.0, 6.0, 100).is_err());
        assert!(Figure::new(10.0, 6.0, 0).is_err());
    }

    #[test]
    fn test_subplots_grid() {
        let figure = Figure::new(30.0, 12.0, 10).unwrap(); // 300 x 120 px
        let axes = figure.subplots(2, 3);
        assert_eq!(axes.len(), 6);

        let first = axes[0];
        assert_eq!((first.row, first.col), (0, 0));
        assert!((first.frame.x - 30.0).abs() < 1e-9);
        assert!((first.frame.y - 12.0).abs() < 1e-9);

        // 240 px = 3 w + 2 * 0.2 w
        assert!((first.frame.width - 240.0 / 3.4).abs() < 1e-9);

        let last = axes[5];
        assert_eq!((last.row, last.col), (1, 2));
        assert!((last.frame.right() - 270.0).abs() < 1e-9);
        assert!((last.frame.bottom() - 108.0).abs() < 1e-9);
    }

    #[test]
    fn test_cells_tile_figure() {
        let figure = Figure::new(30.0, 12.0, 10).unwrap();
        let axes = figure.subplots(2, 3);
        let area: f64 = axes.iter().map(|a| a.cell.width * a.cell.height).sum();
        assert!((area - 300.0 * 120.0).abs() < 1e-6);
        for a in &axes {
            assert!(a.cell.x <= a.frame.x && a.cell.right() >= a.frame.right());
        }
    }

    #[test]
    fn test_canvas_points() {
        let canvas = Canvas::new(Frame::new(0.0, 0.0, 10.0, 10.0), 144.0).unwrap();
        assert_eq!(canvas.points(6.0), 12.0);
    }

    #[test]
    fn test_composite_places_panel() {
        let mut figure = Figure::new(2.0, 2.0, 10).unwrap();
        let mut panel = Canvas::new(Frame::new(5.0, 5.0, 4.0, 4.0), 10.0).unwrap();
        panel.pixmap_mut().fill(tiny_skia::Color::BLACK);
        figure.composite(&panel);

        let pixmap = figure.into_pixmap();
        let at = |x: u32, y: u32| pixmap.pixel(x, y).unwrap();
        assert_eq!(at(6, 6).red(), 0);
        assert_eq!(at(2, 2).red(), 255);
    }
}
