//! Text drawing with a TrueType font.
//!
//! A font file can be configured; otherwise the bundled DejaVu Sans is used.

use std::path::Path;
use std::sync::Arc;

use image::{ImageBuffer, Rgba};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::figure::Canvas;

/// Embedded font data - DejaVu Sans
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Draws text onto canvases; cheap to clone.
#[derive(Clone, Default)]
pub struct TextRenderer {
    font: Option<Arc<Font<'static>>>,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("enabled", &self.font.is_some())
            .finish()
    }
}

fn read_font(path: &Path) -> RenderResult<Font<'static>> {
    let bytes = std::fs::read(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| {
        RenderError::InvalidCanvas(format!("{} is not a usable TrueType font", path.display()))
    })
}

impl TextRenderer {
    /// Load `configured` if given (failure is an error), else the bundled
    /// font.
    pub fn load(configured: Option<&Path>) -> RenderResult<Self> {
        match configured {
            Some(path) => {
                let font = read_font(path)?;
                debug!(font = %path.display(), "Loaded configured font");
                Ok(Self::from_font(font))
            }
            None => Self::embedded(),
        }
    }

    /// Renderer using the bundled DejaVu Sans.
    pub fn embedded() -> RenderResult<Self> {
        let font = Font::try_from_bytes(FONT_DATA).ok_or_else(|| {
            RenderError::InvalidCanvas("bundled font is not a usable TrueType font".to_string())
        })?;
        Ok(Self::from_font(font))
    }

    pub fn from_font(font: Font<'static>) -> Self {
        Self {
            font: Some(Arc::new(font)),
        }
    }

    /// A renderer that draws nothing.
    pub fn disabled() -> Self {
        Self { font: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.font.is_some()
    }

    /// Width and height in pixels of `text` at `size_px`.
    pub fn measure(&self, text: &str, size_px: f32) -> (f32, f32) {
        let Some(font) = &self.font else {
            return (0.0, 0.0);
        };
        let scale = Scale::uniform(size_px);
        let metrics = font.v_metrics(scale);
        let width = font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        (width, metrics.ascent - metrics.descent)
    }

    /// Draw `text` at `size_pt` points anchored at figure pixel `(x, y)`.
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        text: &str,
        size_pt: f32,
        (x, y): (f64, f64),
        (halign, valign): (HAlign, VAlign),
        rgb: (u8, u8, u8),
    ) {
        let Some(font) = &self.font else {
            return;
        };
        let size_px = canvas.points(size_pt);
        let (width, height) = self.measure(text, size_px);

        let left = match halign {
            HAlign::Left => x as f32,
            HAlign::Center => x as f32 - width / 2.0,
            HAlign::Right => x as f32 - width,
        };
        let top = match valign {
            VAlign::Top => y as f32,
            VAlign::Center => y as f32 - height / 2.0,
            VAlign::Bottom => y as f32 - height,
        };

        let (ox, oy) = canvas.origin();
        let (w, h) = (canvas.width(), canvas.height());
        let pixmap = canvas.pixmap_mut();
        let Some(mut buffer) = ImageBuffer::<Rgba<u8>, &mut [u8]>::from_raw(w, h, pixmap.data_mut())
        else {
            return;
        };
        draw_text_mut(
            &mut buffer,
            Rgba([rgb.0, rgb.1, rgb.2, 255]),
            left.round() as i32 - ox,
            top.round() as i32 - oy,
            Scale::uniform(size_px),
            font,
            text,
        );
    }
}
