//! PNG encoding for rendered figures.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors, e.g. figures without antialiased text.
//! - **RGB PNG (color type 2)**: fallback for everything else.
//!
//! Figures are opaque, so alpha is dropped. A `pHYs` chunk records the
//! resolution so viewers and print pipelines see the configured DPI.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use tiny_skia::Pixmap;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Meters per inch, for the pHYs chunk
const METERS_PER_INCH: f64 = 0.0254;

/// Pixels per meter for a DPI value (150 dpi → 5906).
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

/// Straight (non-premultiplied) RGB bytes of a pixmap.
fn pixmap_rgb(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        rgb.extend_from_slice(&[c.red(), c.green(), c.blue()]);
    }
    rgb
}

/// Encode a pixmap, indexed when the colors fit a palette.
pub fn encode_pixmap(pixmap: &Pixmap, dpi: u32) -> RenderResult<Vec<u8>> {
    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let rgb = pixmap_rgb(pixmap);

    match extract_palette(&rgb) {
        Some((palette, indices)) => {
            debug!(colors = palette.len(), "Encoding indexed PNG");
            create_png_indexed(width, height, &palette, &indices, dpi)
        }
        None => create_png_rgb(&rgb, width, height, dpi),
    }
}

/// Encode and write a pixmap to `path`.
pub fn write_png(path: &Path, pixmap: &Pixmap, dpi: u32) -> RenderResult<usize> {
    let bytes = encode_pixmap(pixmap, dpi)?;
    std::fs::write(path, &bytes).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len())
}

/// Pack RGB bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16)
}

/// Palette and per-pixel indices, or `None` past 256 colors.
fn extract_palette(rgb: &[u8]) -> Option<(Vec<(u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(rgb.len() / 3);

    for chunk in rgb.chunks_exact(3) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn write_header(png: &mut Vec<u8>, width: usize, height: usize, color_type: u8, dpi: u32) {
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(png, b"IHDR", &ihdr_data);

    let ppm = dpi_to_ppm(dpi);
    let mut phys_data = Vec::with_capacity(9);
    phys_data.extend_from_slice(&ppm.to_be_bytes());
    phys_data.extend_from_slice(&ppm.to_be_bytes());
    phys_data.push(1); // unit: meter
    write_chunk(png, b"pHYs", &phys_data);
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8)],
    indices: &[u8],
    dpi: u32,
) -> RenderResult<Vec<u8>> {
    check_len(indices.len(), width * height)?;
    let mut png = Vec::new();
    write_header(&mut png, width, height, 3, dpi);

    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b) in palette {
        plte_data.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    let idat_data = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a truecolor PNG (color type 2) from RGB bytes.
pub fn create_png_rgb(rgb: &[u8], width: usize, height: usize, dpi: u32) -> RenderResult<Vec<u8>> {
    check_len(rgb.len(), width * height * 3)?;
    let mut png = Vec::new();
    write_header(&mut png, width, height, 2, dpi);

    let idat_data = deflate_scanlines(rgb, width * 3, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_len(actual: usize, expected: usize) -> RenderResult<()> {
    if actual != expected {
        return Err(RenderError::Encode(format!(
            "pixel buffer holds {} bytes, expected {}",
            actual, expected
        )));
    }
    Ok(())
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each `stride`-byte row with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], stride: usize, height: usize) -> RenderResult<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in data.chunks_exact(stride.max(1)).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&uncompressed)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_types(png: &[u8]) -> Vec<String> {
        let mut types = Vec::new();
        let mut pos = 8;
        while pos + 8 <= png.len() {
            let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
            types.push(String::from_utf8_lossy(&png[pos + 4..pos + 8]).into_owned());
            pos += 12 + len;
        }
        types
    }

    #[test]
    fn test_dpi_to_ppm() {
        assert_eq!(dpi_to_ppm(150), 5906);
        assert_eq!(dpi_to_ppm(72), 2835);
    }

    #[test]
    fn test_extract_palette_simple() {
        let rgb = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 0, 0];
        let (palette, indices) = extract_palette(&rgb).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_extract_palette_overflow() {
        let rgb: Vec<u8> = (0..300u32).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0]).collect();
        assert!(extract_palette(&rgb).is_none());
    }

    #[test]
    fn test_chunk_order() {
        let png = create_png_rgb(&[0; 12], 2, 2, 150).unwrap();
        assert_eq!(&png[0..8], &SIGNATURE);
        assert_eq!(chunk_types(&png), vec!["IHDR", "pHYs", "IDAT", "IEND"]);

        let png = create_png_indexed(2, 2, &[(0, 0, 0)], &[0; 4], 150).unwrap();
        assert_eq!(chunk_types(&png), vec!["IHDR", "pHYs", "PLTE", "IDAT", "IEND"]);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            create_png_rgb(&[0; 5], 2, 2, 72),
            Err(RenderError::Encode(_))
        ));
    }
}
