//! Tests for PNG encoding of rendered figures.

use renderer::png::{create_png_rgb, dpi_to_ppm, encode_pixmap, write_png};
use renderer::Figure;

/// Find a chunk's data by type.
fn find_chunk<'a>(png: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    let mut pos = 8;
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        if &png[pos + 4..pos + 8] == kind {
            return Some(&png[pos + 8..pos + 8 + len]);
        }
        pos += 12 + len;
    }
    None
}

#[test]
fn test_png_signature_and_size() {
    let figure = Figure::new(2.0, 1.0, 50).unwrap();
    let png = encode_pixmap(&figure.into_pixmap(), 50).unwrap();

    assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    let ihdr = find_chunk(&png, b"IHDR").unwrap();
    assert_eq!(u32::from_be_bytes([ihdr[0], ihdr[1], ihdr[2], ihdr[3]]), 100);
    assert_eq!(u32::from_be_bytes([ihdr[4], ihdr[5], ihdr[6], ihdr[7]]), 50);
}

#[test]
fn test_phys_records_dpi() {
    let png = create_png_rgb(&[255; 3 * 4], 2, 2, 150).unwrap();
    let phys = find_chunk(&png, b"pHYs").unwrap();
    assert_eq!(phys.len(), 9);
    let x = u32::from_be_bytes([phys[0], phys[1], phys[2], phys[3]]);
    let y = u32::from_be_bytes([phys[4], phys[5], phys[6], phys[7]]);
    assert_eq!((x, y), (5906, 5906));
    assert_eq!(phys[8], 1);
    assert_eq!(dpi_to_ppm(150), x);
}

#[test]
fn test_blank_figure_uses_palette() {
    let figure = Figure::new(1.0, 1.0, 20).unwrap();
    let png = encode_pixmap(&figure.into_pixmap(), 20).unwrap();
    let ihdr = find_chunk(&png, b"IHDR").unwrap();
    assert_eq!(ihdr[9], 3, "single-color figure should be indexed");
    assert_eq!(find_chunk(&png, b"PLTE").unwrap(), &[255, 255, 255]);
}

#[test]
fn test_many_colors_fall_back_to_rgb() {
    let mut pixmap = tiny_skia::Pixmap::new(300, 1).unwrap();
    for (i, px) in pixmap.data_mut().chunks_mut(4).enumerate() {
        px.copy_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let png = encode_pixmap(&pixmap, 72).unwrap();
    assert_eq!(find_chunk(&png, b"IHDR").unwrap()[9], 2);
}

#[test]
fn test_write_png_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    let figure = Figure::new(1.0, 1.0, 30).unwrap();
    let written = write_png(&path, &figure.into_pixmap(), 30).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);
}

#[test]
fn test_write_png_bad_directory() {
    let figure = Figure::new(1.0, 1.0, 10).unwrap();
    let result = write_png(
        std::path::Path::new("/nonexistent/dir/figure.png"),
        &figure.into_pixmap(),
        10,
    );
    assert!(matches!(result, Err(renderer::RenderError::Io { .. })));
}
