//! Parallels and meridians drawn over the map.

use wind_common::BoundingBox;

/// Parallels every 10° from the equator up to 80°N.
pub const DEFAULT_PARALLELS: (f64, f64, f64) = (0.0, 90.0, 10.0);
/// Meridians every 10° from Greenwich up to 170°E.
pub const DEFAULT_MERIDIANS: (f64, f64, f64) = (0.0, 180.0, 10.0);

/// Evenly spaced values in `[start, stop)`.
pub fn ticks(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() || stop <= start {
        return Vec::new();
    }
    let count = ((stop - start) / step).ceil() as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Constant latitude, labelled on the left edge
    Parallel,
    /// Constant longitude, labelled on the bottom edge
    Meridian,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraticuleLine {
    pub kind: LineKind,
    /// Latitude of a parallel or longitude of a meridian, in degrees
    pub value: f64,
    pub label: String,
}

/// Graticule lines falling inside a map extent.
#[derive(Debug, Clone, Default)]
pub struct Graticule {
    pub lines: Vec<GraticuleLine>,
}

impl Graticule {
    /// Keep the parallels and meridians that cross `bounds`.
    pub fn new(bounds: &BoundingBox, parallels: &[f64], meridians: &[f64]) -> Self {
        let mut lines = Vec::new();
        for &lat in parallels {
            if lat >= bounds.min_lat && lat <= bounds.max_lat {
                lines.push(GraticuleLine {
                    kind: LineKind::Parallel,
                    value: lat,
                    label: format_latitude(lat),
                });
            }
        }
        for &lon in meridians {
            if lon >= bounds.min_lon && lon <= bounds.max_lon {
                lines.push(GraticuleLine {
                    kind: LineKind::Meridian,
                    value: lon,
                    label: format_longitude(lon),
                });
            }
        }
        Self { lines }
    }

    /// The default 10° graticule.
    pub fn standard(bounds: &BoundingBox) -> Self {
        let (p0, p1, ps) = DEFAULT_PARALLELS;
        let (m0, m1, ms) = DEFAULT_MERIDIANS;
        Self::new(bounds, &ticks(p0, p1, ps), &ticks(m0, m1, ms))
    }

    pub fn parallels(&self) -> impl Iterator<Item = &GraticuleLine> {
        self.lines.iter().filter(|l| l.kind == LineKind::Parallel)
    }

    pub fn meridians(&self) -> impl Iterator<Item = &GraticuleLine> {
        self.lines.iter().filter(|l| l.kind == LineKind::Meridian)
    }
}

fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let magnitude = value.abs();
    let number = if magnitude.fract() == 0.0 {
        format!("{}", magnitude as i64)
    } else {
        format!("{}", magnitude)
    };
    if value > 0.0 {
        format!("{}°{}", number, positive)
    } else if value < 0.0 {
        format!("{}°{}", number, negative)
    } else {
        format!("{}°", number)
    }
}

/// `40°N`, `10°S`, `0°`.
pub fn format_latitude(lat: f64) -> String {
    format_degrees(lat, 'N', 'S')
}

/// `20°E`, `5°W`, `0°`.
pub fn format_longitude(lon: f64) -> String {
    format_degrees(lon, 'E', 'W')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_exclude_stop() {
        assert_eq!(ticks(0.0, 90.0, 10.0).len(), 9);
        assert_eq!(ticks(0.0, 90.0, 10.0).last(), Some(&80.0));
        assert_eq!(ticks(0.0, 180.0, 10.0).len(), 18);
        assert!(ticks(0.0, 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_standard_graticule_over_mediterranean() {
        let bounds = BoundingBox::new(-6.0, 30.0, 36.0, 46.0);
        let graticule = Graticule::standard(&bounds);

        let parallels: Vec<f64> = graticule.parallels().map(|l| l.value).collect();
        let meridians: Vec<f64> = graticule.meridians().map(|l| l.value).collect();
        assert_eq!(parallels, vec![30.0, 40.0]);
        // Negative meridians are not in the 0..180 range
        assert_eq!(meridians, vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(format_latitude(40.0), "40°N");
        assert_eq!(format_latitude(-10.0), "10°S");
        assert_eq!(format_longitude(0.0), "0°");
        assert_eq!(format_longitude(-5.5), "5.5°W");
        assert_eq!(format_longitude(170.0), "170°E");
    }
}
