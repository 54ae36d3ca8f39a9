//! Geographic bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{WindError, WindResult};

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Bounding box of a set of coordinate grids, ignoring NaN entries.
    ///
    /// Fails if no finite coordinate pair exists or if the extent collapses
    /// to a line or a point.
    pub fn from_coordinates(lats: &[f32], lons: &[f32]) -> WindResult<Self> {
        let mut bbox = Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );

        for (&lat, &lon) in lats.iter().zip(lons) {
            if !lat.is_finite() || !lon.is_finite() {
                continue;
            }
            bbox.min_lat = bbox.min_lat.min(lat as f64);
            bbox.max_lat = bbox.max_lat.max(lat as f64);
            bbox.min_lon = bbox.min_lon.min(lon as f64);
            bbox.max_lon = bbox.max_lon.max(lon as f64);
        }

        bbox.validate()?;
        Ok(bbox)
    }

    /// Reject empty, inverted or degenerate boxes.
    pub fn validate(&self) -> WindResult<()> {
        if !(self.min_lon.is_finite()
            && self.min_lat.is_finite()
            && self.max_lon.is_finite()
            && self.max_lat.is_finite())
        {
            return Err(WindError::InvalidBounds(
                "no finite coordinates".to_string(),
            ));
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(WindError::InvalidBounds(format!(
                "degenerate extent lon [{}, {}] lat [{}, {}]",
                self.min_lon, self.max_lon, self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon < other.max_lon
            && self.max_lon > other.min_lon
            && self.min_lat < other.max_lat
            && self.max_lat > other.min_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coordinates_skips_nan() {
        let lats = [30.0, f32::NAN, 45.0, 40.0];
        let lons = [-10.0, 0.0, 35.0, f32::NAN];
        let bbox = BoundingBox::from_coordinates(&lats, &lons).unwrap();
        assert_eq!(bbox.min_lat, 30.0);
        assert_eq!(bbox.max_lat, 45.0);
        assert_eq!(bbox.min_lon, -10.0);
        assert_eq!(bbox.max_lon, 35.0);
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let lats = [30.0, 30.0];
        let lons = [0.0, 10.0];
        assert!(BoundingBox::from_coordinates(&lats, &lons).is_err());
        assert!(BoundingBox::from_coordinates(&[], &[]).is_err());
    }

    #[test]
    fn test_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
