//! Cylindrical equidistant ("plate carrée") projection.
//!
//! Longitude and latitude map linearly onto x and y. The map keeps one
//! degree of longitude as wide as one degree of latitude, so fitting it
//! into a pixel frame letterboxes along whichever axis has room to spare.

use wind_common::{BoundingBox, GridField, WindResult};

/// A pixel rectangle, origin at the top-left corner, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Cylindrical equidistant projection over a geographic extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equirectangular {
    bounds: BoundingBox,
}

impl Equirectangular {
    /// Projection covering `bounds`; degenerate extents are rejected.
    pub fn new(bounds: BoundingBox) -> WindResult<Self> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    /// Projection bounded by the extrema of coordinate grids.
    pub fn from_grids(lats: &GridField, lons: &GridField) -> WindResult<Self> {
        Self::new(BoundingBox::from_coordinates(&lats.data, &lons.data)?)
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Width over height of the map in degrees.
    pub fn aspect_ratio(&self) -> f64 {
        self.bounds.width() / self.bounds.height()
    }

    /// Normalized map coordinates: x = 0 on the western edge, 1 on the
    /// eastern; y = 0 on the northern edge, 1 on the southern.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon - self.bounds.min_lon) / self.bounds.width();
        let y = (self.bounds.max_lat - lat) / self.bounds.height();
        (x, y)
    }

    /// Inverse of [`forward`](Self::forward), returning `(lon, lat)`.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.bounds.min_lon + x * self.bounds.width();
        let lat = self.bounds.max_lat - y * self.bounds.height();
        (lon, lat)
    }

    /// Largest aspect-preserving viewport centred in `frame`.
    pub fn fit(&self, frame: Frame) -> Viewport {
        let aspect = self.aspect_ratio();
        let (width, height) = if frame.width / frame.height > aspect {
            (frame.height * aspect, frame.height)
        } else {
            (frame.width, frame.width / aspect)
        };
        let map = Frame::new(
            frame.x + (frame.width - width) / 2.0,
            frame.y + (frame.height - height) / 2.0,
            width,
            height,
        );
        Viewport {
            frame: map,
            projection: *self,
        }
    }
}

/// A projection placed on a pixel frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Pixel rectangle covered by the map
    pub frame: Frame,
    pub projection: Equirectangular,
}

impl Viewport {
    /// Pixel position of a geographic point. Points outside the bounds map
    /// outside the frame.
    pub fn to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.projection.forward(lon, lat);
        (
            self.frame.x + x * self.frame.width,
            self.frame.y + y * self.frame.height,
        )
    }

    /// Geographic `(lon, lat)` under a pixel.
    pub fn to_geo(&self, px: f64, py: f64) -> (f64, f64) {
        self.projection.inverse(
            (px - self.frame.x) / self.frame.width,
            (py - self.frame.y) / self.frame.height,
        )
    }

    pub fn bounds(&self) -> &BoundingBox {
        self.projection.bounds()
    }
}
