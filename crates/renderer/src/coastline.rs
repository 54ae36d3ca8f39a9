//! Coastline polygons loaded from GeoJSON.
//!
//! Any FeatureCollection of `Polygon`/`MultiPolygon` geometries in lon/lat
//! works (Natural Earth land or coastline exports, GSHHG conversions).
//! Rings whose spherical area is below a threshold are dropped, like the
//! small islands a coarse basemap omits.
//!
//! A coarse outline of Europe, Africa and western Asia is bundled for runs
//! without a coastline file.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;
use wind_common::BoundingBox;

use crate::error::{RenderError, RenderResult};

/// Mean Earth radius in km.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Default minimum polygon area.
pub const DEFAULT_AREA_THRESHOLD_KM2: f64 = 10_000.0;

/// Bundled land outline, GeoJSON
const LAND_GEOJSON: &str = include_str!("../assets/land.geojson");

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// A land polygon: outer ring first, then holes. Points are `(lon, lat)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LandPolygon {
    pub rings: Vec<Vec<(f64, f64)>>,
    pub bounds: BoundingBox,
    pub area_km2: f64,
}

impl LandPolygon {
    fn from_rings(rings: Vec<Vec<[f64; 2]>>) -> Option<Self> {
        let rings: Vec<Vec<(f64, f64)>> = rings
            .into_iter()
            .map(|ring| ring.into_iter().map(|[lon, lat]| (lon, lat)).collect())
            .filter(|ring: &Vec<(f64, f64)>| ring.len() >= 3)
            .collect();
        let outer = rings.first()?;

        let mut bounds = BoundingBox::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        );
        for &(lon, lat) in outer {
            bounds.min_lon = bounds.min_lon.min(lon);
            bounds.max_lon = bounds.max_lon.max(lon);
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lat = bounds.max_lat.max(lat);
        }

        let holes: f64 = rings[1..].iter().map(|r| ring_area_km2(r)).sum();
        let area_km2 = (ring_area_km2(outer) - holes).max(0.0);
        Some(Self {
            rings,
            bounds,
            area_km2,
        })
    }
}

/// Area of a lon/lat ring on the sphere, in km².
pub fn ring_area_km2(ring: &[(f64, f64)]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let (lon1, lat1) = ring[i];
        let (lon2, lat2) = ring[(i + 1) % ring.len()];
        sum += (lon2 - lon1).to_radians()
            * (2.0 + lat1.to_radians().sin() + lat2.to_radians().sin());
    }
    (sum * EARTH_RADIUS_KM * EARTH_RADIUS_KM / 2.0).abs()
}

/// A set of land polygons.
#[derive(Debug, Clone, Default)]
pub struct Coastlines {
    pub polygons: Vec<LandPolygon>,
}

impl Coastlines {
    /// Parse GeoJSON text, keeping polygons of at least `area_threshold_km2`.
    pub fn from_geojson(text: &str, area_threshold_km2: f64) -> Result<Self, serde_json::Error> {
        let collection: FeatureCollection = serde_json::from_str(text)?;

        let mut polygons = Vec::new();
        let mut dropped = 0usize;
        for geometry in collection.features.into_iter().filter_map(|f| f.geometry) {
            let parts = match geometry {
                Geometry::Polygon { coordinates } => vec![coordinates],
                Geometry::MultiPolygon { coordinates } => coordinates,
                Geometry::Unsupported => continue,
            };
            for rings in parts {
                match LandPolygon::from_rings(rings) {
                    Some(polygon) if polygon.area_km2 >= area_threshold_km2 => {
                        polygons.push(polygon)
                    }
                    _ => dropped += 1,
                }
            }
        }

        debug!(
            kept = polygons.len(),
            dropped,
            area_threshold_km2,
            "Parsed coastline polygons"
        );
        Ok(Self { polygons })
    }

    /// Load a GeoJSON file.
    pub fn load(path: &Path, area_threshold_km2: f64) -> RenderResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_geojson(&text, area_threshold_km2).map_err(|e| RenderError::Coastlines {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// The bundled land outline.
    pub fn embedded(area_threshold_km2: f64) -> RenderResult<Self> {
        Self::from_geojson(LAND_GEOJSON, area_threshold_km2).map_err(|e| RenderError::Coastlines {
            path: "assets/land.geojson".into(),
            reason: e.to_string(),
        })
    }

    /// Polygons overlapping `bounds`.
    pub fn within<'a>(&'a self, bounds: &'a BoundingBox) -> impl Iterator<Item = &'a LandPolygon> {
        self.polygons.iter().filter(move |p| p.bounds.intersects(bounds))
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}
