//! Regular lon/lat mesh spanning the map extent.
//!
//! Barbs are drawn on a mesh of the same resolution as the data rather
//! than on the data's own coordinates, so irregular or wrapped grids still
//! give an even spread of glyphs.

use wind_common::BoundingBox;

/// Vertical order of mesh rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Row 0 on the northern edge
    NorthToSouth,
    /// Row 0 on the southern edge
    SouthToNorth,
}

impl RowOrder {
    /// Order matching a latitude sequence: north first when latitudes decrease.
    pub fn from_latitudes(first: f64, last: f64) -> Self {
        if last < first {
            RowOrder::NorthToSouth
        } else {
            RowOrder::SouthToNorth
        }
    }
}

/// Horizontal order of mesh columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Column 0 on the western edge
    #[default]
    WestToEast,
    /// Column 0 on the eastern edge
    EastToWest,
}

impl ColumnOrder {
    /// Order matching a longitude sequence: east first when longitudes decrease.
    pub fn from_longitudes(first: f64, last: f64) -> Self {
        if last < first {
            ColumnOrder::EastToWest
        } else {
            ColumnOrder::WestToEast
        }
    }
}

/// `nx × ny` points evenly spaced over a bounding box, edges included.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularMesh {
    pub nx: usize,
    pub ny: usize,
    lons: Vec<f64>,
    lats: Vec<f64>,
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (stop - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

impl RegularMesh {
    pub fn new(bounds: &BoundingBox, nx: usize, ny: usize, order: RowOrder) -> Self {
        let lats = match order {
            RowOrder::NorthToSouth => linspace(bounds.max_lat, bounds.min_lat, ny),
            RowOrder::SouthToNorth => linspace(bounds.min_lat, bounds.max_lat, ny),
        };
        Self {
            nx,
            ny,
            lons: linspace(bounds.min_lon, bounds.max_lon, nx),
            lats,
        }
    }

    /// Lay the columns out in `order`, keeping the rows as they are.
    pub fn with_columns(mut self, order: ColumnOrder) -> Self {
        let (west, east) = match (self.lons.first(), self.lons.last()) {
            (Some(&a), Some(&b)) => (a.min(b), a.max(b)),
            _ => return self,
        };
        self.lons = match order {
            ColumnOrder::WestToEast => linspace(west, east, self.nx),
            ColumnOrder::EastToWest => linspace(east, west, self.nx),
        };
        self
    }

    /// `(lon, lat)` of the point at `(col, row)`.
    pub fn point(&self, col: usize, row: usize) -> Option<(f64, f64)> {
        Some((*self.lons.get(col)?, *self.lats.get(row)?))
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points in row-major order, matching a `GridField` of shape `nx × ny`.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lats
            .iter()
            .flat_map(move |&lat| self.lons.iter().map(move |&lon| (lon, lat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_spans_bounds() {
        let bounds = BoundingBox::new(-6.0, 30.0, 36.0, 46.0);
        let mesh = RegularMesh::new(&bounds, 8, 5, RowOrder::NorthToSouth);

        assert_eq!(mesh.len(), 40);
        assert_eq!(mesh.point(0, 0), Some((-6.0, 46.0)));
        assert_eq!(mesh.point(7, 4), Some((36.0, 30.0)));
        assert_eq!(mesh.point(0, 2), Some((-6.0, 38.0)));
        assert_eq!(mesh.point(8, 0), None);
    }

    #[test]
    fn test_points_row_major() {
        let bounds = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let mesh = RegularMesh::new(&bounds, 2, 2, RowOrder::SouthToNorth);
        let points: Vec<_> = mesh.points().collect();
        assert_eq!(points, vec![(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]);
    }

    #[test]
    fn test_row_order_from_latitudes() {
        assert_eq!(RowOrder::from_latitudes(46.0, 30.0), RowOrder::NorthToSouth);
        assert_eq!(RowOrder::from_latitudes(30.0, 46.0), RowOrder::SouthToNorth);
    }

    #[test]
    fn test_east_to_west_columns() {
        let bounds = BoundingBox::new(-6.0, 30.0, 42.0, 46.0);
        let mesh = RegularMesh::new(&bounds, 7, 5, RowOrder::NorthToSouth)
            .with_columns(ColumnOrder::EastToWest);

        assert_eq!(mesh.point(0, 0), Some((42.0, 46.0)));
        assert_eq!(mesh.point(6, 0), Some((-6.0, 46.0)));
        assert_eq!(mesh.point(1, 4), Some((34.0, 30.0)));

        let back = mesh.with_columns(ColumnOrder::WestToEast);
        assert_eq!(back.point(0, 0), Some((-6.0, 46.0)));
    }

    #[test]
    fn test_column_order_from_longitudes() {
        assert_eq!(ColumnOrder::from_longitudes(42.0, -6.0), ColumnOrder::EastToWest);
        assert_eq!(ColumnOrder::from_longitudes(-6.0, 42.0), ColumnOrder::WestToEast);
        assert_eq!(ColumnOrder::from_longitudes(5.0, 5.0), ColumnOrder::WestToEast);
    }

    #[test]
    fn test_single_column_mesh() {
        let bounds = BoundingBox::new(5.0, 0.0, 15.0, 10.0);
        let mesh = RegularMesh::new(&bounds, 1, 3, RowOrder::SouthToNorth);
        assert_eq!(mesh.point(0, 1), Some((5.0, 5.0)));
    }
}
