//! Decoded GRIB messages, independent of the edition that produced them.

use bytes::Bytes;
use chrono::{Duration, NaiveDateTime};
use wind_common::{DataStamp, GridField, ScanMode};

use crate::tables::ParameterId;
use crate::unpacking::{unpack_simple, SimplePacking};
use crate::GribError;

/// A regular latitude/longitude grid (GRIB1 data representation type 0,
/// GRIB2 template 3.0). Angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct LatLonGrid {
    /// Points along a parallel
    pub ni: usize,
    /// Points along a meridian
    pub nj: usize,
    pub first_lat: f64,
    pub first_lon: f64,
    pub last_lat: f64,
    pub last_lon: f64,
    /// Increments, when the message carries them
    pub di: Option<f64>,
    pub dj: Option<f64>,
    pub scan_mode: ScanMode,
}

impl LatLonGrid {
    /// Total number of grid points.
    pub fn num_points(&self) -> usize {
        self.ni * self.nj
    }

    /// Longitude of the last column, unwrapped so that it lies in the scan
    /// direction from the first column.
    fn unwrapped_last_lon(&self) -> f64 {
        let mut last = self.last_lon;
        if self.scan_mode.i_negative {
            while last > self.first_lon {
                last -= 360.0;
            }
        } else {
            while last < self.first_lon {
                last += 360.0;
            }
        }
        last
    }

    /// Latitude of row `j` in scan order.
    pub fn latitude(&self, j: usize) -> f64 {
        if self.nj <= 1 {
            return self.first_lat;
        }
        self.first_lat + (self.last_lat - self.first_lat) * j as f64 / (self.nj - 1) as f64
    }

    /// Longitude of column `i` in scan order.
    ///
    /// Grids whose first longitude is at or beyond 180° are shifted into
    /// [-180, 180) so that a domain straddling the prime meridian stays
    /// contiguous.
    pub fn longitude(&self, i: usize) -> f64 {
        let last = self.unwrapped_last_lon();
        let lon = if self.ni <= 1 {
            self.first_lon
        } else {
            self.first_lon + (last - self.first_lon) * i as f64 / (self.ni - 1) as f64
        };
        if self.first_lon >= 180.0 {
            lon - 360.0
        } else {
            lon
        }
    }

    /// Latitude and longitude fields with the same shape and ordering as
    /// the values returned by [`GribMessage::values`].
    pub fn latlons(&self) -> (GridField, GridField) {
        let mut lats = Vec::with_capacity(self.num_points());
        let mut lons = Vec::with_capacity(self.num_points());
        let columns: Vec<f32> = (0..self.ni).map(|i| self.longitude(i) as f32).collect();
        for j in 0..self.nj {
            let lat = self.latitude(j) as f32;
            lats.extend(std::iter::repeat(lat).take(self.ni));
            lons.extend_from_slice(&columns);
        }
        (
            GridField {
                width: self.ni,
                height: self.nj,
                data: lats,
            },
            GridField {
                width: self.ni,
                height: self.nj,
                data: lons,
            },
        )
    }

    /// Short human-readable grid description (`regular_ll 0.5x0.5 101x61`).
    pub fn describe(&self) -> String {
        let inc = |d: Option<f64>| d.map(|v| format!("{}", v)).unwrap_or_else(|| "?".to_string());
        format!(
            "regular_ll {}x{} {}x{} ({}, {}) -> ({}, {})",
            inc(self.di),
            inc(self.dj),
            self.ni,
            self.nj,
            self.first_lat,
            self.first_lon,
            self.last_lat,
            self.last_lon
        )
    }
}

/// Forecast time offset as encoded (GRIB1 table 4 / GRIB2 code table 4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastTime {
    pub unit: u8,
    pub value: u32,
}

impl ForecastTime {
    /// Offset as a duration, `None` for units the tables leave undefined.
    pub fn duration(&self) -> Option<Duration> {
        let v = self.value as i64;
        match self.unit {
            0 => Some(Duration::minutes(v)),
            1 => Some(Duration::hours(v)),
            2 => Some(Duration::days(v)),
            10 => Some(Duration::hours(3 * v)),
            11 => Some(Duration::hours(6 * v)),
            12 => Some(Duration::hours(12 * v)),
            13 | 254 => Some(Duration::seconds(v)),
            _ => None,
        }
    }
}

/// One decoded GRIB message.
#[derive(Debug, Clone)]
pub struct GribMessage {
    /// Position of the message in the file, starting at 0
    pub index: usize,
    /// Byte offset of the message in the file
    pub offset: usize,
    pub edition: u8,
    pub centre: u16,
    pub parameter: ParameterId,
    pub short_name: String,
    pub units: String,
    pub level_type: u8,
    pub level_value: u32,
    pub level_description: String,
    pub reference_time: NaiveDateTime,
    pub forecast_time: ForecastTime,
    pub grid: LatLonGrid,
    pub packing: SimplePacking,
    pub bitmap: Option<Bytes>,
    pub data: Bytes,
}

impl GribMessage {
    /// `(nj, ni)` - rows, columns.
    pub fn grid_dims(&self) -> (usize, usize) {
        (self.grid.nj, self.grid.ni)
    }

    /// Reference time as `dataDate`/`dataTime` integer stamps.
    pub fn data_stamp(&self) -> DataStamp {
        DataStamp::from_datetime(&self.reference_time)
    }

    /// Reference time plus the forecast offset; falls back to the reference
    /// time for undefined time units.
    pub fn validity_time(&self) -> NaiveDateTime {
        match self.forecast_time.duration() {
            Some(offset) => self.reference_time + offset,
            None => self.reference_time,
        }
    }

    /// Forecast offset in whole hours, when defined.
    pub fn forecast_hours(&self) -> Option<i64> {
        self.forecast_time.duration().map(|d| d.num_hours())
    }

    /// Unpack the data section in scan order, missing points as NaN.
    pub fn unpack_data(&self) -> Result<Vec<f32>, GribError> {
        let values = unpack_simple(&self.data, &self.packing, self.bitmap.as_deref())?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
    }

    /// Unpacked values as a row-major field matching [`LatLonGrid::latlons`].
    pub fn values(&self) -> Result<GridField, GribError> {
        let raw = self.unpack_data()?;
        Ok(self
            .grid
            .scan_mode
            .to_row_major(raw, self.grid.ni, self.grid.nj)?)
    }

    /// Latitude and longitude fields of every grid point.
    pub fn latlons(&self) -> (GridField, GridField) {
        self.grid.latlons()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(first_lon: f64, last_lon: f64, flag: u8) -> LatLonGrid {
        LatLonGrid {
            ni: 6,
            nj: 3,
            first_lat: 46.0,
            first_lon,
            last_lat: 30.0,
            last_lon,
            di: Some(10.0),
            dj: Some(8.0),
            scan_mode: ScanMode::from_flag(flag),
        }
    }

    #[test]
    fn test_latitudes_follow_scan() {
        let g = grid(0.0, 50.0, 0);
        assert_eq!(g.latitude(0), 46.0);
        assert_eq!(g.latitude(1), 38.0);
        assert_eq!(g.latitude(2), 30.0);
    }

    #[test]
    fn test_longitudes_wrap_across_prime_meridian() {
        let g = grid(350.0, 40.0, 0);
        assert_eq!(g.longitude(0), -10.0);
        assert_eq!(g.longitude(1), 0.0);
        assert_eq!(g.longitude(5), 40.0);
    }

    #[test]
    fn test_longitudes_westward_scan() {
        let g = grid(40.0, -10.0, 0x80);
        assert_eq!(g.longitude(0), 40.0);
        assert_eq!(g.longitude(5), -10.0);
    }

    #[test]
    fn test_latlons_shape() {
        let (lats, lons) = grid(0.0, 50.0, 0).latlons();
        assert_eq!(lats.shape(), (6, 3));
        assert_eq!(lons.shape(), (6, 3));
        assert_eq!(lats.get(4, 2), Some(30.0));
        assert_eq!(lons.get(4, 2), Some(40.0));
    }

    #[test]
    fn test_forecast_time_units() {
        let ft = ForecastTime { unit: 11, value: 2 };
        assert_eq!(ft.duration(), Some(Duration::hours(12)));
        assert_eq!(ForecastTime { unit: 200, value: 1 }.duration(), None);
    }
}
