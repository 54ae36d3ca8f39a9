//! Ready-made multi-message GRIB files.
//!
//! A wind series is a sequence of forecast steps, each holding one U
//! message followed by one V message, the layout of the marine wind
//! files the plotter consumes.

use std::path::{Path, PathBuf};

use crate::generators::create_vortex;
use crate::grib::{Grib1Builder, Grib2Builder};

/// Mediterranean corners used by the series fixtures: (la1, lo1, la2, lo2).
pub const MEDITERRANEAN: (f64, f64, f64, f64) = (46.0, -6.0, 30.0, 36.0);

/// Grid shape of the series fixtures.
pub const SERIES_NI: u32 = 8;
pub const SERIES_NJ: u32 = 5;

/// Hours between consecutive forecast steps.
pub const SERIES_STEP_HOURS: u32 = 6;

/// GRIB1 series with `steps` forecast steps (2 × `steps` messages).
///
/// Step `k` is valid at reference + `k * 6` hours and carries a vortex
/// whose peak speed grows by 5 m/s per step, starting at 5 m/s.
pub fn grib1_wind_series(steps: usize) -> Vec<u8> {
    let (la1, lo1, la2, lo2) = MEDITERRANEAN;
    let mut out = Vec::new();
    for step in 0..steps {
        let (u, v) = create_vortex(SERIES_NI as usize, SERIES_NJ as usize, 5.0 * (step + 1) as f32);
        let hour = (step as u32 * SERIES_STEP_HOURS) as u8;
        for (parameter, data) in [(33u8, u), (34u8, v)] {
            let message = Grib1Builder::new()
                .with_grid(SERIES_NI, SERIES_NJ, la1, lo1, la2, lo2)
                .with_parameter(parameter)
                .with_forecast_hour(hour)
                .with_data(data)
                .build();
            out.extend_from_slice(&message);
        }
    }
    out
}

/// GRIB2 counterpart of [`grib1_wind_series`].
pub fn grib2_wind_series(steps: usize) -> Vec<u8> {
    let (la1, lo1, la2, lo2) = MEDITERRANEAN;
    let mut out = Vec::new();
    for step in 0..steps {
        let (u, v) = create_vortex(SERIES_NI as usize, SERIES_NJ as usize, 5.0 * (step + 1) as f32);
        let hour = step as u32 * SERIES_STEP_HOURS;
        for (number, data) in [(2u8, u), (3u8, v)] {
            let message = Grib2Builder::new()
                .with_grid(SERIES_NI, SERIES_NJ, la1, lo1, la2, lo2)
                .with_parameter(2, number)
                .with_forecast_hour(hour)
                .with_data(data)
                .build();
            out.extend_from_slice(&message);
        }
    }
    out
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_messages(bytes: &[u8]) -> usize {
        bytes.windows(4).filter(|w| *w == b"GRIB").count()
    }

    #[test]
    fn test_series_message_count() {
        assert_eq!(count_messages(&grib1_wind_series(3)), 6);
        assert_eq!(count_messages(&grib2_wind_series(2)), 4);
    }

    #[test]
    fn test_write_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "series.grb", &grib1_wind_series(1)).unwrap();
        assert!(path.exists());
    }
}
