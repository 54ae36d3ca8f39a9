//! Date/time stamp handling for GRIB records.
//!
//! GRIB tooling exposes a message's reference time as two integers:
//! `dataDate` (`YYYYMMDD`) and `dataTime` (`HHMM`, so `600` is 06:00 and
//! `0` is midnight).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{WindError, WindResult};

/// Integer date and time stamps of a record, kept in their raw form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataStamp {
    /// `YYYYMMDD`
    pub date: u32,
    /// `HHMM`
    pub time: u32,
}

impl DataStamp {
    pub fn new(date: u32, time: u32) -> Self {
        Self { date, time }
    }

    /// Stamps of a calendar date/time (seconds are dropped).
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            date: dt.year() as u32 * 10_000 + dt.month() * 100 + dt.day(),
            time: dt.hour() * 100 + dt.minute(),
        }
    }

    /// Interpret the stamps as a calendar date/time.
    pub fn to_datetime(&self) -> WindResult<NaiveDateTime> {
        parse_reference_time(self.date, self.time)
    }

    /// `t_0__<date>_<time>` with the raw integer stamps.
    pub fn output_stem(&self) -> String {
        format!("t_0__{}_{}", self.date, self.time)
    }
}

/// Parse a `YYYYMMDD` date stamp and an `HHMM` time stamp.
///
/// The time stamp is split arithmetically (`hour = time / 100`,
/// `minute = time % 100`) so one-, three- and four-digit stamps all decode.
pub fn parse_reference_time(date: u32, time: u32) -> WindResult<NaiveDateTime> {
    let invalid = |reason: &str| WindError::InvalidStamp {
        date,
        time,
        reason: reason.to_string(),
    };

    let year = (date / 10_000) as i32;
    let month = (date / 100) % 100;
    let day = date % 100;
    let hour = time / 100;
    let minute = time % 100;

    if date < 10_000_000 {
        return Err(invalid("date stamp must have eight digits"));
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid("not a calendar date"))?
        .and_hms_opt(hour, minute, 0)
        .ok_or_else(|| invalid("not a time of day"))
}

/// Hours between the reference time and panel `index`.
///
/// The first panel sits one step after the reference time and every later
/// panel advances by `stride` steps.
pub fn panel_offset_hours(index: usize, stride: usize, step_hours: u32) -> i64 {
    let step = step_hours as i64;
    step + (index as i64) * (stride as i64) * step
}

/// Absolute time of panel `index`.
pub fn panel_time(
    reference: NaiveDateTime,
    index: usize,
    stride: usize,
    step_hours: u32,
) -> NaiveDateTime {
    reference + Duration::hours(panel_offset_hours(index, stride, step_hours))
}

/// `YYYY-MM-DD, HH:MM`
pub fn format_panel_time(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d, %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_reference_time_six_hundred() {
        assert_eq!(parse_reference_time(20140201, 600).unwrap(), at(2014, 2, 1, 6, 0));
    }

    #[test]
    fn test_reference_time_short_and_long_stamps() {
        assert_eq!(parse_reference_time(20140201, 0).unwrap(), at(2014, 2, 1, 0, 0));
        assert_eq!(parse_reference_time(20140201, 1200).unwrap(), at(2014, 2, 1, 12, 0));
        assert_eq!(parse_reference_time(20140201, 30).unwrap(), at(2014, 2, 1, 0, 30));
        assert_eq!(parse_reference_time(20140201, 1845).unwrap(), at(2014, 2, 1, 18, 45));
    }

    #[test]
    fn test_reference_time_rejects_bad_stamps() {
        assert!(parse_reference_time(20140231, 0).is_err());
        assert!(parse_reference_time(20140201, 2400).is_err());
        assert!(parse_reference_time(20140201, 1260).is_err());
        assert!(parse_reference_time(140201, 0).is_err());
    }

    #[test]
    fn test_panel_offsets() {
        let t0 = at(2014, 2, 1, 6, 0);
        assert_eq!(panel_time(t0, 0, 1, 6), at(2014, 2, 1, 12, 0));
        assert_eq!(panel_time(t0, 2, 1, 6), at(2014, 2, 2, 0, 0));
        assert_eq!(panel_offset_hours(0, 1, 6), 6);
        assert_eq!(panel_offset_hours(2, 1, 6), 18);
        assert_eq!(panel_offset_hours(3, 2, 6), 42);
    }

    #[test]
    fn test_stamp_roundtrip_and_stem() {
        let stamp = DataStamp::from_datetime(&at(2014, 2, 1, 6, 0));
        assert_eq!(stamp, DataStamp::new(20140201, 600));
        assert_eq!(stamp.output_stem(), "t_0__20140201_600");
        assert_eq!(format_panel_time(&at(2014, 2, 1, 6, 0)), "2014-02-01, 06:00");
    }
}
