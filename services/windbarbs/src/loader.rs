//! Extraction of decoded grids from a GRIB file.

use std::path::Path;

use bytes::Bytes;
use chrono::NaiveDateTime;
use grib_parser::{GribError, GribMessage, GribReader};
use tracing::{debug, info};
use wind_common::{DataStamp, GridField, WindComponent};

use crate::error::{PlotError, PlotResult};

/// One decoded GRIB message with its coordinates.
#[derive(Debug, Clone)]
pub struct Record {
    /// Position in the file, starting at 0
    pub index: usize,
    pub values: GridField,
    pub lats: GridField,
    pub lons: GridField,
    /// Reference time as `dataDate`/`dataTime`
    pub stamp: DataStamp,
    pub short_name: String,
    pub component: Option<WindComponent>,
    pub level: String,
    pub forecast_hours: Option<i64>,
    pub validity: NaiveDateTime,
    pub units: String,
    pub grid: String,
}

impl Record {
    pub fn from_message(message: &GribMessage) -> Result<Self, GribError> {
        let values = message.values()?;
        let (lats, lons) = message.latlons();
        Ok(Self {
            index: message.index,
            values,
            lats,
            lons,
            stamp: message.data_stamp(),
            short_name: message.short_name.clone(),
            component: WindComponent::from_short_name(&message.short_name),
            level: message.level_description.clone(),
            forecast_hours: message.forecast_hours(),
            validity: message.validity_time(),
            units: message.units.clone(),
            grid: message.grid.describe(),
        })
    }

    /// `(width, height)` of the value grid.
    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    /// Validity time as `validityDate`/`validityTime` stamps.
    pub fn validity_stamp(&self) -> DataStamp {
        DataStamp::from_datetime(&self.validity)
    }

    fn log_diagnostics(&self) {
        let (lat_min, lat_max) = range(&self.lats);
        let (lon_min, lon_max) = range(&self.lons);
        let (val_min, val_max) = range(&self.values);
        let validity = self.validity_stamp();
        info!(
            index = self.index,
            short_name = %self.short_name,
            level = %self.level,
            grid = %self.grid,
            shape = ?self.shape(),
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            value_min = val_min,
            value_max = val_max,
            units = %self.units,
            year = self.stamp.date / 10_000,
            month = (self.stamp.date / 100) % 100,
            day = self.stamp.date % 100,
            hour = self.stamp.time / 100,
            data_date = self.stamp.date,
            data_time = self.stamp.time,
            validity_date = validity.date,
            validity_time = validity.time,
            forecast_hours = ?self.forecast_hours,
            "Decoded GRIB record"
        );
    }
}

fn range(field: &GridField) -> (f32, f32) {
    field.min_max().unwrap_or((f32::NAN, f32::NAN))
}

/// Decode every message in `data`, in file order.
///
/// The first malformed message aborts extraction; the error names its
/// index.
pub fn decode_records(data: Bytes, diagnostics: bool) -> PlotResult<Vec<Record>> {
    let mut reader = GribReader::new(data);
    let mut records = Vec::new();

    loop {
        let index = records.len();
        let message = match reader.next_message() {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(source) => return Err(PlotError::Grib { index, source }),
        };

        let record = Record::from_message(&message).map_err(|source| PlotError::Grib {
            index: message.index,
            source,
        })?;
        if diagnostics {
            record.log_diagnostics();
        }
        records.push(record);
    }

    debug!(count = records.len(), "Extracted GRIB records");
    Ok(records)
}

/// Read `path` and decode all of its messages.
pub fn extract_records(path: &Path, diagnostics: bool) -> PlotResult<Vec<Record>> {
    let data = std::fs::read(path).map_err(|source| PlotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = data.len(), "Reading GRIB file");
    decode_records(Bytes::from(data), diagnostics)
}
