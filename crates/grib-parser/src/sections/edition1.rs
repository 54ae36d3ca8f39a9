//! GRIB1 section parsing (WMO FM 92 GRIB Edition 1).
//!
//! Layout: Indicator (8 octets), Product Definition Section, optional Grid
//! Description Section, optional Bit Map Section, Binary Data Section, `7777`.
//! All section lengths are 3-octet unsigned integers; signed quantities use
//! sign-magnitude; the BDS reference value is an IBM float.

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use wind_common::ScanMode;

use super::take;
use crate::bits::{decode_signed, ibm_to_f32, read_unsigned};
use crate::message::{ForecastTime, LatLonGrid};
use crate::unpacking::SimplePacking;
use crate::GribError;

/// Section numbers used in error messages.
const PDS: u8 = 1;
const GDS: u8 = 2;
const BMS: u8 = 3;
const BDS: u8 = 4;

/// Indicator Section (8 octets)
#[derive(Debug, Clone)]
pub struct Indicator {
    pub message_length: u32,
    pub edition: u8,
}

/// Product Definition Section
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub length: usize,
    pub table_version: u8,
    pub centre: u8,
    pub process_id: u8,
    pub grid_id: u8,
    pub has_gds: bool,
    pub has_bms: bool,
    pub parameter: u8,
    pub level_type: u8,
    pub level_value: u32,
    pub reference_time: NaiveDateTime,
    pub forecast_time: ForecastTime,
    pub decimal_scale_factor: i16,
}

/// Binary Data Section
#[derive(Debug, Clone)]
pub struct BinaryData {
    pub length: usize,
    pub binary_scale_factor: i16,
    pub reference_value: f32,
    pub bits_per_value: u8,
    pub data: Bytes,
}

/// Parse the 8-octet Indicator Section
pub fn parse_indicator(data: &[u8]) -> Result<Indicator, GribError> {
    if data.len() < 8 {
        return Err(GribError::InvalidFormat(
            "Not enough data for indicator section".to_string(),
        ));
    }
    if &data[0..4] != b"GRIB" {
        return Err(GribError::InvalidFormat(
            "Invalid GRIB magic bytes".to_string(),
        ));
    }
    if data[7] != 1 {
        return Err(GribError::UnsupportedEdition(data[7]));
    }

    Ok(Indicator {
        message_length: read_unsigned(&data[4..7]),
        edition: 1,
    })
}

/// Parse the Product Definition Section starting at `offset`
pub fn parse_product_definition(data: &[u8], offset: usize) -> Result<ProductDefinition, GribError> {
    let length = read_unsigned(take(data, offset, 3, PDS)?) as usize;
    if length < 28 {
        return Err(GribError::InvalidSection {
            section: PDS,
            reason: format!("PDS length {} shorter than 28 octets", length),
        });
    }
    let pds = take(data, offset, length, PDS)?;

    let flags = pds[7];
    let level_type = pds[9];
    let level_value = read_unsigned(&pds[10..12]);

    // Octets 13-17 and 25: year of century, month, day, hour, minute, century
    let year_of_century = pds[12] as i32;
    let century = pds[24] as i32;
    let year = (century - 1) * 100 + year_of_century;
    let (month, day, hour, minute) = (pds[13], pds[14], pds[15], pds[16]);

    let reference_time = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, 0))
        .ok_or_else(|| GribError::InvalidSection {
            section: PDS,
            reason: format!(
                "Invalid date: {}-{:02}-{:02} {:02}:{:02}",
                year, month, day, hour, minute
            ),
        })?;

    // Octets 18-21: time unit, P1, P2, time range indicator
    let (unit, p1, p2, time_range) = (pds[17], pds[18] as u32, pds[19] as u32, pds[20]);
    let value = match time_range {
        // P1 and P2 form one 2-octet period
        10 => (p1 << 8) | p2,
        // Averages and accumulations are valid at the end of the period
        2..=5 => p2,
        _ => p1,
    };

    Ok(ProductDefinition {
        length,
        table_version: pds[3],
        centre: pds[4],
        process_id: pds[5],
        grid_id: pds[6],
        has_gds: flags & 0x80 != 0,
        has_bms: flags & 0x40 != 0,
        parameter: pds[8],
        level_type,
        level_value,
        reference_time,
        forecast_time: ForecastTime { unit, value },
        decimal_scale_factor: decode_signed(&pds[26..28]) as i16,
    })
}

/// Parse a Grid Description Section of data representation type 0
/// (regular lat/lon). Returns the grid and the section length.
pub fn parse_grid_description(data: &[u8], offset: usize) -> Result<(LatLonGrid, usize), GribError> {
    let length = read_unsigned(take(data, offset, 3, GDS)?) as usize;
    if length < 28 {
        return Err(GribError::InvalidSection {
            section: GDS,
            reason: format!("GDS length {} shorter than 28 octets", length),
        });
    }
    let gds = take(data, offset, length, GDS)?;

    let representation = gds[5];
    if representation != 0 {
        return Err(GribError::UnsupportedTemplate {
            section: GDS,
            template: representation as u16,
        });
    }

    // Angles in millidegrees
    let angle = |bytes: &[u8]| decode_signed(bytes) as f64 / 1000.0;
    let increments_given = gds[16] & 0x80 != 0;
    let increment = |bytes: &[u8]| {
        let raw = read_unsigned(bytes);
        (increments_given && raw != 0xFFFF).then(|| raw as f64 / 1000.0)
    };

    let grid = LatLonGrid {
        ni: read_unsigned(&gds[6..8]) as usize,
        nj: read_unsigned(&gds[8..10]) as usize,
        first_lat: angle(&gds[10..13]),
        first_lon: angle(&gds[13..16]),
        last_lat: angle(&gds[17..20]),
        last_lon: angle(&gds[20..23]),
        di: increment(&gds[23..25]),
        dj: increment(&gds[25..27]),
        scan_mode: ScanMode::from_flag(gds[27]),
    };

    Ok((grid, length))
}

/// Parse a Bit Map Section. Returns the bitmap bytes and the section length.
pub fn parse_bitmap(data: &[u8], offset: usize) -> Result<(Bytes, usize), GribError> {
    let length = read_unsigned(take(data, offset, 3, BMS)?) as usize;
    if length < 6 {
        return Err(GribError::InvalidSection {
            section: BMS,
            reason: format!("BMS length {} shorter than 6 octets", length),
        });
    }
    let bms = take(data, offset, length, BMS)?;

    let table_reference = read_unsigned(&bms[4..6]);
    if table_reference != 0 {
        return Err(GribError::InvalidSection {
            section: BMS,
            reason: format!("predefined bitmap {} not supported", table_reference),
        });
    }

    Ok((Bytes::copy_from_slice(&bms[6..]), length))
}

/// Parse a Binary Data Section holding simple-packed grid-point data
pub fn parse_binary_data(data: &[u8], offset: usize) -> Result<BinaryData, GribError> {
    let length = read_unsigned(take(data, offset, 3, BDS)?) as usize;
    if length < 11 {
        return Err(GribError::InvalidSection {
            section: BDS,
            reason: format!("BDS length {} shorter than 11 octets", length),
        });
    }
    let bds = take(data, offset, length, BDS)?;

    // Octet 4: flag (high nibble) and unused trailing bits (low nibble)
    let flags = bds[3] >> 4;
    if flags & 0x8 != 0 {
        return Err(GribError::UnsupportedTemplate { section: BDS, template: 1 });
    }
    if flags & 0x4 != 0 {
        return Err(GribError::UnsupportedTemplate { section: BDS, template: 2 });
    }

    Ok(BinaryData {
        length,
        binary_scale_factor: decode_signed(&bds[4..6]) as i16,
        reference_value: ibm_to_f32([bds[6], bds[7], bds[8], bds[9]]),
        bits_per_value: bds[10],
        data: Bytes::copy_from_slice(&bds[11..]),
    })
}

/// Packing parameters combining the PDS decimal scale with the BDS fields.
pub fn simple_packing(pds: &ProductDefinition, bds: &BinaryData, num_points: u32) -> SimplePacking {
    SimplePacking {
        num_points,
        reference_value: bds.reference_value,
        binary_scale_factor: bds.binary_scale_factor,
        decimal_scale_factor: pds.decimal_scale_factor,
        bits_per_value: bds.bits_per_value,
    }
}
