//! GRIB2 section parsing (WMO FM 92 GRIB Edition 2).

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;
use wind_common::ScanMode;

use super::take;
use crate::bits::{decode_signed, read_unsigned};
use crate::message::{ForecastTime, LatLonGrid};
use crate::unpacking::SimplePacking;
use crate::GribError;

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub message_length: u64,
}

/// Section 1: Identification Section
#[derive(Debug, Clone)]
pub struct Identification {
    pub centre: u16,
    pub sub_centre: u16,
    pub significance_of_reference_time: u8,
    pub reference_time: NaiveDateTime,
    pub production_status: u8,
    pub data_type: u8,
}

/// Section 4: Product Definition Section
#[derive(Debug, Clone)]
pub struct ProductDefinition {
    pub template: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
    pub forecast_time: ForecastTime,
    pub level_type: u8,
    pub level_value: u32,
}

// ===== Parsing Functions =====

/// Parse Section 0 (Indicator) from start of message
pub fn parse_indicator(data: &[u8]) -> Result<Indicator, GribError> {
    if data.len() < 16 {
        return Err(GribError::InvalidFormat(
            "Not enough data for indicator section".to_string(),
        ));
    }

    if &data[0..4] != b"GRIB" {
        return Err(GribError::InvalidFormat(
            "Invalid GRIB magic bytes".to_string(),
        ));
    }

    // Octets 1-4: "GRIB"
    // Octets 5-6: Reserved
    // Octet 7: Discipline
    // Octet 8: GRIB Edition Number
    // Octets 9-16: Total length of GRIB message
    let discipline = data[6];
    let edition = data[7];

    if edition != 2 {
        return Err(GribError::UnsupportedEdition(edition));
    }

    let message_length = u64::from_be_bytes([
        data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
    ]);

    Ok(Indicator {
        discipline,
        edition,
        message_length,
    })
}

/// Parse Section 1 (Identification), located at offset 16 in the message
pub fn parse_identification(data: &[u8]) -> Result<Identification, GribError> {
    let offset = find_section(data, 1)?;
    let sec = take(data, offset, 21, 1)?;

    let centre = u16::from_be_bytes([sec[5], sec[6]]);
    let sub_centre = u16::from_be_bytes([sec[7], sec[8]]);
    let significance_of_reference_time = sec[11];

    let year = u16::from_be_bytes([sec[12], sec[13]]);
    let (month, day, hour, minute, second) = (sec[14], sec[15], sec[16], sec[17], sec[18]);

    let reference_time = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(|| GribError::InvalidSection {
            section: 1,
            reason: format!(
                "Invalid date: {}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        })?;

    Ok(Identification {
        centre,
        sub_centre,
        significance_of_reference_time,
        reference_time,
        production_status: sec[19],
        data_type: sec[20],
    })
}

/// Parse Section 3 (Grid Definition). Only template 3.0 (regular lat/lon)
/// is supported.
pub fn parse_grid_definition(data: &[u8]) -> Result<LatLonGrid, GribError> {
    let offset = find_section(data, 3)?;
    let header = take(data, offset, 14, 3)?;

    // Bytes 0-3: Section length
    // Byte 4: Section number (3)
    // Byte 5: Source of grid definition
    // Bytes 6-9: Number of data points
    // Byte 10: Number of octets for optional list
    // Byte 11: Interpretation of optional list
    // Bytes 12-13: Grid definition template number
    let num_points = read_unsigned(&header[6..10]) as usize;
    let template = u16::from_be_bytes([header[12], header[13]]);
    if template != 0 {
        return Err(GribError::UnsupportedTemplate { section: 3, template });
    }

    // Template 3.0, relative to byte 14:
    // 16-19 Ni, 20-23 Nj, 24-27 basic angle, 28-31 subdivisions,
    // 32-35 La1, 36-39 Lo1, 40 resolution flags, 41-44 La2, 45-48 Lo2,
    // 49-52 Di, 53-56 Dj, 57 scanning mode
    let gd = take(data, offset + 14, 58, 3)?;

    let ni = read_unsigned(&gd[16..20]) as usize;
    let nj = read_unsigned(&gd[20..24]) as usize;
    let basic_angle = read_unsigned(&gd[24..28]);
    let subdivisions = read_unsigned(&gd[28..32]);

    // Angles are in microdegrees unless a basic angle is given
    let unit = if basic_angle == 0 || subdivisions == 0 || subdivisions == u32::MAX {
        1e-6
    } else {
        basic_angle as f64 / subdivisions as f64
    };

    let angle = |bytes: &[u8]| decode_signed(bytes) as f64 * unit;
    let increment = |bytes: &[u8]| {
        let raw = read_unsigned(bytes);
        (raw != u32::MAX).then(|| raw as f64 * unit)
    };

    let resolution_flags = gd[40];
    let increments_given = resolution_flags & 0x20 != 0 || resolution_flags & 0x10 != 0;

    let grid = LatLonGrid {
        ni,
        nj,
        first_lat: angle(&gd[32..36]),
        first_lon: angle(&gd[36..40]),
        last_lat: angle(&gd[41..45]),
        last_lon: angle(&gd[45..49]),
        di: if increments_given { increment(&gd[49..53]) } else { None },
        dj: if increments_given { increment(&gd[53..57]) } else { None },
        scan_mode: ScanMode::from_flag(gd[57]),
    };

    if grid.num_points() != num_points {
        return Err(GribError::InvalidSection {
            section: 3,
            reason: format!(
                "{}x{} grid does not match {} data points",
                ni, nj, num_points
            ),
        });
    }

    Ok(grid)
}

/// Parse Section 4 (Product Definition)
pub fn parse_product_definition(data: &[u8]) -> Result<ProductDefinition, GribError> {
    let offset = find_section(data, 4)?;
    let sec = take(data, offset, 28, 4)?;

    // Bytes 0-3: Section length
    // Byte 4: Section number (4)
    // Bytes 5-6: Number of coordinate values
    // Bytes 7-8: Product definition template number
    // Byte 9: Parameter category
    // Byte 10: Parameter number
    // Byte 17: Indicator of unit of time range
    // Bytes 18-21: Forecast time
    // Byte 22: Type of first fixed surface
    // Byte 23: Scale factor of first fixed surface
    // Bytes 24-27: Scaled value of first fixed surface
    let template = u16::from_be_bytes([sec[7], sec[8]]);
    if template > 15 {
        return Err(GribError::UnsupportedTemplate { section: 4, template });
    }
    if template != 0 {
        debug!(template, "Reading product template with the template 4.0 layout");
    }

    let forecast_time = ForecastTime {
        unit: sec[17],
        value: read_unsigned(&sec[18..22]),
    };

    let level_type = sec[22];
    let scale_factor = decode_signed(&sec[23..24]);
    let scaled_value = read_unsigned(&sec[24..28]);

    // actual_value = scaled_value / 10^scale_factor
    let level_value = if scale_factor == 0 || scaled_value == u32::MAX {
        scaled_value
    } else {
        (scaled_value as f64 / 10f64.powi(scale_factor)).round() as u32
    };

    Ok(ProductDefinition {
        template,
        parameter_category: sec[9],
        parameter_number: sec[10],
        forecast_time,
        level_type,
        level_value,
    })
}

/// Parse Section 5 (Data Representation). Only template 5.0 (simple
/// packing) is supported. `num_points` is the full grid size from
/// section 3.
pub fn parse_data_representation(data: &[u8], num_points: u32) -> Result<SimplePacking, GribError> {
    let offset = find_section(data, 5)?;
    let sec = take(data, offset, 21, 5)?;

    // Octets 6-9 [5-8]: Number of packed values
    // Octets 10-11 [9-10]: Data representation template number
    // Octets 12-15 [11-14]: Reference value (R) - IEEE 32-bit float
    // Octets 16-17 [15-16]: Binary scale factor (E)
    // Octets 18-19 [17-18]: Decimal scale factor (D)
    // Octet 20 [19]: Number of bits per packed value
    let template = u16::from_be_bytes([sec[9], sec[10]]);
    if template != 0 {
        return Err(GribError::UnsupportedTemplate { section: 5, template });
    }

    Ok(SimplePacking {
        num_points,
        reference_value: f32::from_be_bytes([sec[11], sec[12], sec[13], sec[14]]),
        binary_scale_factor: decode_signed(&sec[15..17]) as i16,
        decimal_scale_factor: decode_signed(&sec[17..19]) as i16,
        bits_per_value: sec[19],
    })
}

/// Parse Section 6 (Bitmap). Returns `None` when no bitmap applies.
pub fn parse_bitmap(data: &[u8]) -> Result<Option<Bytes>, GribError> {
    let offset = find_section(data, 6)?;
    let header = take(data, offset, 6, 6)?;
    let section_length = read_unsigned(&header[0..4]) as usize;

    match header[5] {
        255 => Ok(None),
        0 => {
            let bitmap = take(data, offset + 6, section_length.saturating_sub(6), 6)?;
            Ok(Some(Bytes::copy_from_slice(bitmap)))
        }
        indicator => Err(GribError::InvalidSection {
            section: 6,
            reason: format!("predefined bitmap {} not supported", indicator),
        }),
    }
}

/// Parse Section 7 (Data)
pub fn parse_data_section(data: &[u8]) -> Result<Bytes, GribError> {
    let offset = find_section(data, 7)?;
    let header = take(data, offset, 5, 7)?;
    let section_length = read_unsigned(&header[0..4]) as usize;
    let payload = take(data, offset + 5, section_length.saturating_sub(5), 7)?;
    Ok(Bytes::copy_from_slice(payload))
}

// ===== Helper Functions =====

/// Find a section by number within a message
fn find_section(data: &[u8], section_num: u8) -> Result<usize, GribError> {
    let mut offset = 16; // After Section 0

    loop {
        if offset + 5 > data.len() || &data[offset..offset + 4] == b"7777" {
            return Err(GribError::InvalidSection {
                section: section_num,
                reason: "Section not found".to_string(),
            });
        }

        let section_length = read_unsigned(&data[offset..offset + 4]) as usize;

        if section_length < 5 || offset + section_length > data.len() {
            return Err(GribError::InvalidSection {
                section: section_num,
                reason: format!("Invalid section length {} at offset {}", section_length, offset),
            });
        }

        if data[offset + 4] == section_num {
            return Ok(offset);
        }

        offset += section_length;
    }
}
