//! Sequential reader over the messages of a GRIB file.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::bits::read_unsigned;
use crate::message::GribMessage;
use crate::sections::{edition1, edition2};
use crate::tables::{GribTables, ParameterId};
use crate::GribError;

/// Iterates the messages of an in-memory GRIB file, edition 1 or 2,
/// in file order.
///
/// Bytes between messages (padding, headers some archives prepend) are
/// skipped by scanning for the next `GRIB` marker.
pub struct GribReader {
    data: Bytes,
    offset: usize,
    index: usize,
    tables: Arc<GribTables>,
}

impl GribReader {
    /// Reader using [`GribTables::standard`].
    pub fn new(data: Bytes) -> Self {
        Self::with_tables(data, Arc::new(GribTables::standard()))
    }

    pub fn with_tables(data: Bytes, tables: Arc<GribTables>) -> Self {
        Self {
            data,
            offset: 0,
            index: 0,
            tables,
        }
    }

    /// Decode the next message, `Ok(None)` at end of file.
    pub fn next_message(&mut self) -> Result<Option<GribMessage>, GribError> {
        let start = match find_marker(&self.data, self.offset) {
            Some(start) => start,
            None => {
                self.offset = self.data.len();
                return Ok(None);
            }
        };

        let available = self.data.len() - start;
        if available < 8 {
            return Err(GribError::Truncated {
                offset: start,
                needed: 8,
                available,
            });
        }

        let edition = self.data[start + 7];
        let length = match edition {
            1 => read_unsigned(&self.data[start + 4..start + 7]) as usize,
            2 => {
                if available < 16 {
                    return Err(GribError::Truncated {
                        offset: start,
                        needed: 16,
                        available,
                    });
                }
                edition2::parse_indicator(&self.data[start..])?.message_length as usize
            }
            other => return Err(GribError::UnsupportedEdition(other)),
        };

        if length > available {
            return Err(GribError::Truncated {
                offset: start,
                needed: length,
                available,
            });
        }

        let message = self.data.slice(start..start + length);
        if !message.ends_with(b"7777") {
            return Err(GribError::InvalidFormat(format!(
                "message {} at offset {} does not end with 7777",
                self.index, start
            )));
        }

        trace!(index = self.index, offset = start, edition, length, "Decoding GRIB message");

        let decoded = match edition {
            1 => self.decode_edition1(&message, start)?,
            _ => self.decode_edition2(&message, start)?,
        };

        self.offset = start + length;
        self.index += 1;
        Ok(Some(decoded))
    }

    fn decode_edition1(&self, message: &Bytes, offset: usize) -> Result<GribMessage, GribError> {
        edition1::parse_indicator(message)?;

        let mut cursor = 8;
        let pds = edition1::parse_product_definition(message, cursor)?;
        cursor += pds.length;

        if !pds.has_gds {
            return Err(GribError::InvalidSection {
                section: 2,
                reason: format!("predefined grid {} not supported, GDS required", pds.grid_id),
            });
        }
        let (grid, gds_length) = edition1::parse_grid_description(message, cursor)?;
        cursor += gds_length;

        let bitmap = if pds.has_bms {
            let (bitmap, bms_length) = edition1::parse_bitmap(message, cursor)?;
            cursor += bms_length;
            Some(bitmap)
        } else {
            None
        };

        let bds = edition1::parse_binary_data(message, cursor)?;
        let packing = edition1::simple_packing(&pds, &bds, grid.num_points() as u32);

        let parameter = ParameterId::Edition1 {
            table: pds.table_version,
            number: pds.parameter,
        };
        let info = self.tables.parameter(parameter);

        debug!(
            index = self.index,
            parameter = %info.short_name,
            centre = pds.centre,
            process = pds.process_id,
            "Decoded GRIB1 message"
        );

        Ok(GribMessage {
            index: self.index,
            offset,
            edition: 1,
            centre: pds.centre as u16,
            parameter,
            short_name: info.short_name,
            units: info.units,
            level_type: pds.level_type,
            level_value: pds.level_value,
            level_description: self
                .tables
                .level_description(1, pds.level_type, pds.level_value),
            reference_time: pds.reference_time,
            forecast_time: pds.forecast_time,
            grid,
            packing,
            bitmap,
            data: bds.data,
        })
    }

    fn decode_edition2(&self, message: &Bytes, offset: usize) -> Result<GribMessage, GribError> {
        let indicator = edition2::parse_indicator(message)?;
        let identification = edition2::parse_identification(message)?;
        let grid = edition2::parse_grid_definition(message)?;
        let product = edition2::parse_product_definition(message)?;
        let packing = edition2::parse_data_representation(message, grid.num_points() as u32)?;
        let bitmap = edition2::parse_bitmap(message)?;
        let data = edition2::parse_data_section(message)?;

        let parameter = ParameterId::Edition2 {
            discipline: indicator.discipline,
            category: product.parameter_category,
            number: product.parameter_number,
        };
        let info = self.tables.parameter(parameter);

        debug!(
            index = self.index,
            parameter = %info.short_name,
            centre = identification.centre,
            template = product.template,
            "Decoded GRIB2 message"
        );

        Ok(GribMessage {
            index: self.index,
            offset,
            edition: 2,
            centre: identification.centre,
            parameter,
            short_name: info.short_name,
            units: info.units,
            level_type: product.level_type,
            level_value: product.level_value,
            level_description: self
                .tables
                .level_description(2, product.level_type, product.level_value),
            reference_time: identification.reference_time,
            forecast_time: product.forecast_time,
            grid,
            packing,
            bitmap,
            data,
        })
    }
}

impl Iterator for GribReader {
    type Item = Result<GribMessage, GribError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_message() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => None,
            Err(e) => {
                // A decode error ends iteration
                self.offset = self.data.len();
                Some(Err(e))
            }
        }
    }
}

/// Position of the next `GRIB` marker at or after `from`.
fn find_marker(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(4)
        .position(|w| w == b"GRIB")
        .map(|pos| from + pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_messages() {
        let mut reader = GribReader::new(Bytes::new());
        assert!(reader.next_message().unwrap().is_none());
    }

    #[test]
    fn test_find_marker_skips_padding() {
        let data = b"\0\0junkGRIB\0\0\0\x01";
        assert_eq!(find_marker(data, 0), Some(6));
        assert_eq!(find_marker(data, 7), None);
    }

    #[test]
    fn test_truncated_message() {
        // Edition 1 indicator claiming 100 bytes
        let data = Bytes::from_static(b"GRIB\0\0\x64\x01\0\0");
        let mut reader = GribReader::new(data);
        assert!(matches!(
            reader.next_message(),
            Err(GribError::Truncated { needed: 100, .. })
        ));
    }
}
