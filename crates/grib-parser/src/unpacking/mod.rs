//! Grid-point data unpacking.
//!
//! Only simple packing is implemented; it is what both GRIB1 grid-point
//! data and GRIB2 template 5.0 use for wind fields.

use crate::bits::extract_bits;
use crate::GribError;

/// Largest grid accepted for unpacking. Headers claiming more points are
/// treated as corrupt rather than allocated.
pub const MAX_GRID_POINTS: usize = 1 << 27;

/// Parameters of a simple-packed field, identical in meaning for both
/// editions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplePacking {
    /// Number of grid points, including missing ones
    pub num_points: u32,
    pub reference_value: f32,
    pub binary_scale_factor: i16,
    pub decimal_scale_factor: i16,
    pub bits_per_value: u8,
}

/// Unpack simple packed data.
///
/// Formula: value = (reference_value + packed_value * 2^E) * 10^-D
///
/// With a bitmap, only the points whose bit is set have a packed value in
/// `packed_data`; the others come back as `None`.
pub fn unpack_simple(
    packed_data: &[u8],
    packing: &SimplePacking,
    bitmap: Option<&[u8]>,
) -> Result<Vec<Option<f32>>, GribError> {
    let num_points = packing.num_points as usize;
    let binary_scale = 2.0_f64.powi(packing.binary_scale_factor as i32);
    let decimal_scale = 10.0_f64.powi(-(packing.decimal_scale_factor as i32));
    let reference = packing.reference_value as f64;
    let bits_per_value = packing.bits_per_value as usize;

    if num_points > MAX_GRID_POINTS {
        return Err(GribError::UnpackingError(format!(
            "Grid of {} points exceeds the limit of {}",
            num_points, MAX_GRID_POINTS
        )));
    }

    let present_points = match bitmap {
        Some(bm) => {
            if bm.len() * 8 < num_points {
                return Err(GribError::UnpackingError(format!(
                    "Bitmap of {} bytes too short for {} points",
                    bm.len(),
                    num_points
                )));
            }
            count_present(bm, num_points)
        }
        None => num_points,
    };

    let needed_bits = present_points as u64 * bits_per_value as u64;
    let available_bits = packed_data.len() as u64 * 8;
    if needed_bits > available_bits {
        return Err(GribError::UnpackingError(format!(
            "{} values of {} bits need {} bytes, data section holds {}",
            present_points,
            bits_per_value,
            needed_bits.div_ceil(8),
            packed_data.len()
        )));
    }

    let mut values = Vec::with_capacity(num_points);
    let mut bit_position = 0;

    for i in 0..num_points {
        let present = match bitmap {
            Some(bm) => {
                let byte = bm.get(i / 8).ok_or_else(|| {
                    GribError::UnpackingError(format!(
                        "Bitmap too short for {} points",
                        num_points
                    ))
                })?;
                (byte >> (7 - (i % 8))) & 1 == 1
            }
            None => true,
        };

        if !present {
            values.push(None);
            continue;
        }

        if bits_per_value == 0 {
            // All values are the reference value
            values.push(Some((reference * decimal_scale) as f32));
            continue;
        }

        let packed_value = extract_bits(packed_data, bit_position, bits_per_value)
            .map_err(|e| GribError::UnpackingError(format!("Failed to extract bits: {}", e)))?;
        bit_position += bits_per_value;

        let value = (reference + packed_value as f64 * binary_scale) * decimal_scale;
        values.push(Some(value as f32));
    }

    Ok(values)
}

/// Set bits among the first `num_points` bits of `bitmap`.
fn count_present(bitmap: &[u8], num_points: usize) -> usize {
    let full = num_points / 8;
    let mut count: usize = bitmap[..full].iter().map(|b| b.count_ones() as usize).sum();
    let rest = num_points % 8;
    if rest > 0 {
        let mask = 0xFFu8 << (8 - rest);
        count += (bitmap[full] & mask).count_ones() as usize;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packing(num_points: u32, bits: u8, reference: f32, e: i16, d: i16) -> SimplePacking {
        SimplePacking {
            num_points,
            reference_value: reference,
            binary_scale_factor: e,
            decimal_scale_factor: d,
            bits_per_value: bits,
        }
    }

    #[test]
    fn test_simple_unpacking() {
        let packed = vec![100, 200];
        let vals = unpack_simple(&packed, &packing(2, 8, 0.0, 0, 0), None).unwrap();
        assert_eq!(vals.len(), 2);
        assert!((vals[0].unwrap() - 100.0).abs() < 0.1);
        assert!((vals[1].unwrap() - 200.0).abs() < 0.1);
    }

    #[test]
    fn test_scale_factors() {
        // (-5 + 3 * 2^1) * 10^-1 = 0.1
        let vals = unpack_simple(&[3], &packing(1, 8, -5.0, 1, 1), None).unwrap();
        assert!((vals[0].unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_bitmap_skips_missing_points() {
        // Points 0 and 2 present, point 1 missing: only two packed values
        let bitmap = [0b1010_0000];
        let vals = unpack_simple(&[7, 9], &packing(3, 8, 0.0, 0, 0), Some(&bitmap)).unwrap();
        assert_eq!(vals, vec![Some(7.0), None, Some(9.0)]);
    }

    #[test]
    fn test_constant_field() {
        let vals = unpack_simple(&[], &packing(4, 0, 2.5, 0, 0), None).unwrap();
        assert_eq!(vals, vec![Some(2.5); 4]);
    }

    #[test]
    fn test_truncated_data_errors() {
        assert!(unpack_simple(&[1], &packing(2, 8, 0.0, 0, 0), None).is_err());
    }

    #[test]
    fn test_oversized_header_rejected_before_allocation() {
        let result = unpack_simple(&[0; 16], &packing(65535 * 65535, 16, 0.0, 0, 0), None);
        assert!(matches!(result, Err(GribError::UnpackingError(_))));

        // 1000 points of 16 bits cannot fit in 16 bytes
        let result = unpack_simple(&[0; 16], &packing(1000, 16, 0.0, 0, 0), None);
        assert!(matches!(result, Err(GribError::UnpackingError(_))));
    }

    #[test]
    fn test_bitmap_counts_only_present_points() {
        // 12 points, 3 present: three 8-bit values suffice
        let bitmap = [0b1000_0001, 0b1000_0000];
        let vals = unpack_simple(&[1, 2, 3], &packing(12, 8, 0.0, 0, 0), Some(&bitmap)).unwrap();
        assert_eq!(vals.iter().filter(|v| v.is_some()).count(), 3);
        assert_eq!(vals[8], Some(3.0));

        // Trailing bits past the last point are ignored
        let bitmap = [0b0000_0000, 0b0000_1111];
        let vals = unpack_simple(&[], &packing(12, 8, 0.0, 0, 0), Some(&bitmap)).unwrap();
        assert_eq!(vals, vec![None; 12]);

        assert!(unpack_simple(&[1, 2], &packing(12, 8, 0.0, 0, 0), Some(&[0xFF, 0xF0])).is_err());
        assert!(unpack_simple(&[1], &packing(12, 8, 0.0, 0, 0), Some(&[0x80])).is_err());
    }
}
