//! Big-endian integer and float helpers shared by both GRIB editions.

/// Unsigned big-endian integer of up to four octets.
pub fn read_unsigned(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Sign-magnitude big-endian integer of up to four octets.
///
/// GRIB stores negative values with the most significant bit set and the
/// magnitude in the remaining bits, not in two's complement. Empty or
/// over-long input decodes to 0.
pub fn decode_signed(bytes: &[u8]) -> i32 {
    if bytes.is_empty() || bytes.len() > 4 {
        return 0;
    }
    let raw = read_unsigned(bytes);
    let sign_bit = 1u32 << (bytes.len() * 8 - 1);
    let magnitude = (raw & !sign_bit) as i32;
    if raw & sign_bit != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// IBM System/360 single precision float (GRIB1 reference values).
///
/// Layout: sign bit, 7-bit base-16 exponent biased by 64, 24-bit fraction.
pub fn ibm_to_f32(bytes: [u8; 4]) -> f32 {
    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = (bytes[0] & 0x7f) as i32 - 64;
    let mantissa = read_unsigned(&bytes[1..4]) as f64 / (1u32 << 24) as f64;
    (sign * mantissa * 16f64.powi(exponent)) as f32
}

/// Extract `num_bits` bits starting at `start_bit` (MSB first).
pub fn extract_bits(data: &[u8], start_bit: usize, num_bits: usize) -> Result<u32, String> {
    if num_bits > 32 || num_bits == 0 {
        return Err(format!("Invalid number of bits: {}", num_bits));
    }

    let mut result = 0u32;

    for i in 0..num_bits {
        let absolute_bit = start_bit + i;
        let byte_idx = absolute_bit / 8;
        let bit_idx = 7 - (absolute_bit % 8);

        if byte_idx >= data.len() {
            return Err("Not enough data to extract bits".to_string());
        }

        let bit = (data[byte_idx] >> bit_idx) & 1;
        result = (result << 1) | (bit as u32);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bits() {
        let data = vec![0b10110101];
        assert_eq!(extract_bits(&data, 0, 2).unwrap(), 0b10);
        assert_eq!(extract_bits(&data, 2, 2).unwrap(), 0b11);
        assert_eq!(extract_bits(&data, 0, 8).unwrap(), 0b10110101);
        assert!(extract_bits(&data, 4, 8).is_err());
    }

    #[test]
    fn test_decode_signed_widths() {
        assert_eq!(decode_signed(&[0x80, 0x01]), -1);
        assert_eq!(decode_signed(&[0x00, 0x01]), 1);
        // -45.000 degrees in GRIB1 millidegrees (24-bit)
        assert_eq!(decode_signed(&[0x80, 0xAF, 0xC8]), -45_000);
        assert_eq!(decode_signed(&[0x80, 0x00, 0x03, 0xE8]), -1000);
        assert_eq!(decode_signed(&[]), 0);
    }

    #[test]
    fn test_ibm_float() {
        // 1.0 = 0x41100000
        assert_eq!(ibm_to_f32([0x41, 0x10, 0x00, 0x00]), 1.0);
        // -118.625 = 0xC276A000
        assert!((ibm_to_f32([0xC2, 0x76, 0xA0, 0x00]) + 118.625).abs() < 1e-4);
        assert_eq!(ibm_to_f32([0x00, 0x00, 0x00, 0x00]), 0.0);
    }
}
