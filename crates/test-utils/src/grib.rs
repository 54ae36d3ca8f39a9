//! GRIB test data builders.
//!
//! Create minimal synthetic GRIB1 and GRIB2 messages with valid structure:
//! regular lat/lon grid, simple packing with 16 bits per value, and a
//! bitmap whenever the data contains NaN.

/// Default grid: 7x5 points at 8° spacing over the Mediterranean,
/// scanned north to south and west to east.
const DEFAULT_NI: u32 = 7;
const DEFAULT_NJ: u32 = 5;
const DEFAULT_LA1: f64 = 46.0;
const DEFAULT_LO1: f64 = -6.0;
const DEFAULT_LA2: f64 = 30.0;
const DEFAULT_LO2: f64 = 42.0;

/// Build a GRIB1 message.
#[derive(Debug, Clone)]
pub struct Grib1Builder {
    table_version: u8,
    centre: u8,
    parameter: u8,
    level_type: u8,
    level_value: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    forecast_hour: u8,
    ni: u32,
    nj: u32,
    la1: f64,
    lo1: f64,
    la2: f64,
    lo2: f64,
    scanning_mode: u8,
    data_values: Vec<f32>,
}

impl Grib1Builder {
    /// 10 m U wind (parameter 33) from NCEP, analysis at 2014-02-01 06:00.
    pub fn new() -> Self {
        Self {
            table_version: 2,
            centre: 7,
            parameter: 33,
            level_type: 105,
            level_value: 10,
            year: 2014,
            month: 2,
            day: 1,
            hour: 6,
            minute: 0,
            forecast_hour: 0,
            ni: DEFAULT_NI,
            nj: DEFAULT_NJ,
            la1: DEFAULT_LA1,
            lo1: DEFAULT_LO1,
            la2: DEFAULT_LA2,
            lo2: DEFAULT_LO2,
            scanning_mode: 0,
            data_values: vec![0.0; (DEFAULT_NI * DEFAULT_NJ) as usize],
        }
    }

    pub fn with_parameter(mut self, number: u8) -> Self {
        self.parameter = number;
        self
    }

    pub fn with_table_version(mut self, version: u8) -> Self {
        self.table_version = version;
        self
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self.minute = minute;
        self
    }

    pub fn with_forecast_hour(mut self, hour: u8) -> Self {
        self.forecast_hour = hour;
        self
    }

    /// Grid shape and corner points (degrees), resetting the data to zeros.
    pub fn with_grid(mut self, ni: u32, nj: u32, la1: f64, lo1: f64, la2: f64, lo2: f64) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.la1 = la1;
        self.lo1 = lo1;
        self.la2 = la2;
        self.lo2 = lo2;
        self.data_values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_scanning_mode(mut self, flag: u8) -> Self {
        self.scanning_mode = flag;
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.data_values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        self.data_values = data;
        self
    }

    /// Build the complete GRIB1 message bytes
    pub fn build(&self) -> Vec<u8> {
        let pds = self.build_pds();
        let gds = self.build_gds();
        let bms = build_bitmap(&self.data_values).map(|bits| {
            let mut section = Vec::new();
            let length = pad_even(6 + bits.len());
            let unused = (length - 6) * 8 - self.data_values.len();
            push_u24(&mut section, length as u32);
            section.push(unused as u8);
            section.extend_from_slice(&0u16.to_be_bytes());
            section.extend_from_slice(&bits);
            section.resize(length, 0);
            section
        });
        let bds = self.build_bds();

        let total = 8 + pds.len() + gds.len() + bms.as_ref().map_or(0, Vec::len) + bds.len() + 4;

        let mut message = Vec::with_capacity(total);
        message.extend_from_slice(b"GRIB");
        push_u24(&mut message, total as u32);
        message.push(1); // Edition 1
        message.extend_from_slice(&pds);
        message.extend_from_slice(&gds);
        if let Some(bms) = &bms {
            message.extend_from_slice(bms);
        }
        message.extend_from_slice(&bds);
        message.extend_from_slice(b"7777");
        message
    }

    fn build_pds(&self) -> Vec<u8> {
        let has_bitmap = self.data_values.iter().any(|v| v.is_nan());
        let century = (self.year - 1) / 100 + 1;
        let year_of_century = self.year - (century - 1) * 100;

        let mut s = Vec::with_capacity(28);
        push_u24(&mut s, 28);
        s.push(self.table_version);
        s.push(self.centre);
        s.push(0); // Generating process
        s.push(255); // Grid defined by GDS
        s.push(0x80 | if has_bitmap { 0x40 } else { 0 });
        s.push(self.parameter);
        s.push(self.level_type);
        s.extend_from_slice(&self.level_value.to_be_bytes());
        s.push(year_of_century as u8);
        s.push(self.month);
        s.push(self.day);
        s.push(self.hour);
        s.push(self.minute);
        s.push(1); // Time unit: hour
        s.push(self.forecast_hour); // P1
        s.push(0); // P2
        s.push(0); // Time range indicator: valid at reference + P1
        s.extend_from_slice(&0u16.to_be_bytes()); // Number in average
        s.push(0); // Number missing
        s.push(century as u8);
        s.push(0); // Sub-centre
        s.extend_from_slice(&sign_magnitude(0, 2)); // Decimal scale factor
        s
    }

    fn build_gds(&self) -> Vec<u8> {
        let millis = |deg: f64| (deg * 1000.0).round() as i64;
        let di = ((self.lo2 - self.lo1).abs() / (self.ni.max(2) - 1) as f64 * 1000.0).round() as u16;
        let dj = ((self.la2 - self.la1).abs() / (self.nj.max(2) - 1) as f64 * 1000.0).round() as u16;

        let mut s = Vec::with_capacity(32);
        push_u24(&mut s, 32);
        s.push(0); // NV
        s.push(255); // PV/PL
        s.push(0); // Data representation: lat/lon
        s.extend_from_slice(&(self.ni as u16).to_be_bytes());
        s.extend_from_slice(&(self.nj as u16).to_be_bytes());
        s.extend_from_slice(&sign_magnitude(millis(self.la1), 3));
        s.extend_from_slice(&sign_magnitude(millis(self.lo1), 3));
        s.push(0x80); // Increments given
        s.extend_from_slice(&sign_magnitude(millis(self.la2), 3));
        s.extend_from_slice(&sign_magnitude(millis(self.lo2), 3));
        s.extend_from_slice(&di.to_be_bytes());
        s.extend_from_slice(&dj.to_be_bytes());
        s.push(self.scanning_mode);
        s.extend_from_slice(&[0; 4]); // Reserved
        s
    }

    fn build_bds(&self) -> Vec<u8> {
        let packed = SimplePack::new(&self.data_values, true);
        let length = pad_even(11 + packed.data.len());
        let unused_bits = (length - 11) * 8 - packed.bit_count;

        let mut s = Vec::with_capacity(length);
        push_u24(&mut s, length as u32);
        s.push(unused_bits as u8 & 0x0f); // Grid point, simple packing, float
        s.extend_from_slice(&sign_magnitude(packed.binary_scale_factor as i64, 2));
        s.extend_from_slice(&f32_to_ibm(packed.reference_value));
        s.push(packed.bits_per_value);
        s.extend_from_slice(&packed.data);
        s.resize(length, 0);
        s
    }
}

impl Default for Grib1Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a GRIB2 message.
#[derive(Debug, Clone)]
pub struct Grib2Builder {
    discipline: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    ni: u32,
    nj: u32,
    la1: f64,
    lo1: f64,
    la2: f64,
    lo2: f64,
    scanning_mode: u8,
    param_category: u8,
    param_number: u8,
    level_type: u8,
    level_value: u32,
    forecast_hour: u32,
    data_values: Vec<f32>,
}

impl Grib2Builder {
    /// 10 m U wind (0/2/2) from NCEP, analysis at 2014-02-01 06:00.
    pub fn new() -> Self {
        Self {
            discipline: 0,
            center: 7,
            year: 2014,
            month: 2,
            day: 1,
            hour: 6,
            minute: 0,
            ni: DEFAULT_NI,
            nj: DEFAULT_NJ,
            la1: DEFAULT_LA1,
            lo1: DEFAULT_LO1,
            la2: DEFAULT_LA2,
            lo2: DEFAULT_LO2,
            scanning_mode: 0,
            param_category: 2,
            param_number: 2,
            level_type: 103,
            level_value: 10,
            forecast_hour: 0,
            data_values: vec![0.0; (DEFAULT_NI * DEFAULT_NJ) as usize],
        }
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self.minute = minute;
        self
    }

    /// Grid shape and corner points (degrees), resetting the data to zeros.
    pub fn with_grid(mut self, ni: u32, nj: u32, la1: f64, lo1: f64, la2: f64, lo2: f64) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.la1 = la1;
        self.lo1 = lo1;
        self.la2 = la2;
        self.lo2 = lo2;
        self.data_values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_scanning_mode(mut self, flag: u8) -> Self {
        self.scanning_mode = flag;
        self
    }

    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.param_category = category;
        self.param_number = number;
        self
    }

    pub fn with_level(mut self, level_type: u8, level_value: u32) -> Self {
        self.level_type = level_type;
        self.level_value = level_value;
        self
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.forecast_hour = hour;
        self
    }

    pub fn with_constant_value(mut self, value: f32) -> Self {
        self.data_values = vec![value; (self.ni * self.nj) as usize];
        self
    }

    pub fn with_gradient(mut self, min_val: f32, max_val: f32) -> Self {
        let n = (self.ni * self.nj) as usize;
        self.data_values = (0..n)
            .map(|i| min_val + (max_val - min_val) * (i as f32 / n as f32))
            .collect();
        self
    }

    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        self.data_values = data;
        self
    }

    /// Build the complete GRIB2 message bytes
    pub fn build(&self) -> Vec<u8> {
        let section1 = self.build_section1();
        let section3 = self.build_section3();
        let section4 = self.build_section4();
        let packed = SimplePack::new(&self.data_values, false);
        let section5 = self.build_section5(&packed);
        let section6 = self.build_section6();
        let section7 = build_section7(&packed);

        let message_length = 16
            + section1.len()
            + section3.len()
            + section4.len()
            + section5.len()
            + section6.len()
            + section7.len()
            + 4;

        let mut message = Vec::with_capacity(message_length);

        // Section 0: Indicator
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]); // Reserved
        message.push(self.discipline);
        message.push(2); // Edition 2
        message.extend_from_slice(&(message_length as u64).to_be_bytes());

        message.extend_from_slice(&section1);
        message.extend_from_slice(&section3);
        message.extend_from_slice(&section4);
        message.extend_from_slice(&section5);
        message.extend_from_slice(&section6);
        message.extend_from_slice(&section7);

        // Section 8: End
        message.extend_from_slice(b"7777");

        message
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(21);
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(1); // Section number
        section.extend_from_slice(&self.center.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        section.push(2); // Master table version
        section.push(1); // Local table version
        section.push(1); // Significance of reference time (start of forecast)
        section.extend_from_slice(&self.year.to_be_bytes());
        section.push(self.month);
        section.push(self.day);
        section.push(self.hour);
        section.push(self.minute);
        section.push(0); // Second
        section.push(0); // Production status (operational)
        section.push(1); // Type of data (forecast)
        section
    }

    fn build_section3(&self) -> Vec<u8> {
        let micros = |deg: f64| (deg * 1e6).round() as i64;
        let di = ((self.lo2 - self.lo1).abs() / (self.ni.max(2) - 1) as f64 * 1e6).round() as u32;
        let dj = ((self.la2 - self.la1).abs() / (self.nj.max(2) - 1) as f64 * 1e6).round() as u32;

        let mut section = Vec::with_capacity(72);
        section.extend_from_slice(&72u32.to_be_bytes());
        section.push(3); // Section number
        section.push(0); // Source of grid definition
        section.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        section.push(0); // Number of octets for optional list
        section.push(0); // Interpretation of optional list
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 3.0

        section.push(6); // Shape of Earth (spherical, 6371229 m)
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.extend_from_slice(&self.ni.to_be_bytes());
        section.extend_from_slice(&self.nj.to_be_bytes());
        section.extend_from_slice(&0u32.to_be_bytes()); // Basic angle
        section.extend_from_slice(&0xFFFFFFFFu32.to_be_bytes()); // Subdivisions
        section.extend_from_slice(&sign_magnitude(micros(self.la1), 4));
        section.extend_from_slice(&sign_magnitude(micros(self.lo1), 4));
        section.push(48); // Resolution and component flags: increments given
        section.extend_from_slice(&sign_magnitude(micros(self.la2), 4));
        section.extend_from_slice(&sign_magnitude(micros(self.lo2), 4));
        section.extend_from_slice(&di.to_be_bytes());
        section.extend_from_slice(&dj.to_be_bytes());
        section.push(self.scanning_mode);
        section
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(34);
        section.extend_from_slice(&34u32.to_be_bytes());
        section.push(4); // Section number
        section.extend_from_slice(&0u16.to_be_bytes()); // Number of coordinate values
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 4.0
        section.push(self.param_category);
        section.push(self.param_number);
        section.push(2); // Type of generating process (forecast)
        section.push(0); // Background generating process
        section.push(0); // Analysis or forecast process
        section.extend_from_slice(&0u16.to_be_bytes()); // Hours of cutoff
        section.push(0); // Minutes of cutoff
        section.push(1); // Time range unit (hours)
        section.extend_from_slice(&self.forecast_hour.to_be_bytes());
        section.push(self.level_type);
        section.push(0); // Scale factor
        section.extend_from_slice(&self.level_value.to_be_bytes());
        section.push(255); // Type of second fixed surface (none)
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section
    }

    fn build_section5(&self, packed: &SimplePack) -> Vec<u8> {
        let mut section = Vec::with_capacity(21);
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(5); // Section number
        section.extend_from_slice(&(packed.packed_count as u32).to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Template 5.0
        section.extend_from_slice(&packed.reference_value.to_be_bytes());
        section.extend_from_slice(&sign_magnitude(packed.binary_scale_factor as i64, 2));
        section.extend_from_slice(&sign_magnitude(0, 2)); // Decimal scale factor
        section.push(packed.bits_per_value);
        section.push(0); // Original field type (floating point)
        section
    }

    fn build_section6(&self) -> Vec<u8> {
        let mut section = Vec::new();
        match build_bitmap(&self.data_values) {
            Some(bits) => {
                section.extend_from_slice(&(6 + bits.len() as u32).to_be_bytes());
                section.push(6);
                section.push(0); // Bitmap follows
                section.extend_from_slice(&bits);
            }
            None => {
                section.extend_from_slice(&6u32.to_be_bytes());
                section.push(6);
                section.push(255); // No bitmap, all data present
            }
        }
        section
    }
}

impl Default for Grib2Builder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_section7(packed: &SimplePack) -> Vec<u8> {
    let mut section = Vec::with_capacity(5 + packed.data.len());
    section.extend_from_slice(&(5 + packed.data.len() as u32).to_be_bytes());
    section.push(7); // Section number
    section.extend_from_slice(&packed.data);
    section
}

/// Simple packing with 16 bits per value over the non-NaN values.
struct SimplePack {
    reference_value: f32,
    binary_scale_factor: i16,
    bits_per_value: u8,
    packed_count: usize,
    bit_count: usize,
    data: Vec<u8>,
}

impl SimplePack {
    /// `ibm_reference` rounds the reference value to what an IBM float can
    /// hold (rounding down), as GRIB1 requires.
    fn new(values: &[f32], ibm_reference: bool) -> Self {
        let present: Vec<f32> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let (min_val, max_val) = present.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(min, max), &v| (min.min(v), max.max(v)),
        );

        if present.is_empty() {
            return Self::constant(0.0, 0);
        }

        let reference_value = if ibm_reference {
            ibm_to_f32(f32_to_ibm(min_val))
        } else {
            min_val
        };
        let range = max_val - reference_value;

        if range == 0.0 {
            return Self::constant(reference_value, present.len());
        }

        // Unpacking: value = reference_value + packed_value * 2^E
        // E = ceil(log2(range / 65535))
        let binary_scale_factor = (range / 65535.0).log2().ceil() as i16;
        let binary_scale = 2.0_f32.powi(binary_scale_factor as i32);

        let mut data = Vec::with_capacity(present.len() * 2);
        for &val in &present {
            let packed_value = ((val - reference_value) / binary_scale)
                .round()
                .clamp(0.0, 65535.0) as u16;
            data.extend_from_slice(&packed_value.to_be_bytes());
        }

        Self {
            reference_value,
            binary_scale_factor,
            bits_per_value: 16,
            packed_count: present.len(),
            bit_count: present.len() * 16,
            data,
        }
    }

    /// All values equal: no data needed (0 bits per value)
    fn constant(reference_value: f32, packed_count: usize) -> Self {
        Self {
            reference_value,
            binary_scale_factor: 0,
            bits_per_value: 0,
            packed_count,
            bit_count: 0,
            data: Vec::new(),
        }
    }
}

/// One bit per point, MSB first; `None` when no value is NaN.
fn build_bitmap(values: &[f32]) -> Option<Vec<u8>> {
    if !values.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut bits = vec![0u8; values.len().div_ceil(8)];
    for (i, v) in values.iter().enumerate() {
        if !v.is_nan() {
            bits[i / 8] |= 0x80 >> (i % 8);
        }
    }
    Some(bits)
}

fn push_u24(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes()[1..]);
}

fn pad_even(len: usize) -> usize {
    len + len % 2
}

/// Sign-magnitude big-endian encoding in `width` bytes.
pub fn sign_magnitude(value: i64, width: usize) -> Vec<u8> {
    let sign_bit = 1u64 << (width * 8 - 1);
    let mut raw = value.unsigned_abs() & (sign_bit - 1);
    if value < 0 {
        raw |= sign_bit;
    }
    raw.to_be_bytes()[8 - width..].to_vec()
}

/// Encode as an IBM System/360 float, truncating the fraction toward
/// negative infinity so the result never exceeds `value`.
pub fn f32_to_ibm(value: f32) -> [u8; 4] {
    if value == 0.0 || !value.is_finite() {
        return [0; 4];
    }
    let negative = value < 0.0;
    let mut magnitude = (value as f64).abs();
    let mut exponent = 64i32;
    while magnitude >= 1.0 {
        magnitude /= 16.0;
        exponent += 1;
    }
    while magnitude < 1.0 / 16.0 {
        magnitude *= 16.0;
        exponent -= 1;
    }
    let scaled = magnitude * (1u32 << 24) as f64;
    let mut mantissa = if negative { scaled.ceil() } else { scaled.floor() } as u32;
    if mantissa >= 1 << 24 {
        mantissa >>= 4;
        exponent += 1;
    }
    let word = ((negative as u32) << 31) | ((exponent as u32 & 0x7f) << 24) | mantissa;
    word.to_be_bytes()
}

/// Decode an IBM System/360 float.
pub fn ibm_to_f32(bytes: [u8; 4]) -> f32 {
    let sign = if bytes[0] & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = (bytes[0] & 0x7f) as i32 - 64;
    let mantissa = u32::from_be_bytes([0, bytes[1], bytes[2], bytes[3]]) as f64 / (1u32 << 24) as f64;
    (sign * mantissa * 16f64.powi(exponent)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_grib1_message() {
        let data = Grib1Builder::new().with_constant_value(5.0).build();
        assert_eq!(&data[0..4], b"GRIB");
        assert_eq!(data[7], 1);
        let length = u32::from_be_bytes([0, data[4], data[5], data[6]]) as usize;
        assert_eq!(length, data.len());
        assert_eq!(&data[data.len() - 4..], b"7777");
    }

    #[test]
    fn test_build_grib2_message() {
        let data = Grib2Builder::new().with_gradient(0.0, 10.0).build();
        assert_eq!(&data[0..4], b"GRIB");
        assert_eq!(data[7], 2);
        assert_eq!(&data[data.len() - 4..], b"7777");
    }

    #[test]
    fn test_sign_magnitude() {
        assert_eq!(sign_magnitude(-6000, 3), vec![0x80, 0x17, 0x70]);
        assert_eq!(sign_magnitude(46000, 3), vec![0x00, 0xB3, 0xB0]);
        assert_eq!(sign_magnitude(-3, 2), vec![0x80, 0x03]);
    }

    #[test]
    fn test_ibm_encoding_never_exceeds_value() {
        for value in [1.0f32, -118.625, 0.1, -0.1, 3.3, -27.77, 1234.5] {
            let decoded = ibm_to_f32(f32_to_ibm(value));
            assert!(decoded <= value, "{} encoded above itself as {}", value, decoded);
            assert!((decoded - value).abs() < 1e-4 * value.abs().max(1.0));
        }
    }

    #[test]
    fn test_bitmap_marks_present_points() {
        let bits = build_bitmap(&[1.0, f32::NAN, 2.0]).unwrap();
        assert_eq!(bits, vec![0b1010_0000]);
        assert!(build_bitmap(&[1.0, 2.0]).is_none());
    }
}
