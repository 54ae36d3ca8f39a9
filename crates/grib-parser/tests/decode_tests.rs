//! Decoding synthetic GRIB1 and GRIB2 messages end to end.

use bytes::Bytes;
use chrono::{NaiveDate, Timelike};
use grib_parser::{GribError, GribReader, ParameterId};
use test_utils::{assert_approx_eq, grib1_wind_series, grib2_wind_series, Grib1Builder, Grib2Builder};

fn read_one(bytes: Vec<u8>) -> grib_parser::GribMessage {
    let mut reader = GribReader::new(Bytes::from(bytes));
    let message = reader
        .next_message()
        .expect("decode failed")
        .expect("no message");
    assert!(reader.next_message().expect("trailing data").is_none());
    message
}

#[test]
fn test_grib1_metadata() {
    let message = read_one(
        Grib1Builder::new()
            .with_reference_time(2014, 2, 1, 6, 0)
            .with_forecast_hour(12)
            .build(),
    );

    assert_eq!(message.edition, 1);
    assert_eq!(message.centre, 7);
    assert_eq!(message.short_name, "UGRD");
    assert_eq!(message.parameter, ParameterId::Edition1 { table: 2, number: 33 });
    assert_eq!(message.level_type, 105);
    assert_eq!(message.level_value, 10);
    assert_eq!(
        message.reference_time,
        NaiveDate::from_ymd_opt(2014, 2, 1).unwrap().and_hms_opt(6, 0, 0).unwrap()
    );
    assert_eq!(message.forecast_hours(), Some(12));
    assert_eq!(message.validity_time().hour(), 18);

    let stamp = message.data_stamp();
    assert_eq!(stamp.date, 20140201);
    assert_eq!(stamp.time, 600);
}

#[test]
fn test_grib1_grid_and_values() {
    let data: Vec<f32> = (0..35).map(|i| i as f32 * 0.5 - 8.0).collect();
    let message = read_one(Grib1Builder::new().with_data(data.clone()).build());

    assert_eq!(message.grid_dims(), (5, 7));
    assert_approx_eq!(message.grid.first_lat, 46.0, 1e-9);
    assert_approx_eq!(message.grid.first_lon, -6.0, 1e-9);
    assert_approx_eq!(message.grid.last_lat, 30.0, 1e-9);
    assert_approx_eq!(message.grid.last_lon, 42.0, 1e-9);
    assert_eq!(message.grid.di, Some(8.0));
    assert_eq!(message.grid.dj, Some(4.0));

    let values = message.values().unwrap();
    assert_eq!(values.shape(), (7, 5));
    for (decoded, expected) in values.data.iter().zip(&data) {
        assert_approx_eq!(*decoded, *expected, 0.01);
    }
}

#[test]
fn test_grib1_negative_reference_value() {
    let message = read_one(Grib1Builder::new().with_constant_value(-12.25).build());
    assert_eq!(message.packing.bits_per_value, 0);
    let values = message.values().unwrap();
    assert!(values.data.iter().all(|v| (*v + 12.25).abs() < 1e-4));
}

#[test]
fn test_grib1_bitmap_marks_missing_points() {
    let mut data = vec![3.0f32; 35];
    data[0] = f32::NAN;
    data[17] = f32::NAN;
    data[34] = 9.0;

    let message = read_one(Grib1Builder::new().with_data(data).build());
    assert!(message.bitmap.is_some());

    let values = message.values().unwrap();
    assert!(values.data[0].is_nan());
    assert!(values.data[17].is_nan());
    assert_approx_eq!(values.data[1], 3.0, 0.01);
    assert_approx_eq!(values.data[34], 9.0, 0.01);
}

#[test]
fn test_grib1_latlons_follow_rows() {
    let message = read_one(Grib1Builder::new().build());
    let (lats, lons) = message.latlons();

    assert_eq!(lats.shape(), (7, 5));
    assert_approx_eq!(lats.get(0, 0).unwrap(), 46.0, 1e-4);
    assert_approx_eq!(lats.get(3, 4).unwrap(), 30.0, 1e-4);
    assert_approx_eq!(lons.get(0, 2).unwrap(), -6.0, 1e-4);
    assert_approx_eq!(lons.get(6, 2).unwrap(), 42.0, 1e-4);
}

#[test]
fn test_grib1_south_to_north_scan() {
    // Scan flag 0x40: rows run south to north
    let data: Vec<f32> = (0..6).map(|i| i as f32).collect();
    let message = read_one(
        Grib1Builder::new()
            .with_grid(3, 2, 30.0, 0.0, 40.0, 20.0)
            .with_scanning_mode(0x40)
            .with_data(data)
            .build(),
    );

    let (lats, _) = message.latlons();
    assert_approx_eq!(lats.get(0, 0).unwrap(), 30.0, 1e-4);
    assert_approx_eq!(lats.get(0, 1).unwrap(), 40.0, 1e-4);

    let values = message.values().unwrap();
    assert_approx_eq!(values.get(2, 1).unwrap(), 5.0, 0.01);
}

#[test]
fn test_grib2_metadata_and_values() {
    let message = read_one(
        Grib2Builder::new()
            .with_parameter(2, 3)
            .with_forecast_hour(6)
            .with_gradient(-10.0, 10.0)
            .build(),
    );

    assert_eq!(message.edition, 2);
    assert_eq!(message.short_name, "VGRD");
    assert_eq!(
        message.parameter,
        ParameterId::Edition2 { discipline: 0, category: 2, number: 3 }
    );
    assert_eq!(message.level_type, 103);
    assert_eq!(message.forecast_hours(), Some(6));
    assert_eq!(message.grid_dims(), (5, 7));

    let values = message.values().unwrap();
    assert_approx_eq!(values.data[0], -10.0, 0.01);
    assert!(values.data.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_grib2_negative_longitudes() {
    let message = read_one(Grib2Builder::new().with_grid(4, 3, 10.0, -30.0, 0.0, -15.0).build());
    assert_approx_eq!(message.grid.first_lon, -30.0, 1e-6);
    assert_approx_eq!(message.grid.last_lon, -15.0, 1e-6);
    assert_approx_eq!(message.grid.longitude(1), -25.0, 1e-6);
}

#[test]
fn test_grib2_bitmap_marks_missing_points() {
    let mut data = vec![1.5f32; 35];
    data[5] = f32::NAN;
    data[6] = 4.5;
    let message = read_one(Grib2Builder::new().with_data(data).build());

    let values = message.values().unwrap();
    assert!(values.data[5].is_nan());
    assert_approx_eq!(values.data[6], 4.5, 0.01);
    assert_eq!(values.data.iter().filter(|v| v.is_nan()).count(), 1);
}

#[test]
fn test_series_iterates_in_file_order() {
    for bytes in [grib1_wind_series(4), grib2_wind_series(4)] {
        let messages: Vec<_> = GribReader::new(Bytes::from(bytes))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(messages.len(), 8);
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.index, i);
            let expected = if i % 2 == 0 { "UGRD" } else { "VGRD" };
            assert_eq!(message.short_name, expected);
            assert_eq!(message.forecast_hours(), Some((i / 2 * 6) as i64));
        }
    }
}

#[test]
fn test_leading_garbage_is_skipped() {
    let mut bytes = b"HEADER\n".to_vec();
    bytes.extend(Grib1Builder::new().build());
    bytes.extend_from_slice(&[0, 0, 0]);
    let message = read_one(bytes);
    assert_eq!(message.offset, 7);
}

#[test]
fn test_truncated_message() {
    let mut bytes = Grib2Builder::new().build();
    bytes.truncate(bytes.len() - 10);
    let result = GribReader::new(Bytes::from(bytes)).next_message();
    assert!(matches!(result, Err(GribError::Truncated { .. })));
}

#[test]
fn test_unsupported_grid_template() {
    let mut bytes = Grib2Builder::new().build();
    // Section 3 starts after section 0 (16) and section 1 (21); template at +12
    let template_offset = 16 + 21 + 12;
    bytes[template_offset..template_offset + 2].copy_from_slice(&30u16.to_be_bytes());

    let result = GribReader::new(Bytes::from(bytes)).next_message();
    assert!(matches!(
        result,
        Err(GribError::UnsupportedTemplate { section: 3, template: 30 })
    ));
}

#[test]
fn test_unsupported_edition() {
    let mut bytes = Grib1Builder::new().build();
    bytes[7] = 3;
    let result = GribReader::new(Bytes::from(bytes)).next_message();
    assert!(matches!(result, Err(GribError::UnsupportedEdition(3))));
}
