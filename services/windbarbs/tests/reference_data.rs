//! Plots the real marine wind file when it is available locally.
//!
//! Set `TEST_DATA_DIR` or place `Mediterranean.wind.3day.grb` under
//! `testdata/` at the workspace root.

use test_utils::{require_test_file, temp_test_dir};
use windbarbs::{decode_records, pair_snapshots, run, Config};

#[test]
fn test_mediterranean_file_pairs_into_snapshots() {
    let path = require_test_file!("Mediterranean.wind.3day.grb");
    let bytes = std::fs::read(&path).unwrap();

    let records = decode_records(bytes.into(), false).unwrap();
    assert_eq!(records.len() % 2, 0);
    let snapshots = pair_snapshots(records).unwrap();
    assert!(!snapshots.is_empty());
    for pair in snapshots.windows(2) {
        assert!(pair[0].validity() < pair[1].validity());
    }
}

#[test]
fn test_mediterranean_file_plots() {
    let path = require_test_file!("Mediterranean.wind.3day.grb");
    let out = temp_test_dir();
    let config = Config {
        input: path,
        output_dir: out.path().to_path_buf(),
        dpi: 30,
        diagnostics: false,
        ..Default::default()
    };

    let summary = run(&config).unwrap();
    assert!(summary.output.exists());
    assert!(summary
        .output
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("t_0__"));
}
