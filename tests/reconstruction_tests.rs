//! End-to-end tests for dive reconstruction
//!
//! Drives the public API the way the CLI does: load a capture from disk,
//! resolve the descriptor, reconstruct, and render the document.

use dlf_parser::{
    load_dive_file, parse_dive_bytes, parse_dive_file, write_document, DeviceSelection, DiveError,
    DiveLog, ReplayContext, StoreLimits,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn time_only_capture(samples: u32) -> String {
    let values: Vec<String> = (0..samples)
        .map(|i| format!(r#"{{"type":"time","value":{}}}"#, i * 1000))
        .collect();
    format!(
        r#"{{"vendor":"Divesoft","product":"Freedom","samples":[{}]}}"#,
        values.join(",")
    )
}

fn write_capture(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("Failed to write capture");
    path
}

/// Mirrors the CLI: nothing is written unless the whole run succeeds
fn convert(path: &Path, selection: &DeviceSelection, limits: &StoreLimits) -> (Vec<u8>, Result<DiveLog, DiveError>) {
    let mut out = Vec::new();
    let result = ReplayContext::with_builtin_devices()
        .and_then(|context| parse_dive_file(path, &context, selection, limits))
        .and_then(|log| {
            write_document(&log, &mut out)?;
            Ok(log)
        });
    (out, result)
}

#[test]
fn test_reference_scenario_document() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_capture(
        &temp_dir,
        "scenario.json",
        r#"{"vendor":"Divesoft","product":"Freedom","samples":[
            {"type":"time","value":0},
            {"type":"depth","value":0.0},
            {"type":"time","value":60000},
            {"type":"depth","value":5.0},
            {"type":"temperature","value":20.0}
        ]}"#,
    );

    let (out, result) = convert(&path, &DeviceSelection::default(), &StoreLimits::default());
    result.expect("Conversion should succeed");

    let document: serde_json::Value = serde_json::from_slice(&out).expect("Output should be JSON");
    assert_eq!(
        document["samples"],
        serde_json::json!([
            { "index": 0, "time": "0:00", "depth": 0.0, "event": null },
            { "index": 1, "time": "1:00", "depth": 5.0, "temperature": 20.0, "event": null }
        ])
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(r#""depth": 0.00"#));
    assert!(text.contains(r#""depth": 5.00, "temperature": 20.0"#));
}

#[test]
fn test_sample_count_matches_time_markers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_capture(&temp_dir, "long.json", &time_only_capture(1000));

    let (out, result) = convert(&path, &DeviceSelection::default(), &StoreLimits::default());
    let log = result.expect("Conversion should succeed");

    assert_eq!(log.samples.len(), 1000);
    assert!(log.stats.sample_growths <= 10);
    let document: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(document["samples"][999]["time"], "16:39");
}

#[test]
fn test_allocation_failure_on_129th_sample_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_capture(&temp_dir, "big.json", &time_only_capture(129));
    let limits = StoreLimits {
        max_samples: Some(128),
        max_events: None,
    };

    let (out, result) = convert(&path, &DeviceSelection::default(), &limits);
    let err = result.expect_err("The 129th sample should not fit");

    assert!(matches!(err, DiveError::Allocation { .. }));
    assert_eq!(err.exit_code(), 3);
    assert!(out.is_empty(), "No output fragment may be emitted");
}

#[test]
fn test_128_samples_fit_under_ceiling() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_capture(&temp_dir, "exact.json", &time_only_capture(128));
    let limits = StoreLimits {
        max_samples: Some(128),
        max_events: None,
    };

    let (_, result) = convert(&path, &DeviceSelection::default(), &limits);
    assert_eq!(result.expect("128 samples should fit").samples.len(), 128);
}

#[test]
fn test_unregistered_device_has_its_own_exit_code() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_capture(&temp_dir, "dive.json", &time_only_capture(3));
    let selection = DeviceSelection {
        vendor: "Acme".to_string(),
        product: "Bathyscaphe".to_string(),
    };

    let (out, result) = convert(&path, &selection, &StoreLimits::default());
    let err = result.expect_err("Unknown device should fail");

    assert!(matches!(err, DiveError::DescriptorNotFound { .. }));
    assert_eq!(err.exit_code(), 6);
    assert!(out.is_empty());
}

#[test]
fn test_missing_file_fails_to_open() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let err = load_dive_file(&temp_dir.path().join("missing.dlf")).expect_err("File is missing");
    assert_eq!(err.exit_code(), 2);
}

#[test]
#[cfg(unix)]
fn test_directory_opens_but_cannot_be_read() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let err = load_dive_file(temp_dir.path()).expect_err("A directory is not a dive log");
    assert!(matches!(err, DiveError::Read { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_binary_garbage_fails_parser_init() {
    let context = ReplayContext::with_builtin_devices().unwrap();
    let err = parse_dive_bytes(
        &[0xde, 0xad, 0xbe, 0xef],
        "garbage.dlf",
        &context,
        &DeviceSelection::default(),
        &StoreLimits::default(),
    )
    .expect_err("Garbage is not a capture");
    assert_eq!(err.exit_code(), 7);
}

#[test]
fn test_values_before_first_time_marker_are_dropped() {
    let context = ReplayContext::with_builtin_devices().unwrap();
    let capture = br#"{"vendor":"Divesoft","product":"Freedom","samples":[
        {"type":"depth","value":30.0},
        {"type":"event","value":{"kind":"bookmark","name":"too early"}},
        {"type":"time","value":0},
        {"type":"time","value":10000},
        {"type":"depth","value":4.5},
        {"type":"time","value":20000},
        {"type":"event","value":{"kind":"ascent"}}
    ]}"#;

    let log = parse_dive_bytes(
        capture,
        "early.json",
        &context,
        &DeviceSelection::default(),
        &StoreLimits::default(),
    )
    .unwrap();

    let depths: Vec<f64> = log.samples.iter().map(|s| s.depth).collect();
    assert_eq!(depths, vec![0.0, 4.5, 4.5]);
    assert_eq!(log.events.len(), 1);
    assert_eq!(log.events[0].time, 20);
    assert_eq!(log.events[0].event_type, "ascent");
    assert_eq!(log.stats.dropped_values, 2);
}

#[test]
fn test_identical_input_renders_identical_bytes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_capture(
        &temp_dir,
        "repeat.json",
        r#"{"vendor":"Divesoft","product":"Freedom","divetime":61,"samples":[
            {"type":"time","value":0},{"type":"depth","value":1.005},
            {"type":"ppo2","value":0.7},{"type":"time","value":30000},
            {"type":"event","value":{"kind":8,"name":"mark"}}]}"#,
    );

    let (first, a) = convert(&path, &DeviceSelection::default(), &StoreLimits::default());
    let (second, b) = convert(&path, &DeviceSelection::default(), &StoreLimits::default());
    a.unwrap();
    b.unwrap();
    assert_eq!(first, second);
}
