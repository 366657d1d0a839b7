//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use solar_battery_sim::config::SyntheticSettings;
use solar_battery_sim::sim::{BatteryConfig, Sample, TimeSeries};

/// Float tolerance for energy and SOC comparisons.
pub const EPS: f64 = 1e-9;

/// First timestamp of every fixture series (2024-06-01 00:00).
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Hourly samples from `(production, consumption)` pairs.
pub fn hourly(values: &[(f64, f64)]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &(p, c))| Sample::new(start() + Duration::hours(i as i64), p, c))
        .collect()
}

/// Default installation (20 kWh, 20 % reserve, 0.8 C).
pub fn default_battery() -> BatteryConfig {
    BatteryConfig::new(20.0, 0.2, 0.8).unwrap()
}

/// Seeded synthetic hourly series with the default profile shape.
pub fn synthetic_series(days: usize, seed: u64) -> TimeSeries {
    SyntheticSettings {
        days,
        seed,
        ..SyntheticSettings::default()
    }
    .profile()
    .generate()
    .unwrap()
}

/// Directory of vendor-format exports (three hourly days, one daily file).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{what}: expected {expected}, got {actual}"
    );
}
