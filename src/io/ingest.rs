//! Reading inverter portal CSV exports into a validated [`TimeSeries`].
//!
//! Each export has a header row followed by rows of
//! `Time, Consumption Meter E (Wh), Consumption Meter P (W), Inv1 Eac (Wh), Inv1 Pac (W)`.
//! Only the two energy columns are used; both are converted to kWh.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::error::InputError;
use crate::sim::series::TimeSeries;
use crate::sim::types::Sample;

/// Timestamp layout used by the export, e.g. `10/01/2022 13:00`.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M";

/// File name prefix of every export.
pub const FILE_PREFIX: &str = "Export CSV ";

const COL_TIME: usize = 0;
const COL_CONSUMPTION_WH: usize = 1;
const COL_PRODUCTION_WH: usize = 3;
const MIN_COLUMNS: usize = 5;

/// Finds `Export CSV *<interval>*.csv` files in `dir`, sorted by name.
///
/// # Errors
///
/// [`InputError::Io`] if the directory cannot be listed and
/// [`InputError::NoInputFiles`] if nothing matches.
pub fn discover_files(dir: &Path, interval: &str) -> Result<Vec<PathBuf>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| matches_export_name(name, interval))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(InputError::NoInputFiles {
            dir: dir.to_path_buf(),
            interval: interval.to_string(),
        });
    }
    Ok(files)
}

fn matches_export_name(name: &str, interval: &str) -> bool {
    name.strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(".csv"))
        .is_some_and(|middle| middle.contains(interval))
}

/// Parses one export from any reader.
///
/// Rows with too few columns or an unreadable timestamp are skipped.
/// Empty or NaN energy fields become 0. `source` only labels errors and
/// log events.
///
/// # Errors
///
/// [`InputError::Csv`] if the reader yields malformed CSV.
pub fn read_export(reader: impl Read, source: &Path) -> Result<Vec<Sample>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| InputError::Csv {
            path: source.to_path_buf(),
            source: e,
        })?;
        // +2: one for the header, one for 1-based line numbers
        let line = row + 2;

        if record.len() < MIN_COLUMNS {
            warn!(file = %source.display(), line, columns = record.len(), "skipping short row");
            continue;
        }
        let raw_time = &record[COL_TIME];
        let Ok(timestamp) = NaiveDateTime::parse_from_str(raw_time, TIMESTAMP_FORMAT) else {
            warn!(file = %source.display(), line, time = raw_time, "skipping row with bad timestamp");
            continue;
        };

        let consumption = energy_kwh(&record[COL_CONSUMPTION_WH], "consumption", source, line);
        let production = energy_kwh(&record[COL_PRODUCTION_WH], "production", source, line);
        samples.push(Sample::new(timestamp, production, consumption));
    }
    Ok(samples)
}

/// Wh field to kWh; missing or NaN readings count as no energy.
fn energy_kwh(raw: &str, field: &str, source: &Path, line: usize) -> f64 {
    let raw = raw.trim_matches('"').trim();
    match raw.parse::<f64>() {
        Ok(wh) if !wh.is_nan() => wh / 1000.0,
        _ => {
            warn!(file = %source.display(), line, field, value = raw, "missing reading, using 0");
            0.0
        }
    }
}

/// Opens and parses one export file.
///
/// # Errors
///
/// [`InputError::Io`] if the file cannot be opened, otherwise as
/// [`read_export`].
pub fn read_export_file(path: &Path) -> Result<Vec<Sample>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_export(BufReader::new(file), path)
}

/// Reads `paths` in order, drops repeated timestamps and validates the result.
///
/// The first sample seen for a timestamp wins.
///
/// # Errors
///
/// Any read error, or a validation error from [`TimeSeries::new`].
pub fn load_files(paths: &[PathBuf]) -> Result<TimeSeries, InputError> {
    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    let mut duplicates = 0usize;

    for path in paths {
        let rows = read_export_file(path)?;
        debug!(file = %path.display(), rows = rows.len(), "read export");
        for sample in rows {
            if seen.insert(sample.timestamp) {
                samples.push(sample);
            } else {
                duplicates += 1;
            }
        }
    }
    if duplicates > 0 {
        debug!(duplicates, kept = samples.len(), "dropped repeated timestamps");
    }
    TimeSeries::new(samples)
}

/// [`discover_files`] followed by [`load_files`].
///
/// # Errors
///
/// See both functions.
pub fn load_dir(dir: &Path, interval: &str) -> Result<TimeSeries, InputError> {
    let files = discover_files(dir, interval)?;
    load_files(&files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str =
        "Time,Consumption Meter E (Wh),Consumption Meter P (W),Inv1 Eac (Wh),Inv1 Pac (W)\n";

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 10, d)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    fn parse(body: &str) -> Vec<Sample> {
        let text = format!("{HEADER}{body}");
        read_export(text.as_bytes(), Path::new("test.csv")).unwrap()
    }

    #[test]
    fn converts_wh_to_kwh() {
        let rows = parse("10/01/2022 12:00,850,850,2300,2300\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, ts(1, 12));
        assert!((rows[0].consumption_kwh - 0.85).abs() < 1e-12);
        assert!((rows[0].production_kwh - 2.3).abs() < 1e-12);
    }

    #[test]
    fn quoted_and_missing_fields() {
        let rows = parse(
            "\"10/01/2022 00:00\",\"400\",\"400\",\"\",\"\"\n\
             10/01/2022 01:00,nan,0,NaN,0\n",
        );
        assert_eq!(rows.len(), 2);
        assert!((rows[0].consumption_kwh - 0.4).abs() < 1e-12);
        assert_eq!(rows[0].production_kwh, 0.0);
        assert_eq!(rows[1].consumption_kwh, 0.0);
        assert_eq!(rows[1].production_kwh, 0.0);
    }

    #[test]
    fn skips_short_rows_and_bad_timestamps() {
        let rows = parse(
            "10/01/2022 00:00,100,100\n\
             2022-10-01 01:00,100,100,0,0\n\
             10/01/2022 02:00,100,100,0,0\n",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, ts(1, 2));
    }

    #[test]
    fn export_name_matching() {
        assert!(matches_export_name("Export CSV hourly 2022-10-01.csv", "hourly"));
        assert!(!matches_export_name("Export CSV daily 2022-10-01.csv", "hourly"));
        assert!(!matches_export_name("export csv hourly.csv", "hourly"));
        assert!(!matches_export_name("Export CSV hourly 2022-10-01.txt", "hourly"));
    }

    #[test]
    fn discover_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "Export CSV hourly 2022-11-01.csv",
            "Export CSV hourly 2022-10-01.csv",
            "Export CSV daily 2022-10-01.csv",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), HEADER).unwrap();
        }
        let files = discover_files(dir.path(), "hourly").unwrap();
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(
            names,
            ["Export CSV hourly 2022-10-01.csv", "Export CSV hourly 2022-11-01.csv"]
        );
    }

    #[test]
    fn discover_without_matches_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_files(dir.path(), "hourly").unwrap_err();
        assert!(matches!(err, InputError::NoInputFiles { .. }));
    }

    #[test]
    fn load_files_keeps_first_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("Export CSV hourly a.csv");
        let b = dir.path().join("Export CSV hourly b.csv");
        fs::write(
            &a,
            format!("{HEADER}10/01/2022 00:00,100,100,0,0\n10/01/2022 01:00,200,200,0,0\n"),
        )
        .unwrap();
        fs::write(
            &b,
            format!("{HEADER}10/01/2022 01:00,999,999,0,0\n10/01/2022 02:00,300,300,0,0\n"),
        )
        .unwrap();

        let series = load_files(&[a, b]).unwrap();
        assert_eq!(series.len(), 3);
        assert!((series.samples()[1].consumption_kwh - 0.2).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_export_file(Path::new("/nonexistent/Export CSV hourly.csv")).unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
