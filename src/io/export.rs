//! CSV export for simulation step results and period reports.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::aggregate::PeriodSummary;
use crate::sim::types::{OutputSample, Sample};

/// Column header of the step export.
pub const STEP_HEADER: &str = "timestamp,production_kwh,consumption_kwh,soc,\
                               self_consumption_kwh,from_battery_kwh,import_kwh,export_kwh,outcome";

/// Column header of the period export.
pub const PERIOD_HEADER: &str = "period_start,steps,production_kwh,consumption_kwh,\
                                 self_consumption_kwh,from_battery_kwh,import_kwh,export_kwh,mean_soc";

/// Timestamp layout of both exports.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Exports step results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(samples: &[Sample], outputs: &[OutputSample], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_csv(samples, outputs, io::BufWriter::new(file))
}

/// Writes one row per step, joining each input sample with its output.
///
/// Energies use four decimals and SOC six, so identical runs produce
/// identical bytes.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(samples: &[Sample], outputs: &[OutputSample], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(STEP_HEADER.split(',').map(str::trim))?;

    for (s, o) in samples.iter().zip(outputs) {
        wtr.write_record(&[
            s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", s.production_kwh),
            format!("{:.4}", s.consumption_kwh),
            format!("{:.6}", o.soc),
            format!("{:.4}", o.self_consumption_kwh),
            format!("{:.4}", o.from_battery_kwh),
            format!("{:.4}", o.import_kwh),
            format!("{:.4}", o.export_kwh),
            o.outcome.as_str().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a period report to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_period_csv(periods: &[PeriodSummary], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_period_csv(periods, io::BufWriter::new(file))
}

/// Writes one row per aggregation bucket.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_period_csv(periods: &[PeriodSummary], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(PERIOD_HEADER.split(',').map(str::trim))?;

    for p in periods {
        wtr.write_record(&[
            p.start.format(TIMESTAMP_FORMAT).to_string(),
            p.steps.to_string(),
            format!("{:.4}", p.production_kwh),
            format!("{:.4}", p.consumption_kwh),
            format!("{:.4}", p.self_consumption_kwh),
            format!("{:.4}", p.from_battery_kwh),
            format!("{:.4}", p.import_kwh),
            format!("{:.4}", p.export_kwh),
            format!("{:.6}", p.mean_soc),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::aggregate::{Period, aggregate};
    use crate::sim::battery::BatteryConfig;
    use crate::sim::engine::simulate;
    use chrono::{Duration, NaiveDate};

    fn run(steps: i64) -> (Vec<Sample>, Vec<OutputSample>) {
        let start = NaiveDate::from_ymd_opt(2022, 10, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let samples: Vec<Sample> = (0..steps)
            .map(|h| {
                let p = if (8..16).contains(&(h % 24)) { 3.0 } else { 0.0 };
                Sample::new(start + Duration::hours(h), p, 1.0)
            })
            .collect();
        let cfg = BatteryConfig::new(20.0, 0.2, 0.8).unwrap();
        let outputs = simulate(&samples, &cfg);
        (samples, outputs)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn step_header_and_row_count() {
        let (samples, outputs) = run(24);
        let out = render(|b| write_csv(&samples, &outputs, b));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], STEP_HEADER);
        // 1 header + 24 data rows
        assert_eq!(lines.len(), 25);
        assert!(lines[1].starts_with("2022-10-01 00:00,0.0000,1.0000,"));
        assert!(lines[1].ends_with(",deficit"));
    }

    #[test]
    fn deterministic_output() {
        let (samples, outputs) = run(48);
        let a = render(|b| write_csv(&samples, &outputs, b));
        let b = render(|b| write_csv(&samples, &outputs, b));
        assert_eq!(a, b);
    }

    #[test]
    fn step_rows_parse_back() {
        let (samples, outputs) = run(5);
        let out = render(|b| write_csv(&samples, &outputs, b));

        let mut rdr = csv::ReaderBuilder::new().from_reader(out.as_bytes());
        let headers = rdr.headers().cloned().ok();
        assert_eq!(headers.as_ref().map(csv::StringRecord::len), Some(9));
        let mut rows = 0;
        for record in rdr.records() {
            let rec = record.unwrap();
            for i in 1..8 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
            rows += 1;
        }
        assert_eq!(rows, 5);
    }

    #[test]
    fn period_report_has_one_row_per_day() {
        let (samples, outputs) = run(72);
        let periods = aggregate(&samples, &outputs, Period::Day);
        let out = render(|b| write_period_csv(&periods, b));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], PERIOD_HEADER);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("2022-10-01 00:00,24,24.0000,24.0000,"));
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steps.csv");
        let (samples, outputs) = run(3);
        export_csv(&samples, &outputs, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
