//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ScenarioConfig;
use crate::error::ConfigError;
use crate::sim::aggregate::Period;

/// Preset used when neither `--scenario` nor `--preset` is given.
pub const DEFAULT_PRESET: &str = "self_consumption";

#[derive(Debug, Parser)]
#[command(name = "solar-battery-sim")]
#[command(version, about = "Solar + battery state-of-charge and energy-flow simulator")]
#[command(
    long_about = "Replays hourly production and consumption through a battery model and \
    reports self-consumption, grid import and export.\n\
    \nData sources (first match wins):\n  \
    - --input <FILE>...\n  \
    - --data-dir <DIR> (must exist)\n  \
    - [input].data_dir when it exists\n  \
    - the synthetic profile from the scenario\n\
    \nExamples:\n  \
    solar-battery-sim\n  \
    solar-battery-sim --preset small_battery --period month\n  \
    solar-battery-sim --data-dir ./data --compare-no-battery --json"
)]
pub struct Cli {
    /// Load scenario from TOML config file
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Built-in preset (self_consumption, no_battery, small_battery)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Vendor CSV exports to read, in order
    #[arg(long, value_name = "FILE", num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Directory searched for `Export CSV *<interval>*.csv`; must exist
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Interval tag in export file names (e.g. hourly)
    #[arg(long, value_name = "NAME")]
    pub interval: Option<String>,

    /// Override battery capacity (kWh, 0 disables the battery)
    #[arg(long, value_name = "KWH")]
    pub capacity: Option<f64>,

    /// Override reserve fraction (0.0-1.0)
    #[arg(long, value_name = "FRAC")]
    pub reserve: Option<f64>,

    /// Override charge rate fraction (> 0)
    #[arg(long, value_name = "FRAC")]
    pub c_rate: Option<f64>,

    /// Bucket width of the period table
    #[arg(long, value_enum)]
    pub period: Option<Period>,

    /// Also run the same data without a battery
    #[arg(long)]
    pub compare_no_battery: bool,

    /// Write per-step results to CSV
    #[arg(long, value_name = "FILE")]
    pub telemetry_out: Option<PathBuf>,

    /// Write the period table to CSV
    #[arg(long, value_name = "FILE")]
    pub report_out: Option<PathBuf>,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Loads the selected scenario and applies command-line overrides.
    ///
    /// The result is not validated yet.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the scenario file or preset cannot be loaded.
    pub fn scenario_config(&self) -> Result<ScenarioConfig, ConfigError> {
        let mut cfg = match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
            (None, Some(name)) => ScenarioConfig::from_preset(name)?,
            (None, None) => ScenarioConfig::from_preset(DEFAULT_PRESET)?,
        };

        if let Some(capacity) = self.capacity {
            cfg.battery.capacity_kwh = capacity;
        }
        if let Some(reserve) = self.reserve {
            cfg.battery.reserve = reserve;
        }
        if let Some(c_rate) = self.c_rate {
            cfg.battery.c_rate = c_rate;
        }
        if let Some(period) = self.period {
            cfg.report.period = period;
        }
        if !self.input.is_empty() {
            cfg.input.files.clone_from(&self.input);
        }
        if let Some(dir) = &self.data_dir {
            cfg.input.data_dir.clone_from(dir);
            cfg.input.data_dir_required = true;
        }
        if let Some(interval) = &self.interval {
            cfg.input.interval.clone_from(interval);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("solar-battery-sim").chain(args.iter().copied()))
    }

    #[test]
    fn supports_scenario_cli() {
        let cli = parse(&["--scenario", "scenario.toml"]).unwrap();
        assert_eq!(
            cli.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(cli.preset.is_none());
    }

    #[test]
    fn supports_preset_cli() {
        let cli = parse(&["--preset", "small_battery"]).unwrap();
        assert_eq!(cli.preset.as_deref(), Some("small_battery"));
        let cfg = cli.scenario_config().unwrap();
        assert_eq!(cfg.battery.capacity_kwh, 10.0);
    }

    #[test]
    fn scenario_and_preset_conflict() {
        assert!(parse(&["--scenario", "a.toml", "--preset", "no_battery"]).is_err());
    }

    #[test]
    fn default_is_self_consumption() {
        let cfg = parse(&[]).unwrap().scenario_config().unwrap();
        assert_eq!(cfg, ScenarioConfig::self_consumption());
    }

    #[test]
    fn overrides_apply() {
        let cli = parse(&[
            "--capacity",
            "5",
            "--reserve",
            "0.5",
            "--c-rate",
            "1.5",
            "--period",
            "month",
            "--input",
            "a.csv",
            "b.csv",
        ])
        .unwrap();
        let cfg = cli.scenario_config().unwrap();
        assert_eq!(cfg.battery.capacity_kwh, 5.0);
        assert_eq!(cfg.battery.reserve, 0.5);
        assert_eq!(cfg.battery.c_rate, 1.5);
        assert_eq!(cfg.report.period, Period::Month);
        assert_eq!(cfg.input.files.len(), 2);
    }

    #[test]
    fn explicit_data_dir_is_required() {
        let cfg = parse(&["--data-dir", "measurements"]).unwrap().scenario_config().unwrap();
        assert_eq!(cfg.input.data_dir, PathBuf::from("measurements"));
        assert!(cfg.input.data_dir_required);

        let cfg = parse(&[]).unwrap().scenario_config().unwrap();
        assert!(!cfg.input.data_dir_required);
    }

    #[test]
    fn unknown_preset_is_config_error() {
        let err = parse(&["--preset", "huge"]).unwrap().scenario_config().unwrap_err();
        assert_eq!(err.field, "preset");
    }

    #[test]
    fn bad_period_rejected() {
        assert!(parse(&["--period", "fortnight"]).is_err());
    }
}
