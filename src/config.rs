//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::profile::SyntheticProfile;
use crate::sim::aggregate::Period;
use crate::sim::battery::BatteryConfig;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the `self_consumption` preset. Load
/// from TOML with [`ScenarioConfig::from_toml_file`] or pick a built-in
/// preset with [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery installation parameters.
    #[serde(default)]
    pub battery: BatterySettings,
    /// Measured data location.
    #[serde(default)]
    pub input: InputSettings,
    /// Synthetic profile used when no measured data is available.
    #[serde(default)]
    pub synthetic: SyntheticSettings,
    /// Report shaping.
    #[serde(default)]
    pub report: ReportSettings,
}

/// Raw battery parameters; converted by [`ScenarioConfig::battery_config`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySettings {
    /// Nominal capacity (kWh); 0 disables the battery.
    pub capacity_kwh: f64,
    /// Fraction of capacity never discharged (0.0 to 1.0).
    pub reserve: f64,
    /// Fraction of the usable headroom absorbable in one step.
    pub c_rate: f64,
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self {
            capacity_kwh: 20.0,
            reserve: 0.2,
            c_rate: 0.8,
        }
    }
}

/// Location of vendor CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputSettings {
    /// Directory searched for `Export CSV *<interval>*.csv`.
    pub data_dir: PathBuf,
    /// Export interval tag embedded in file names.
    pub interval: String,
    /// Explicit files; take precedence over `data_dir` when non-empty.
    pub files: Vec<PathBuf>,
    /// Set when `data_dir` was named on the command line; it must then exist.
    #[serde(skip)]
    pub data_dir_required: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            interval: "hourly".to_string(),
            files: Vec::new(),
            data_dir_required: false,
        }
    }
}

/// Synthetic hourly profile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticSettings {
    /// First timestamp, e.g. `"2024-06-01T00:00:00"`.
    pub start: NaiveDateTime,
    /// Number of days to generate (must be > 0).
    pub days: usize,
    /// Random seed.
    pub seed: u64,
    /// Peak PV output (kW).
    pub pv_kw_peak: f64,
    /// Sunrise hour (inclusive).
    pub sunrise_hour: usize,
    /// Sunset hour (exclusive).
    pub sunset_hour: usize,
    /// Relative PV noise standard deviation.
    pub pv_noise_std: f64,
    /// Baseline consumption (kW).
    pub base_kw: f64,
    /// Sinusoidal amplitude (kW).
    pub amp_kw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian load noise standard deviation (kW).
    pub load_noise_std: f64,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            days: 7,
            seed: 42,
            pv_kw_peak: 5.0,
            sunrise_hour: 6,
            sunset_hour: 18,
            pv_noise_std: 0.05,
            base_kw: 0.8,
            amp_kw: 0.7,
            phase_rad: 1.2,
            load_noise_std: 0.05,
        }
    }
}

impl SyntheticSettings {
    pub fn profile(&self) -> SyntheticProfile {
        SyntheticProfile {
            start: self.start,
            days: self.days,
            seed: self.seed,
            pv_kw_peak: self.pv_kw_peak,
            sunrise_hour: self.sunrise_hour,
            sunset_hour: self.sunset_hour,
            pv_noise_std: self.pv_noise_std,
            base_kw: self.base_kw,
            amp_kw: self.amp_kw,
            phase_rad: self.phase_rad,
            load_noise_std: self.load_noise_std,
        }
    }
}

/// Report shaping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Bucket width of the period table.
    pub period: Period,
}

impl ScenarioConfig {
    /// Returns the default installation: 20 kWh, 20 % reserve, 0.8 C.
    pub fn self_consumption() -> Self {
        Self::default()
    }

    /// Returns the solar-only variant: no storage, every deficit imported.
    pub fn no_battery() -> Self {
        Self {
            battery: BatterySettings {
                capacity_kwh: 0.0,
                reserve: 0.0,
                ..BatterySettings::default()
            },
            ..Self::default()
        }
    }

    /// Returns a smaller, slower-charging installation.
    pub fn small_battery() -> Self {
        Self {
            battery: BatterySettings {
                capacity_kwh: 10.0,
                reserve: 0.1,
                c_rate: 0.5,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["self_consumption", "no_battery", "small_battery"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "self_consumption" => Ok(Self::self_consumption()),
            "no_battery" => Ok(Self::no_battery()),
            "small_battery" => Ok(Self::small_battery()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validated battery parameters for the engine.
    ///
    /// # Errors
    ///
    /// Returns the first battery constraint violated.
    pub fn battery_config(&self) -> Result<BatteryConfig, ConfigError> {
        let b = &self.battery;
        BatteryConfig::new(b.capacity_kwh, b.reserve, b.c_rate)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let bat = &self.battery;
        if !bat.capacity_kwh.is_finite() || bat.capacity_kwh < 0.0 {
            errors.push(ConfigError::new("battery.capacity_kwh", "must be a finite value >= 0"));
        }
        if !(0.0..=1.0).contains(&bat.reserve) {
            errors.push(ConfigError::new("battery.reserve", "must be in [0.0, 1.0]"));
        }
        if !bat.c_rate.is_finite() || bat.c_rate <= 0.0 {
            errors.push(ConfigError::new("battery.c_rate", "must be a finite value > 0"));
        }

        if self.input.interval.trim().is_empty() {
            errors.push(ConfigError::new("input.interval", "must not be empty"));
        }

        let syn = &self.synthetic;
        if syn.days == 0 {
            errors.push(ConfigError::new("synthetic.days", "must be > 0"));
        }
        if syn.sunrise_hour >= syn.sunset_hour {
            errors.push(ConfigError::new(
                "synthetic.sunrise_hour",
                "must be < synthetic.sunset_hour",
            ));
        }
        if syn.sunset_hour > 24 {
            errors.push(ConfigError::new("synthetic.sunset_hour", "must be <= 24"));
        }
        for (field, value) in [
            ("synthetic.pv_kw_peak", syn.pv_kw_peak),
            ("synthetic.pv_noise_std", syn.pv_noise_std),
            ("synthetic.base_kw", syn.base_kw),
            ("synthetic.amp_kw", syn.amp_kw),
            ("synthetic.load_noise_std", syn.load_noise_std),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(field, "must be a finite value >= 0"));
            }
        }
        if !syn.phase_rad.is_finite() {
            errors.push(ConfigError::new("synthetic.phase_rad", "must be finite"));
        }

        errors
    }
}
