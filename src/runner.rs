//! End-to-end run of one scenario: load data, simulate, summarise.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::{InputSettings, ScenarioConfig, SyntheticSettings};
use crate::error::{InputError, SimError};
use crate::io::ingest;
use crate::sim::aggregate::{self, MONTH_WINDOW_HOURS, PeriodSummary, WEEK_WINDOW_HOURS};
use crate::sim::battery::BatteryConfig;
use crate::sim::compare;
use crate::sim::kpi::EnergySummary;
use crate::sim::series::TimeSeries;
use crate::sim::types::OutputSample;

/// Where the input series came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DataSource {
    Files { paths: Vec<PathBuf> },
    Directory { dir: PathBuf, interval: String },
    Synthetic { seed: u64, days: usize },
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files { paths } => write!(f, "{} input file(s)", paths.len()),
            Self::Directory { dir, interval } => {
                write!(f, "{interval} exports in \"{}\"", dir.display())
            }
            Self::Synthetic { seed, days } => write!(f, "synthetic profile ({days} days, seed {seed})"),
        }
    }
}

/// Picks explicit files, then the data directory, then the synthetic
/// profile.
///
/// A configured directory that does not exist falls through to the
/// synthetic profile unless `data_dir_required` is set.
///
/// # Errors
///
/// Any ingestion or validation error of the chosen source.
pub fn load_series(
    input: &InputSettings,
    synthetic: &SyntheticSettings,
) -> Result<(TimeSeries, DataSource), InputError> {
    if !input.files.is_empty() {
        let series = ingest::load_files(&input.files)?;
        return Ok((series, DataSource::Files { paths: input.files.clone() }));
    }
    if input.data_dir_required || input.data_dir.is_dir() {
        let series = ingest::load_dir(&input.data_dir, &input.interval)?;
        let source = DataSource::Directory {
            dir: input.data_dir.clone(),
            interval: input.interval.clone(),
        };
        return Ok((series, source));
    }
    let series = synthetic.profile().generate()?;
    let source = DataSource::Synthetic {
        seed: synthetic.seed,
        days: synthetic.days,
    };
    Ok((series, source))
}

/// Smoothed reported SOC at the end of the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SocTrend {
    /// Range of the centred 7-day mean over the run.
    pub week_min: f64,
    pub week_max: f64,
    /// Range of the centred 30-day mean over the run.
    pub month_min: f64,
    pub month_max: f64,
}

impl SocTrend {
    pub fn from_outputs(outputs: &[OutputSample]) -> Option<Self> {
        if outputs.is_empty() {
            return None;
        }
        let soc: Vec<f64> = outputs.iter().map(|o| o.soc).collect();
        let (week_min, week_max) = min_max(&aggregate::rolling_mean(&soc, WEEK_WINDOW_HOURS));
        let (month_min, month_max) = min_max(&aggregate::rolling_mean(&soc, MONTH_WINDOW_HOURS));
        Some(Self {
            week_min,
            week_max,
            month_min,
            month_max,
        })
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

impl fmt::Display for SocTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SoC 7-day mean:        {:.1}% .. {:.1}%",
            self.week_min * 100.0,
            self.week_max * 100.0
        )?;
        write!(
            f,
            "SoC 30-day mean:       {:.1}% .. {:.1}%",
            self.month_min * 100.0,
            self.month_max * 100.0
        )
    }
}

/// Same data replayed without storage.
#[derive(Debug, Clone, Serialize)]
pub struct Baseline {
    #[serde(skip)]
    pub outputs: Vec<OutputSample>,
    pub summary: EnergySummary,
}

/// Everything a scenario run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub battery: BatteryConfig,
    pub source: DataSource,
    #[serde(skip)]
    pub series: TimeSeries,
    #[serde(skip)]
    pub outputs: Vec<OutputSample>,
    pub summary: EnergySummary,
    pub periods: Vec<PeriodSummary>,
    pub soc_trend: Option<SocTrend>,
    pub no_battery: Option<Baseline>,
}

impl RunReport {
    /// Grid import avoided by the battery, if a baseline was run.
    pub fn import_saved_kwh(&self) -> Option<f64> {
        self.no_battery
            .as_ref()
            .map(|b| b.summary.import_kwh - self.summary.import_kwh)
    }
}

/// Validates `config`, loads its data and simulates it.
///
/// With `compare_no_battery` the same series is also replayed without
/// storage on an independent engine.
///
/// # Errors
///
/// [`SimError::InvalidConfig`] with every violation, or the first load error.
pub fn run_scenario(config: &ScenarioConfig, compare_no_battery: bool) -> Result<RunReport, SimError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(errors.into());
    }
    let battery = config.battery_config()?;
    let (series, source) = load_series(&config.input, &config.synthetic)?;
    info!(
        steps = series.len(),
        source = %source,
        battery = %battery,
        period = %config.report.period,
        "starting run"
    );

    let solar_only = battery.without_battery();
    let mut configs = vec![battery];
    if compare_no_battery {
        configs.push(solar_only);
    }
    let mut runs = compare::run_all(series.samples(), &configs).into_iter();
    let outputs = runs.next().unwrap_or_default();
    let no_battery = runs.next().map(|outputs| Baseline {
        summary: EnergySummary::from_results(series.samples(), &outputs, &solar_only),
        outputs,
    });

    let summary = EnergySummary::from_results(series.samples(), &outputs, &battery);
    let periods = aggregate::aggregate(series.samples(), &outputs, config.report.period);
    let soc_trend = SocTrend::from_outputs(&outputs);
    info!(
        self_consumption_pct = summary.self_consumption_pct,
        import_kwh = summary.import_kwh,
        export_kwh = summary.export_kwh,
        "run finished"
    );

    Ok(RunReport {
        battery,
        source,
        series,
        outputs,
        summary,
        periods,
        soc_trend,
        no_battery,
    })
}
