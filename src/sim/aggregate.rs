//! Calendar resampling of simulation output.
//!
//! Energy fields are summed per bucket and SOC is averaged, which is how the
//! hourly series is rolled up into daily, weekly, monthly, and yearly views.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::types::{OutputSample, Sample};

/// Steps in the 7-day SOC trend window at hourly resolution.
pub const WEEK_WINDOW_HOURS: usize = 7 * 24;
/// Steps in the 30-day SOC trend window at hourly resolution.
pub const MONTH_WINDOW_HOURS: usize = 30 * 24;

/// Aggregation bucket width.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Hour,
    #[default]
    Day,
    /// Monday-based calendar week.
    Week,
    Month,
    Year,
    /// The whole series as a single bucket.
    All,
}

impl Period {
    /// Start of the bucket containing `ts`, or `None` for [`Period::All`].
    pub fn bucket_start(self, ts: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = ts.date();
        match self {
            Self::Hour => date.and_hms_opt(ts.hour(), 0, 0),
            Self::Day => date.and_hms_opt(0, 0, 0),
            Self::Week => {
                let back = i64::from(date.weekday().num_days_from_monday());
                (date - Duration::days(back)).and_hms_opt(0, 0, 0)
            }
            Self::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::Year => {
                NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
            Self::All => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Totals for one aggregation bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Bucket start (or first sample for [`Period::All`]).
    pub start: NaiveDateTime,
    /// Number of samples in the bucket.
    pub steps: usize,
    pub production_kwh: f64,
    pub consumption_kwh: f64,
    pub self_consumption_kwh: f64,
    pub from_battery_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    /// Mean reported SOC over the bucket.
    pub mean_soc: f64,
}

impl PeriodSummary {
    fn open(start: NaiveDateTime) -> Self {
        Self {
            start,
            steps: 0,
            production_kwh: 0.0,
            consumption_kwh: 0.0,
            self_consumption_kwh: 0.0,
            from_battery_kwh: 0.0,
            import_kwh: 0.0,
            export_kwh: 0.0,
            mean_soc: 0.0,
        }
    }

    fn add(&mut self, sample: &Sample, out: &OutputSample) {
        self.steps += 1;
        self.production_kwh += sample.production_kwh;
        self.consumption_kwh += sample.consumption_kwh;
        self.self_consumption_kwh += out.self_consumption_kwh;
        self.from_battery_kwh += out.from_battery_kwh;
        self.import_kwh += out.import_kwh;
        self.export_kwh += out.export_kwh;
        // running sum; divided in `close`
        self.mean_soc += out.soc;
    }

    fn close(mut self) -> Self {
        if self.steps > 0 {
            self.mean_soc /= self.steps as f64;
        }
        self
    }

    /// Share of consumption covered locally, in percent.
    pub fn self_consumption_pct(&self) -> f64 {
        if self.consumption_kwh > 0.0 {
            100.0 * self.self_consumption_kwh / self.consumption_kwh
        } else {
            0.0
        }
    }
}

impl fmt::Display for PeriodSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | prod={:>9.2}  cons={:>9.2}  self={:>9.2} ({:>5.1}%)  bat={:>8.2}  \
             import={:>9.2}  export={:>9.2} kWh | SoC={:5.1}%",
            self.start.format("%Y-%m-%d %H:%M"),
            self.production_kwh,
            self.consumption_kwh,
            self.self_consumption_kwh,
            self.self_consumption_pct(),
            self.from_battery_kwh,
            self.import_kwh,
            self.export_kwh,
            self.mean_soc * 100.0,
        )
    }
}

/// Groups aligned input/output samples into calendar buckets.
///
/// Samples must be in time order (as a validated `TimeSeries` guarantees);
/// each contiguous run sharing a bucket start becomes one summary. Extra
/// elements in the longer slice are ignored.
pub fn aggregate(samples: &[Sample], outputs: &[OutputSample], period: Period) -> Vec<PeriodSummary> {
    let mut buckets: Vec<PeriodSummary> = Vec::new();
    let mut current: Option<PeriodSummary> = None;

    for (sample, out) in samples.iter().zip(outputs) {
        let key = period.bucket_start(sample.timestamp);
        let same_bucket = match (&current, key) {
            (Some(_), None) => true,
            (Some(bucket), Some(start)) => bucket.start == start,
            (None, _) => false,
        };
        if !same_bucket {
            if let Some(done) = current.take() {
                buckets.push(done.close());
            }
            current = Some(PeriodSummary::open(key.unwrap_or(sample.timestamp)));
        }
        if let Some(bucket) = current.as_mut() {
            bucket.add(sample, out);
        }
    }
    if let Some(done) = current {
        buckets.push(done.close());
    }
    buckets
}

/// Centred moving average with a minimum of one observation.
///
/// The window for index `i` spans `i - window/2 ..= i + (window - 1)/2`,
/// clipped to the series. A zero window behaves like a window of one.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let left = window / 2;
    let right = (window - 1) / 2;

    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for v in values {
        acc += v;
        prefix.push(acc);
    }

    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(values.len() - 1);
            (prefix[hi + 1] - prefix[lo]) / (hi + 1 - lo) as f64
        })
        .collect()
}
