//! Core simulation types: input samples, per-step outcomes, and output records.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One measured interval of production and consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Interval start.
    pub timestamp: NaiveDateTime,
    /// Energy produced by the PV array during the interval (kWh, >= 0).
    pub production_kwh: f64,
    /// Energy demanded by the household during the interval (kWh, >= 0).
    pub consumption_kwh: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, production_kwh: f64, consumption_kwh: f64) -> Self {
        Self {
            timestamp,
            production_kwh,
            consumption_kwh,
        }
    }
}

/// Which side of the energy balance a step falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Consumption exceeds production: battery discharges, then grid import.
    Deficit,
    /// Production exceeds consumption: battery charges, then grid export.
    Surplus,
    /// Production equals consumption exactly.
    Balanced,
}

impl StepOutcome {
    pub fn classify(production_kwh: f64, consumption_kwh: f64) -> Self {
        if consumption_kwh > production_kwh {
            Self::Deficit
        } else if production_kwh > consumption_kwh {
            Self::Surplus
        } else {
            Self::Balanced
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deficit => "deficit",
            Self::Surplus => "surplus",
            Self::Balanced => "balanced",
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulated energy flows for one interval, aligned with its input [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutputSample {
    /// Interval start, copied from the input sample.
    pub timestamp: NaiveDateTime,
    /// Reported state of charge after this step, in `[reserve, 1.0]`.
    pub soc: f64,
    /// Consumption met locally by PV or battery (kWh).
    pub self_consumption_kwh: f64,
    /// Energy discharged from the battery (kWh).
    pub from_battery_kwh: f64,
    /// Energy stored into the battery (kWh).
    pub to_battery_kwh: f64,
    /// Energy drawn from the grid (kWh).
    pub import_kwh: f64,
    /// Surplus energy sent to the grid (kWh).
    pub export_kwh: f64,
    /// Branch taken by the recurrence for this step.
    pub outcome: StepOutcome,
}

impl fmt::Display for OutputSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {:<8} | self={:>7.3} kWh  bat-={:>7.3}  bat+={:>7.3}  \
             import={:>7.3}  export={:>7.3} | SoC={:5.1}%",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.outcome,
            self.self_consumption_kwh,
            self.from_battery_kwh,
            self.to_battery_kwh,
            self.import_kwh,
            self.export_kwh,
            self.soc * 100.0,
        )
    }
}
