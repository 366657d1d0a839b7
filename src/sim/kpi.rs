//! Post-hoc run summary computed from simulation results.

use std::fmt;

use serde::Serialize;

use super::battery::BatteryConfig;
use super::types::{OutputSample, Sample};

/// Reported SOC within this distance of the reserve counts as empty.
const EMPTY_SOC_TOLERANCE: f64 = 1e-9;

/// Energy totals and battery statistics for a complete run.
///
/// Computed from the aligned input and output series so reported totals
/// always agree with the step data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySummary {
    pub steps: usize,
    pub production_kwh: f64,
    pub consumption_kwh: f64,
    pub self_consumption_kwh: f64,
    /// `100 * self_consumption / consumption`; 0 without consumption.
    pub self_consumption_pct: f64,
    pub from_battery_kwh: f64,
    pub to_battery_kwh: f64,
    pub import_kwh: f64,
    pub export_kwh: f64,
    pub mean_soc: f64,
    pub min_soc: f64,
    /// Steps that ended with the usable capacity fully drained.
    pub empty_battery_steps: usize,
}

impl EnergySummary {
    /// Computes the summary over aligned input/output slices.
    pub fn from_results(samples: &[Sample], outputs: &[OutputSample], config: &BatteryConfig) -> Self {
        let mut s = Self {
            steps: 0,
            production_kwh: 0.0,
            consumption_kwh: 0.0,
            self_consumption_kwh: 0.0,
            self_consumption_pct: 0.0,
            from_battery_kwh: 0.0,
            to_battery_kwh: 0.0,
            import_kwh: 0.0,
            export_kwh: 0.0,
            mean_soc: 0.0,
            min_soc: 0.0,
            empty_battery_steps: 0,
        };
        if outputs.is_empty() {
            return s;
        }

        let mut soc_sum = 0.0;
        let mut min_soc = f64::INFINITY;
        for (sample, out) in samples.iter().zip(outputs) {
            s.steps += 1;
            s.production_kwh += sample.production_kwh;
            s.consumption_kwh += sample.consumption_kwh;
            s.self_consumption_kwh += out.self_consumption_kwh;
            s.from_battery_kwh += out.from_battery_kwh;
            s.to_battery_kwh += out.to_battery_kwh;
            s.import_kwh += out.import_kwh;
            s.export_kwh += out.export_kwh;
            soc_sum += out.soc;
            min_soc = min_soc.min(out.soc);
            if config.has_battery() && out.soc <= config.reserve() + EMPTY_SOC_TOLERANCE {
                s.empty_battery_steps += 1;
            }
        }

        if s.steps > 0 {
            s.mean_soc = soc_sum / s.steps as f64;
            s.min_soc = min_soc;
        }
        if s.consumption_kwh > 0.0 {
            s.self_consumption_pct = 100.0 * s.self_consumption_kwh / s.consumption_kwh;
        }
        s
    }
}

impl fmt::Display for EnergySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Energy Summary ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(f, "Production:            {:.2} kWh", self.production_kwh)?;
        writeln!(f, "Consumption:           {:.2} kWh", self.consumption_kwh)?;
        writeln!(f, "From battery:          {:.2} kWh", self.from_battery_kwh)?;
        writeln!(f, "To battery:            {:.2} kWh", self.to_battery_kwh)?;
        writeln!(f, "Self-consumption:      {:.2} kWh", self.self_consumption_kwh)?;
        writeln!(f, "Self-consumption %:    {:.1}%", self.self_consumption_pct)?;
        writeln!(f, "Imported:              {:.2} kWh", self.import_kwh)?;
        writeln!(f, "Exported:              {:.2} kWh", self.export_kwh)?;
        writeln!(
            f,
            "SoC mean/min:          {:.1}% / {:.1}%",
            self.mean_soc * 100.0,
            self.min_soc * 100.0
        )?;
        write!(f, "Empty battery steps:   {}", self.empty_battery_steps)
    }
}
