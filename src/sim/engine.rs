//! Battery state-of-charge recurrence.
//!
//! Each step splits the interval's production and consumption into
//! self-consumption, battery charge/discharge, and grid import/export, then
//! carries the new SOC into the next step. SOC is tracked internally as a
//! fraction of *usable* capacity and reported rescaled into
//! `[reserve, 1.0]`.

use tracing::{debug, trace};

use super::battery::BatteryConfig;
use super::series::TimeSeries;
use super::types::{OutputSample, Sample, StepOutcome};

/// SOC assumed before the first sample: the battery starts full.
pub const INITIAL_SOC: f64 = 1.0;

/// Flows assigned to a step whose production equals its consumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BalancedPolicy {
    /// Load is met by production: `self_consumption = consumption`, no
    /// battery or grid flow.
    #[default]
    MeetLoad,
    /// Every flow, self-consumption included, is reported as zero.
    ZeroFlows,
}

/// Energy split for one step, before the SOC update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StepFlows {
    self_consumption: f64,
    from_battery: f64,
    to_battery: f64,
    import: f64,
    export: f64,
}

/// Stateful simulator for a single battery configuration.
///
/// Owns its SOC; two engines never share state, so independent runs can be
/// driven from different threads.
#[derive(Debug, Clone)]
pub struct Engine {
    config: BatteryConfig,
    balanced: BalancedPolicy,
    soc: f64,
}

impl Engine {
    /// Creates an engine with a full battery.
    pub fn new(config: BatteryConfig) -> Self {
        Self {
            config,
            balanced: BalancedPolicy::default(),
            soc: INITIAL_SOC,
        }
    }

    /// Overrides how exactly balanced steps are reported.
    pub fn with_balanced_policy(mut self, policy: BalancedPolicy) -> Self {
        self.balanced = policy;
        self
    }

    /// Internal SOC as a fraction of usable capacity.
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Restores the initial full-battery state.
    pub fn reset(&mut self) {
        self.soc = INITIAL_SOC;
    }

    /// Advances the recurrence by one sample.
    pub fn step(&mut self, sample: &Sample) -> OutputSample {
        let usable = self.config.usable_capacity_kwh();
        let available = self.soc * usable;
        let generated = sample.production_kwh;
        let consumed = sample.consumption_kwh;

        let outcome = StepOutcome::classify(generated, consumed);
        let flows = match outcome {
            StepOutcome::Deficit => {
                let deficit = consumed - generated;
                let (from_battery, import) = if deficit <= available {
                    (deficit, 0.0)
                } else {
                    (available, deficit - available)
                };
                StepFlows {
                    self_consumption: from_battery + generated,
                    from_battery,
                    import,
                    ..StepFlows::default()
                }
            }
            StepOutcome::Surplus => {
                let surplus = generated - consumed;
                // Charge is limited against remaining headroom, not nameplate.
                let need = (usable - available) * self.config.c_rate();
                let (to_battery, export) = if surplus > need {
                    (need, surplus - need)
                } else {
                    (surplus, 0.0)
                };
                StepFlows {
                    self_consumption: consumed,
                    to_battery,
                    export,
                    ..StepFlows::default()
                }
            }
            StepOutcome::Balanced => match self.balanced {
                BalancedPolicy::MeetLoad => StepFlows {
                    self_consumption: consumed,
                    ..StepFlows::default()
                },
                BalancedPolicy::ZeroFlows => StepFlows::default(),
            },
        };

        self.soc = if usable > 0.0 {
            ((available + flows.to_battery - flows.from_battery) / usable).clamp(0.0, 1.0)
        } else {
            0.0
        };
        trace!(timestamp = %sample.timestamp, %outcome, soc = self.soc, "step");

        OutputSample {
            timestamp: sample.timestamp,
            soc: self.config.reported_soc(self.soc),
            self_consumption_kwh: flows.self_consumption,
            from_battery_kwh: flows.from_battery,
            to_battery_kwh: flows.to_battery,
            import_kwh: flows.import,
            export_kwh: flows.export,
            outcome,
        }
    }

    /// Runs every sample in order and returns one output per sample.
    pub fn run(&mut self, samples: &[Sample]) -> Vec<OutputSample> {
        debug!(
            steps = samples.len(),
            capacity_kwh = self.config.capacity_kwh(),
            reserve = self.config.reserve(),
            c_rate = self.config.c_rate(),
            "simulating"
        );
        samples.iter().map(|s| self.step(s)).collect()
    }
}

/// Simulates `samples` from a full battery with a fresh engine.
///
/// Pure: identical inputs always give identical outputs. Empty input yields
/// empty output.
pub fn simulate(samples: &[Sample], config: &BatteryConfig) -> Vec<OutputSample> {
    Engine::new(*config).run(samples)
}

/// [`simulate`] over a validated series.
pub fn simulate_series(series: &TimeSeries, config: &BatteryConfig) -> Vec<OutputSample> {
    simulate(series.samples(), config)
}
