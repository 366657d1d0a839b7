/// Calendar resampling and rolling SOC trends.
pub mod aggregate;
/// Battery parameter value object.
pub mod battery;
/// Independent runs of several configurations.
pub mod compare;
pub mod engine;
pub mod kpi;
/// Validated input series.
pub mod series;
pub mod types;

pub use battery::BatteryConfig;
pub use engine::{BalancedPolicy, Engine, simulate, simulate_series};
pub use series::TimeSeries;
pub use types::{OutputSample, Sample, StepOutcome};
