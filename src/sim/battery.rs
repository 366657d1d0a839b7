use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

/// Battery parameters for one simulation run.
///
/// Immutable once constructed. Construct with [`BatteryConfig::new`], which
/// rejects out-of-range values instead of clamping them, or use
/// [`BatteryConfig::no_battery`] for the grid-only comparison case.
///
/// # Examples
///
/// ```
/// use solar_battery_sim::sim::battery::BatteryConfig;
///
/// let cfg = BatteryConfig::new(20.0, 0.2, 0.8).unwrap();
/// assert!((cfg.usable_capacity_kwh() - 16.0).abs() < 1e-12);
/// assert!((cfg.depth_of_discharge() - 0.8).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryConfig {
    /// Nameplate capacity (kWh, >= 0). Zero means "no battery".
    capacity_kwh: f64,
    /// Fraction of capacity that is never cycled (0.0 to 1.0).
    reserve: f64,
    /// Fraction of the remaining headroom that may be charged per interval.
    c_rate: f64,
}

impl BatteryConfig {
    /// Creates a validated battery configuration.
    ///
    /// A zero capacity is the documented no-battery mode; the reserve is
    /// forced to 0 in that case so the reported SOC stays well-defined.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when capacity is negative or non-finite,
    /// reserve lies outside [0, 1], or `c_rate` is not a positive number.
    pub fn new(capacity_kwh: f64, reserve: f64, c_rate: f64) -> Result<Self, ConfigError> {
        if !capacity_kwh.is_finite() || capacity_kwh < 0.0 {
            return Err(ConfigError::new(
                "battery.capacity_kwh",
                format!("must be a finite value >= 0, got {capacity_kwh}"),
            ));
        }
        if !(0.0..=1.0).contains(&reserve) {
            return Err(ConfigError::new(
                "battery.reserve",
                format!("must be in [0.0, 1.0], got {reserve}"),
            ));
        }
        if !c_rate.is_finite() || c_rate <= 0.0 {
            return Err(ConfigError::new(
                "battery.c_rate",
                format!("must be a finite value > 0, got {c_rate}"),
            ));
        }

        let reserve = if capacity_kwh == 0.0 { 0.0 } else { reserve };
        Ok(Self {
            capacity_kwh,
            reserve,
            c_rate,
        })
    }

    /// Grid-tied solar without storage: capacity and reserve both zero.
    pub fn no_battery() -> Self {
        Self {
            capacity_kwh: 0.0,
            reserve: 0.0,
            c_rate: 1.0,
        }
    }

    /// Same battery with capacity and reserve forced to zero.
    pub fn without_battery(&self) -> Self {
        Self {
            capacity_kwh: 0.0,
            reserve: 0.0,
            c_rate: self.c_rate,
        }
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    pub fn reserve(&self) -> f64 {
        self.reserve
    }

    pub fn c_rate(&self) -> f64 {
        self.c_rate
    }

    /// Fraction of capacity that may be cycled: `1 - reserve`.
    pub fn depth_of_discharge(&self) -> f64 {
        1.0 - self.reserve
    }

    /// Energy the battery may actually cycle (kWh).
    pub fn usable_capacity_kwh(&self) -> f64 {
        self.capacity_kwh * self.depth_of_discharge()
    }

    pub fn has_battery(&self) -> bool {
        self.usable_capacity_kwh() > 0.0
    }

    /// Maps internal SOC (fraction of usable capacity) onto the displayed
    /// range `[reserve, 1.0]`.
    ///
    /// The input is clamped to [0, 1] first.
    pub fn reported_soc(&self, soc: f64) -> f64 {
        let soc = soc.clamp(0.0, 1.0);
        self.reserve + soc * (1.0 - self.reserve)
    }
}

impl fmt::Display for BatteryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_battery() {
            return write!(f, "no battery (solar only)");
        }
        write!(
            f,
            "capacity={:.2} kWh  reserve={:.0}%  usable={:.2} kWh  charge rate={:.0}%/interval",
            self.capacity_kwh,
            self.reserve * 100.0,
            self.usable_capacity_kwh(),
            self.c_rate * 100.0,
        )
    }
}
