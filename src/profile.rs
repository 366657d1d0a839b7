//! Seeded synthetic production/consumption series.
//!
//! Used when no measured data is supplied: a half-sine PV day with
//! multiplicative noise and a sinusoidal household base load with additive
//! noise, one sample per hour.

use chrono::{Duration, NaiveDateTime};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::InputError;
use crate::sim::series::TimeSeries;
use crate::sim::types::Sample;

/// Offset between the PV and load RNG streams so they are uncorrelated.
const LOAD_SEED_OFFSET: u64 = 57;

/// Parameters for an hourly synthetic series.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticProfile {
    pub start: NaiveDateTime,
    pub days: usize,
    pub seed: u64,
    /// Peak PV output at solar noon (kW).
    pub pv_kw_peak: f64,
    /// Hour of day production starts (inclusive).
    pub sunrise_hour: usize,
    /// Hour of day production ends (exclusive).
    pub sunset_hour: usize,
    /// Relative PV noise (e.g. 0.05 for a 5 % standard deviation).
    pub pv_noise_std: f64,
    /// Mean household load (kW).
    pub base_kw: f64,
    /// Daily sinusoidal load amplitude (kW).
    pub amp_kw: f64,
    /// Phase of the load sinusoid (radians).
    pub phase_rad: f64,
    /// Absolute load noise (kW).
    pub load_noise_std: f64,
}

impl SyntheticProfile {
    /// Produces `days * 24` hourly samples.
    ///
    /// # Errors
    ///
    /// Only fails if the generated series would be invalid, which the
    /// clamping below rules out for finite parameters.
    pub fn generate(&self) -> Result<TimeSeries, InputError> {
        let mut pv_rng = StdRng::seed_from_u64(self.seed);
        let mut load_rng = StdRng::seed_from_u64(self.seed.wrapping_add(LOAD_SEED_OFFSET));

        let samples = (0..self.days * 24)
            .map(|h| {
                let hour_of_day = h % 24;
                let timestamp = self.start + Duration::hours(h as i64);
                let production = self.pv_kwh(hour_of_day, &mut pv_rng);
                let consumption = self.load_kwh(hour_of_day, &mut load_rng);
                Sample::new(timestamp, production, consumption)
            })
            .collect();
        TimeSeries::new(samples)
    }

    /// Energy over one hour equals mean power in kW.
    fn pv_kwh(&self, hour_of_day: usize, rng: &mut StdRng) -> f64 {
        let frac = daylight_frac(hour_of_day, self.sunrise_hour, self.sunset_hour);
        if frac <= 0.0 {
            return 0.0;
        }
        let noise_mult = 1.0 + gaussian_noise(rng, self.pv_noise_std);
        (self.pv_kw_peak * frac * noise_mult).max(0.0)
    }

    fn load_kwh(&self, hour_of_day: usize, rng: &mut StdRng) -> f64 {
        let day_pos = hour_of_day as f64 / 24.0;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let noise = gaussian_noise(rng, self.load_noise_std);
        (self.base_kw + self.amp_kw * angle.sin() + noise).max(0.0)
    }
}

/// Half-sine daylight shape, sampled at the middle of the hour.
///
/// Returns 0 outside `[sunrise, sunset)` or when the window is empty.
pub fn daylight_frac(hour_of_day: usize, sunrise: usize, sunset: usize) -> f64 {
    if sunset <= sunrise || hour_of_day < sunrise || hour_of_day >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f64;
    let x = (hour_of_day - sunrise) as f64 + 0.5;
    (std::f64::consts::PI * x / span).sin().max(0.0)
}

/// Gaussian noise with mean 0 via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}
