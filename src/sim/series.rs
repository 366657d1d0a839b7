//! Validated input time series.

use chrono::NaiveDateTime;

use super::types::Sample;
use crate::error::InputError;

/// An ordered, validated sequence of [`Sample`]s.
///
/// Timestamps are non-decreasing and all energy values are finite and
/// non-negative. Validation happens once, at construction, so a run over a
/// `TimeSeries` cannot fail part-way through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Validates and wraps a sample vector.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NonMonotonic` if a timestamp precedes its
    /// predecessor, or `InputError::InvalidValue` for negative or
    /// non-finite energy.
    pub fn new(samples: Vec<Sample>) -> Result<Self, InputError> {
        for (index, s) in samples.iter().enumerate() {
            check_energy("production", index, s.production_kwh)?;
            check_energy("consumption", index, s.consumption_kwh)?;
        }
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(InputError::NonMonotonic {
                    index: index + 1,
                    previous: pair[0].timestamp,
                    current: pair[1].timestamp,
                });
            }
        }
        Ok(Self { samples })
    }

    /// Builds a series from parallel columns.
    ///
    /// # Errors
    ///
    /// Returns `InputError::LengthMismatch` if the columns differ in length,
    /// plus everything [`TimeSeries::new`] checks.
    pub fn from_columns(
        timestamps: &[NaiveDateTime],
        production_kwh: &[f64],
        consumption_kwh: &[f64],
    ) -> Result<Self, InputError> {
        if timestamps.len() != production_kwh.len() || timestamps.len() != consumption_kwh.len() {
            return Err(InputError::LengthMismatch {
                timestamps: timestamps.len(),
                production: production_kwh.len(),
                consumption: consumption_kwh.len(),
            });
        }
        let samples = timestamps
            .iter()
            .zip(production_kwh)
            .zip(consumption_kwh)
            .map(|((&t, &p), &c)| Sample::new(t, p, c))
            .collect();
        Self::new(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

}

fn check_energy(field: &'static str, index: usize, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidValue {
            field,
            index,
            value,
        })
    }
}
