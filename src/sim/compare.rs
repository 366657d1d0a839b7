//! Side-by-side runs of several battery configurations over one series.

use std::panic;
use std::thread;

use super::battery::BatteryConfig;
use super::engine::Engine;
use super::types::{OutputSample, Sample};

/// Simulates every configuration over the same samples.
///
/// Each configuration gets its own [`Engine`] on its own scoped thread, so
/// no SOC state is shared between runs. Results come back in configuration
/// order and equal what sequential [`super::engine::simulate`] calls return.
pub fn run_all(samples: &[Sample], configs: &[BatteryConfig]) -> Vec<Vec<OutputSample>> {
    thread::scope(|scope| {
        let handles: Vec<_> = configs
            .iter()
            .map(|cfg| scope.spawn(move || Engine::new(*cfg).run(samples)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::engine::simulate;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn parallel_runs_match_sequential() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let samples: Vec<Sample> = (0..72)
            .map(|h| {
                let p = if (7..17).contains(&(h % 24)) { 2.5 } else { 0.0 };
                Sample::new(start + Duration::hours(h), p, 0.9 + 0.1 * (h % 5) as f64)
            })
            .collect();
        let configs = [
            BatteryConfig::new(20.0, 0.2, 0.8).unwrap(),
            BatteryConfig::new(5.0, 0.1, 0.5).unwrap(),
            BatteryConfig::no_battery(),
        ];

        let results = run_all(&samples, &configs);
        assert_eq!(results.len(), configs.len());
        for (cfg, outputs) in configs.iter().zip(&results) {
            assert_eq!(outputs, &simulate(&samples, cfg));
        }
    }

    #[test]
    fn no_configs_no_results() {
        assert!(run_all(&[], &[]).is_empty());
    }
}
