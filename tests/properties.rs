//! Property tests for the battery recurrence.

mod common;

use proptest::prelude::*;
use solar_battery_sim::sim::{BatteryConfig, Sample, StepOutcome, simulate};

const TOL: f64 = 1e-9;

fn energy_pairs() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0_f64..15.0, 0.0_f64..15.0), 0..200)
}

fn battery() -> impl Strategy<Value = BatteryConfig> {
    (0.0_f64..40.0, 0.0_f64..=1.0, 0.01_f64..=2.0)
        .prop_map(|(cap, reserve, c_rate)| BatteryConfig::new(cap, reserve, c_rate).unwrap())
}

fn samples(pairs: &[(f64, f64)]) -> Vec<Sample> {
    common::hourly(pairs)
}

proptest! {
    #[test]
    fn reported_soc_within_reserve_and_one(pairs in energy_pairs(), cfg in battery()) {
        let out = simulate(&samples(&pairs), &cfg);
        prop_assert_eq!(out.len(), pairs.len());
        for o in &out {
            prop_assert!(o.soc >= -TOL && o.soc <= 1.0 + TOL);
            prop_assert!(o.soc >= cfg.reserve() - TOL);
        }
    }

    #[test]
    fn flows_are_non_negative(pairs in energy_pairs(), cfg in battery()) {
        for o in simulate(&samples(&pairs), &cfg) {
            prop_assert!(o.self_consumption_kwh >= -TOL);
            prop_assert!(o.from_battery_kwh >= -TOL);
            prop_assert!(o.to_battery_kwh >= -TOL);
            prop_assert!(o.import_kwh >= -TOL);
            prop_assert!(o.export_kwh >= -TOL);
        }
    }

    #[test]
    fn branch_balance_identities(pairs in energy_pairs(), cfg in battery()) {
        let input = samples(&pairs);
        for (s, o) in input.iter().zip(simulate(&input, &cfg)) {
            match o.outcome {
                StepOutcome::Deficit => {
                    let sum = o.self_consumption_kwh + o.import_kwh;
                    prop_assert!((sum - s.consumption_kwh).abs() < 1e-6);
                    prop_assert!(o.export_kwh.abs() < TOL);
                }
                StepOutcome::Surplus => {
                    prop_assert!((o.self_consumption_kwh - s.consumption_kwh).abs() < TOL);
                    let surplus = s.production_kwh - s.consumption_kwh;
                    prop_assert!((o.to_battery_kwh + o.export_kwh - surplus).abs() < 1e-6);
                    prop_assert!(o.import_kwh.abs() < TOL);
                }
                StepOutcome::Balanced => {
                    prop_assert!(o.import_kwh.abs() < TOL && o.export_kwh.abs() < TOL);
                }
            }
        }
    }

    #[test]
    fn no_battery_reduces_to_min_max(pairs in energy_pairs(), reserve in 0.0_f64..=1.0) {
        let cfg = BatteryConfig::new(0.0, reserve, 0.8).unwrap();
        let input = samples(&pairs);
        for (s, o) in input.iter().zip(simulate(&input, &cfg)) {
            let (p, c) = (s.production_kwh, s.consumption_kwh);
            prop_assert!(o.from_battery_kwh.abs() < TOL);
            prop_assert!((o.self_consumption_kwh - p.min(c)).abs() < 1e-6);
            prop_assert!((o.import_kwh - (c - p).max(0.0)).abs() < 1e-6);
            prop_assert!((o.export_kwh - (p - c).max(0.0)).abs() < 1e-6);
            prop_assert!(o.soc.is_finite());
        }
    }

    #[test]
    fn simulate_is_idempotent(pairs in energy_pairs(), cfg in battery()) {
        let input = samples(&pairs);
        prop_assert_eq!(simulate(&input, &cfg), simulate(&input, &cfg));
    }
}
