//! Solar + battery simulator entry point: CLI wiring and report output.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use solar_battery_sim::cli::Cli;
use solar_battery_sim::error::SimError;
use solar_battery_sim::io::export::{export_csv, export_period_csv};
use solar_battery_sim::runner::{RunReport, run_scenario};
use solar_battery_sim::telemetry;

fn print_report(report: &RunReport) {
    println!("Data:    {}", report.source);
    println!("Battery: {}", report.battery);
    println!();

    for period in &report.periods {
        println!("{period}");
    }

    println!("\n{}", report.summary);
    if let Some(trend) = report.soc_trend.filter(|_| report.battery.has_battery()) {
        println!("{trend}");
    }

    if let Some(baseline) = &report.no_battery {
        println!("\nWithout battery:");
        println!("{}", baseline.summary);
        if let Some(saved) = report.import_saved_kwh() {
            println!("Import avoided:        {saved:.2} kWh");
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let scenario = cli.scenario_config()?;
    let report = run_scenario(&scenario, cli.compare_no_battery)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(path) = &cli.telemetry_out {
        export_csv(report.series.samples(), &report.outputs, path).map_err(|source| {
            SimError::Export {
                path: path.clone(),
                source,
            }
        })?;
        info!(path = %path.display(), "step results written");
    }
    if let Some(path) = &cli.report_out {
        export_period_csv(&report.periods, path).map_err(|source| SimError::Export {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "period report written");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
