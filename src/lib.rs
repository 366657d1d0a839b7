//! Solar + battery state-of-charge and energy-flow simulator.

pub mod cli;
pub mod config;
pub mod error;
/// CSV ingestion and export.
pub mod io;
pub mod profile;
pub mod runner;
/// Battery model, simulation engine, aggregation and summaries.
pub mod sim;
pub mod telemetry;
