/// CSV export of step results and period reports.
pub mod export;
/// Inverter portal CSV ingestion.
pub mod ingest;
