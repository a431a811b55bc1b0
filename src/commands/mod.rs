//! CLI command handlers.
//!
//! Each handler assembles a [`ScanConfig`](crate::scan::ScanConfig) from
//! CLI arguments, runs the scan pipeline, and renders the report.

mod lead_lag;
mod matrix;

pub use lead_lag::run_lead_lag;
pub use matrix::run_matrix;
