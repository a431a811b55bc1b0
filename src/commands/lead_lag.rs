//! Lead-lag command handler.

use std::path::Path;

use tracing::info;

use crate::scan::returns::AlignmentPolicy;
use crate::scan::{self, loader, pipeline, report, ScanConfig, ScanError};

/// Run the lead-lag scan over the top correlated pairs.
///
/// # Errors
/// Returns an error for invalid configuration, an unreadable data
/// directory, or when no instrument file survives loading.
#[allow(clippy::too_many_arguments)]
pub fn run_lead_lag(
    data_dir: &str,
    interval: u64,
    time_column: &str,
    price_column: &str,
    alignment: &str,
    pairs: usize,
    max_lag: usize,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy: AlignmentPolicy = alignment.parse().map_err(ScanError::InvalidConfig)?;
    let config = ScanConfig {
        time_column: time_column.to_string(),
        price_column: price_column.to_string(),
        bucket_minutes: interval,
        alignment: policy,
        top_pairs: pairs,
        max_lag,
        ..Default::default()
    };
    config.validate().map_err(ScanError::InvalidConfig)?;

    info!(data_dir, interval, pairs, max_lag, "--- PairScope: Lead-Lag Scan ---");

    let outcomes = loader::load_dir(Path::new(data_dir), &config)?;
    let data = scan::prepare(outcomes, &config)?;
    let lead_lag_report = pipeline::lead_lag_report(&data, &config);

    report::render_lead_lag(&lead_lag_report);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&lead_lag_report)?)?;
        info!(path, "Report written");
    }

    Ok(())
}
