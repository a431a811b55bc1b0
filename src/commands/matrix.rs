//! Correlation matrix command handler.

use std::path::Path;

use tracing::info;

use crate::scan::returns::AlignmentPolicy;
use crate::scan::{self, loader, pipeline, report, ScanConfig, ScanError};

/// Run the correlation-matrix scan.
///
/// # Errors
/// Returns an error for invalid configuration, an unreadable data
/// directory, or when no instrument file survives loading.
#[allow(clippy::too_many_arguments)]
pub fn run_matrix(
    data_dir: &str,
    interval: u64,
    time_column: &str,
    price_column: &str,
    alignment: &str,
    threshold: f64,
    top: usize,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let policy: AlignmentPolicy = alignment.parse().map_err(ScanError::InvalidConfig)?;
    let config = ScanConfig {
        time_column: time_column.to_string(),
        price_column: price_column.to_string(),
        bucket_minutes: interval,
        alignment: policy,
        high_correlation_threshold: threshold,
        top_ranked: top,
        ..Default::default()
    };
    config.validate().map_err(ScanError::InvalidConfig)?;

    info!(data_dir, interval, "--- PairScope: Correlation Matrix Scan ---");

    let outcomes = loader::load_dir(Path::new(data_dir), &config)?;
    let data = scan::prepare(outcomes, &config)?;
    let matrix_report = pipeline::matrix_report(&data, &config);

    report::render_matrix(&matrix_report, config.top_ranked);

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&matrix_report)?)?;
        info!(path, "Report written");
    }

    Ok(())
}
