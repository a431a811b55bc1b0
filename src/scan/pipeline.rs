//! Pipeline orchestration
//!
//! Pure staged computation: load outcomes → aligned prices → returns →
//! correlation → ranked pairs → lead-lag. Each stage takes the previous
//! stage's output as an explicit parameter.

use tracing::info;

use super::config::ScanConfig;
use super::correlation::{correlation_matrix, high_correlation_pairs, rank_pairs, summarize};
use super::error::ScanError;
use super::leadlag::analyze_top_pairs;
use super::loader::{LoadOutcome, RawSeries, SkipReason};
use super::report::{LeadLagReport, MatrixReport, SkippedInstrument};
use super::resample::{align, AlignedPriceTable};
use super::returns::{compute_returns, ReturnsTable};

/// Shared intermediate state for both report kinds
#[derive(Debug)]
pub struct PreparedData {
    /// Instruments excluded during loading, with their reasons
    pub skipped: Vec<(String, SkipReason)>,
    /// Forward-filled union-grid price table
    pub aligned: AlignedPriceTable,
    /// Returns table under the configured alignment policy
    pub returns: ReturnsTable,
}

/// Aggregate load outcomes and run the shared data-preparation stages
///
/// Fails only when zero series survive loading; every other problem has
/// already been downgraded to a skip.
pub fn prepare(outcomes: Vec<LoadOutcome>, config: &ScanConfig) -> Result<PreparedData, ScanError> {
    let candidates = outcomes.len();
    let mut series: Vec<RawSeries> = Vec::new();
    let mut skipped: Vec<(String, SkipReason)> = Vec::new();

    for outcome in outcomes {
        match outcome {
            LoadOutcome::Loaded(s) => series.push(s),
            LoadOutcome::Skipped { symbol, reason } => skipped.push((symbol, reason)),
        }
    }

    if series.is_empty() {
        return Err(ScanError::NoUsableData { candidates });
    }

    info!(
        accepted = series.len(),
        skipped = skipped.len(),
        bucket_minutes = config.bucket_minutes,
        "Preparing aligned returns"
    );

    let aligned = align(&series, config.bucket_minutes);
    let returns = compute_returns(&aligned, config.alignment);

    info!(
        rows = returns.height(),
        columns = returns.width(),
        policy = ?config.alignment,
        "Returns table ready"
    );

    Ok(PreparedData {
        skipped,
        aligned,
        returns,
    })
}

/// Build the correlation-matrix report
pub fn matrix_report(data: &PreparedData, config: &ScanConfig) -> MatrixReport {
    let matrix = correlation_matrix(&data.returns);
    let ranked = rank_pairs(&matrix);
    let high_correlation = high_correlation_pairs(&matrix, config.high_correlation_threshold);
    let summary = summarize(&matrix);

    MatrixReport {
        accepted: data.aligned.symbols.clone(),
        skipped: data
            .skipped
            .iter()
            .map(|(symbol, reason)| SkippedInstrument {
                symbol: symbol.clone(),
                reason: reason.to_string(),
            })
            .collect(),
        time_range: data.aligned.time_range(),
        rows: data.aligned.height(),
        columns: data.aligned.width(),
        high_correlation_threshold: config.high_correlation_threshold,
        matrix,
        ranked,
        high_correlation,
        summary,
    }
}

/// Build the lead-lag report over the top-K ranked pairs
pub fn lead_lag_report(data: &PreparedData, config: &ScanConfig) -> LeadLagReport {
    let matrix = correlation_matrix(&data.returns);
    let ranked = rank_pairs(&matrix);
    let top: Vec<_> = ranked.iter().take(config.top_pairs).cloned().collect();
    let analyses = analyze_top_pairs(&data.returns, &ranked, config);

    LeadLagReport {
        top_pairs: top,
        analyses,
        significance_level: config.significance_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(symbol: &str, prices: &[f64]) -> RawSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        RawSeries {
            symbol: symbol.to_string(),
            rows: prices
                .iter()
                .enumerate()
                .map(|(i, &p)| (base + chrono::Duration::minutes(5 * i as i64), p))
                .collect(),
        }
    }

    #[test]
    fn test_prepare_fails_on_zero_survivors() {
        let outcomes = vec![
            LoadOutcome::Skipped {
                symbol: "x".to_string(),
                reason: SkipReason::EmptyAfterCleaning,
            },
            LoadOutcome::Skipped {
                symbol: "y".to_string(),
                reason: SkipReason::MissingColumns {
                    missing: vec!["close".to_string()],
                },
            },
        ];
        let err = prepare(outcomes, &ScanConfig::default()).unwrap_err();
        match err {
            ScanError::NoUsableData { candidates } => assert_eq!(candidates, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skipped_instrument_never_reaches_ranked_pairs() {
        let outcomes = vec![
            LoadOutcome::Loaded(series("a", &[100.0, 101.0, 102.0, 101.5])),
            LoadOutcome::Loaded(series("b", &[50.0, 50.5, 50.2, 50.8])),
            LoadOutcome::Skipped {
                symbol: "c".to_string(),
                reason: SkipReason::MissingColumns {
                    missing: vec!["close".to_string()],
                },
            },
        ];

        let config = ScanConfig::default();
        let data = prepare(outcomes, &config).unwrap();
        let report = matrix_report(&data, &config);

        assert_eq!(report.accepted, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.ranked.len(), 1);
        assert!(report
            .ranked
            .iter()
            .all(|p| p.symbol_a != "c" && p.symbol_b != "c"));
    }

    #[test]
    fn test_matrix_report_shape() {
        let outcomes = vec![
            LoadOutcome::Loaded(series("a", &[100.0, 101.0, 99.0, 102.0, 100.5])),
            LoadOutcome::Loaded(series("b", &[20.0, 20.2, 19.9, 20.4, 20.1])),
            LoadOutcome::Loaded(series("c", &[5.0, 5.1, 5.05, 4.95, 5.2])),
        ];

        let config = ScanConfig::default();
        let data = prepare(outcomes, &config).unwrap();
        let report = matrix_report(&data, &config);

        assert_eq!(report.columns, 3);
        assert_eq!(report.rows, 5);
        assert_eq!(report.matrix.size(), 3);
        assert_eq!(report.ranked.len(), 3); // C(3, 2)
        assert!(report.time_range.is_some());
        let summary = report.summary.unwrap();
        assert!(summary.min <= summary.mean && summary.mean <= summary.max);
    }
}
