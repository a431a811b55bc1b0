//! Lead-Lag Analyzer
//!
//! For the top-ranked pairs, tests lagged correlations in both directions
//! and estimates one-step directional (sign-agreement) accuracy. Pairs or
//! individual lag/direction tests without enough aligned observations are
//! skipped, never treated as errors.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::config::ScanConfig;
use super::correlation::RankedPair;
use super::returns::ReturnsTable;
use crate::stats::pearson_test;

/// Absolute-correlation threshold for a "strong" leading indicator
pub const STRONG_CORRELATION: f64 = 0.3;
/// Absolute-correlation threshold for a "moderate" leading indicator
pub const MODERATE_CORRELATION: f64 = 0.2;
/// Accuracy threshold for a "strong" directional predictor
pub const STRONG_ACCURACY: f64 = 0.6;
/// Accuracy threshold for a "moderate" directional predictor
pub const MODERATE_ACCURACY: f64 = 0.55;

/// Strength label for an already-significant lead-lag result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

impl Strength {
    /// Labeling policy over absolute correlation; never a filter
    pub fn from_correlation(correlation: f64) -> Self {
        let magnitude = correlation.abs();
        if magnitude > STRONG_CORRELATION {
            Strength::Strong
        } else if magnitude > MODERATE_CORRELATION {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strength::Strong => write!(f, "STRONG"),
            Strength::Moderate => write!(f, "MODERATE"),
            Strength::Weak => write!(f, "WEAK"),
        }
    }
}

/// Strength label for directional accuracy; absent below the moderate bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionStrength {
    Strong,
    Moderate,
}

impl DirectionStrength {
    pub fn from_accuracy(accuracy: f64) -> Option<Self> {
        if accuracy > STRONG_ACCURACY {
            Some(DirectionStrength::Strong)
        } else if accuracy > MODERATE_ACCURACY {
            Some(DirectionStrength::Moderate)
        } else {
            None
        }
    }
}

impl fmt::Display for DirectionStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionStrength::Strong => write!(f, "STRONG"),
            DirectionStrength::Moderate => write!(f, "MODERATE"),
        }
    }
}

/// One directed lag test: leader's past return vs follower's current return
#[derive(Debug, Clone, Serialize)]
pub struct LeadLagResult {
    pub leader: String,
    pub follower: String,
    /// Lag offset in buckets
    pub lag: usize,
    pub correlation: f64,
    pub p_value: f64,
    pub sample_size: usize,
    pub strength: Strength,
}

/// One-step sign-agreement diagnostic for a directed pair
#[derive(Debug, Clone, Serialize)]
pub struct DirectionalAccuracy {
    pub leader: String,
    pub follower: String,
    /// Fraction of rows where leader's lagged sign matches follower's sign
    pub accuracy: f64,
    pub sample_size: usize,
    pub strength: Option<DirectionStrength>,
}

/// Analysis outcome for one ranked pair
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Too few pair-aligned rows for any lag analysis
    InsufficientData { rows: usize },
    /// Significant lag results (top slice) plus both directional accuracies
    Analyzed {
        significant: Vec<LeadLagResult>,
        accuracy: Vec<DirectionalAccuracy>,
    },
}

/// Lead-lag analysis of one ranked pair
#[derive(Debug, Clone, Serialize)]
pub struct PairAnalysis {
    pub pair: RankedPair,
    pub outcome: AnalysisOutcome,
}

/// Run the analyzer over the top-K ranked pairs
pub fn analyze_top_pairs(
    returns: &ReturnsTable,
    ranked: &[RankedPair],
    config: &ScanConfig,
) -> Vec<PairAnalysis> {
    ranked
        .iter()
        .take(config.top_pairs)
        .filter_map(|pair| match analyze_pair(returns, pair, config) {
            Some(analysis) => Some(analysis),
            None => {
                warn!(
                    a = %pair.symbol_a,
                    b = %pair.symbol_b,
                    "Pair references unknown column, skipping"
                );
                None
            }
        })
        .collect()
}

/// Analyze a single pair: all lags in both directions, then accuracy
pub fn analyze_pair(
    returns: &ReturnsTable,
    pair: &RankedPair,
    config: &ScanConfig,
) -> Option<PairAnalysis> {
    let i = returns.column_index(&pair.symbol_a)?;
    let j = returns.column_index(&pair.symbol_b)?;

    // Pair-local alignment, independent of the whole-table drop upstream
    let rows = returns.pair_rows(i, j);
    if rows.len() < config.min_pair_rows {
        debug!(
            a = %pair.symbol_a,
            b = %pair.symbol_b,
            rows = rows.len(),
            "Insufficient data for lead-lag analysis"
        );
        return Some(PairAnalysis {
            pair: pair.clone(),
            outcome: AnalysisOutcome::InsufficientData { rows: rows.len() },
        });
    }

    let (a, b): (Vec<f64>, Vec<f64>) = rows.into_iter().unzip();

    let mut results = Vec::new();
    for lag in 1..=config.max_lag {
        if let Some(result) = lag_test(&a, &b, &pair.symbol_a, &pair.symbol_b, lag, config) {
            results.push(result);
        }
        if let Some(result) = lag_test(&b, &a, &pair.symbol_b, &pair.symbol_a, lag, config) {
            results.push(result);
        }
    }

    let mut significant: Vec<LeadLagResult> = results
        .into_iter()
        .filter(|r| {
            r.p_value < config.significance_level
                && r.correlation.abs() > config.min_significant_correlation
        })
        .collect();
    significant.sort_by(|x, y| {
        y.correlation
            .abs()
            .partial_cmp(&x.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    significant.truncate(config.top_results);

    let accuracy = [
        directional_accuracy(&a, &b, &pair.symbol_a, &pair.symbol_b, config),
        directional_accuracy(&b, &a, &pair.symbol_b, &pair.symbol_a, config),
    ]
    .into_iter()
    .flatten()
    .collect();

    Some(PairAnalysis {
        pair: pair.clone(),
        outcome: AnalysisOutcome::Analyzed {
            significant,
            accuracy,
        },
    })
}

/// Test one direction at one lag offset
///
/// Pairs `leader[t - lag]` with `follower[t]`; the first `lag` rows are
/// dropped by the shift. Runs only with strictly more than
/// `min_lag_samples` remaining observations.
fn lag_test(
    leader: &[f64],
    follower: &[f64],
    leader_name: &str,
    follower_name: &str,
    lag: usize,
    config: &ScanConfig,
) -> Option<LeadLagResult> {
    let n = leader.len();
    if n <= lag {
        return None;
    }

    let samples = n - lag;
    if samples <= config.min_lag_samples {
        return None;
    }

    let test = pearson_test(&leader[..samples], &follower[lag..])?;

    Some(LeadLagResult {
        leader: leader_name.to_string(),
        follower: follower_name.to_string(),
        lag,
        correlation: test.correlation,
        p_value: test.p_value,
        sample_size: test.sample_size,
        strength: Strength::from_correlation(test.correlation),
    })
}

/// One-step directional accuracy for a directed pair
///
/// Sign convention: `value > 0` counts as up; zero is conflated with
/// down. Requires `min_pair_rows` aligned rows before the shift and
/// `min_direction_rows` after it.
fn directional_accuracy(
    leader: &[f64],
    follower: &[f64],
    leader_name: &str,
    follower_name: &str,
    config: &ScanConfig,
) -> Option<DirectionalAccuracy> {
    let n = leader.len();
    if n < config.min_pair_rows {
        return None;
    }

    let samples = n - 1;
    if samples < config.min_direction_rows {
        return None;
    }

    let matches = leader[..samples]
        .iter()
        .zip(follower[1..].iter())
        .filter(|(l, f)| (**l > 0.0) == (**f > 0.0))
        .count();
    let accuracy = matches as f64 / samples as f64;

    Some(DirectionalAccuracy {
        leader: leader_name.to_string(),
        follower: follower_name.to_string(),
        accuracy,
        sample_size: samples,
        strength: DirectionStrength::from_accuracy(accuracy),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Deterministic pseudo-random values in (-0.5, 0.5)
    fn noise(len: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345) % (1 << 31);
                state as f64 / (1u64 << 31) as f64 - 0.5
            })
            .collect()
    }

    fn returns_table(columns: Vec<(&str, Vec<f64>)>) -> ReturnsTable {
        let height = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        ReturnsTable {
            timestamps: (0..height)
                .map(|i| base + chrono::Duration::minutes(5 * i as i64))
                .collect(),
            symbols: columns.iter().map(|(s, _)| s.to_string()).collect(),
            columns: columns
                .into_iter()
                .map(|(_, c)| c.into_iter().map(Some).collect())
                .collect(),
        }
    }

    fn pair(a: &str, b: &str) -> RankedPair {
        RankedPair {
            symbol_a: a.to_string(),
            symbol_b: b.to_string(),
            correlation: 0.0,
        }
    }

    #[test]
    fn test_exact_lag_relationship_surfaces() {
        // b[t] = a[t-2] exactly
        let a = noise(200, 7);
        let mut b = noise(2, 99);
        b.extend_from_slice(&a[..198]);

        let returns = returns_table(vec![("a", a), ("b", b)]);
        let config = ScanConfig::default();
        let analysis = analyze_pair(&returns, &pair("a", "b"), &config).unwrap();

        match analysis.outcome {
            AnalysisOutcome::Analyzed { significant, .. } => {
                let top = &significant[0];
                assert_eq!(top.leader, "a");
                assert_eq!(top.follower, "b");
                assert_eq!(top.lag, 2);
                assert!((top.correlation - 1.0).abs() < 1e-9);
                assert!(top.p_value < 1e-9);
                assert_eq!(top.strength, Strength::Strong);
                assert_eq!(top.sample_size, 198);
            }
            AnalysisOutcome::InsufficientData { rows } => {
                panic!("unexpected insufficient data: {rows} rows")
            }
        }
    }

    #[test]
    fn test_perfect_sign_following_accuracy() {
        // sign(b[t]) = sign(a[t-1]) always
        let a = noise(120, 11);
        let mut b = vec![0.01];
        b.extend(a[..119].iter().map(|v| v * 0.5));

        let returns = returns_table(vec![("a", a), ("b", b)]);
        let config = ScanConfig::default();
        let analysis = analyze_pair(&returns, &pair("a", "b"), &config).unwrap();

        match analysis.outcome {
            AnalysisOutcome::Analyzed { accuracy, .. } => {
                let forward = accuracy
                    .iter()
                    .find(|d| d.leader == "a" && d.follower == "b")
                    .expect("forward direction present");
                assert!((forward.accuracy - 1.0).abs() < 1e-12);
                assert_eq!(forward.strength, Some(DirectionStrength::Strong));
                assert_eq!(forward.sample_size, 119);
            }
            AnalysisOutcome::InsufficientData { rows } => {
                panic!("unexpected insufficient data: {rows} rows")
            }
        }
    }

    #[test]
    fn test_insufficient_pair_rows() {
        let returns = returns_table(vec![("a", noise(40, 3)), ("b", noise(40, 5))]);
        let config = ScanConfig::default();
        let analysis = analyze_pair(&returns, &pair("a", "b"), &config).unwrap();
        assert!(matches!(
            analysis.outcome,
            AnalysisOutcome::InsufficientData { rows: 40 }
        ));
    }

    #[test]
    fn test_lag_tests_skipped_below_sample_minimum() {
        // 55 rows clears the pair minimum but not the per-lag minimum
        let returns = returns_table(vec![("a", noise(55, 3)), ("b", noise(55, 5))]);
        let config = ScanConfig {
            min_lag_samples: 60,
            ..Default::default()
        };
        let analysis = analyze_pair(&returns, &pair("a", "b"), &config).unwrap();
        match analysis.outcome {
            AnalysisOutcome::Analyzed {
                significant,
                accuracy,
            } => {
                assert!(significant.is_empty());
                // Accuracy has its own thresholds and still runs
                assert_eq!(accuracy.len(), 2);
            }
            AnalysisOutcome::InsufficientData { rows } => {
                panic!("unexpected insufficient data: {rows} rows")
            }
        }
    }

    #[test]
    fn test_lag_sample_minimum_is_strict() {
        let config = ScanConfig::default();
        // 21 rows, lag 1 leaves exactly 20 samples: not strictly greater
        let a = noise(21, 13);
        let b = noise(21, 17);
        assert!(lag_test(&a, &b, "a", "b", 1, &config).is_none());

        // 22 rows leaves 21 samples: qualifies
        let a = noise(22, 13);
        let b = noise(22, 17);
        assert!(lag_test(&a, &b, "a", "b", 1, &config).is_some());
    }

    #[test]
    fn test_zero_counts_as_non_positive() {
        let config = ScanConfig {
            min_pair_rows: 4,
            min_direction_rows: 3,
            ..Default::default()
        };
        // leader signs: 0 -> down, follower next-step signs all down
        let leader = vec![0.0, -0.1, 0.0, -0.2];
        let follower = vec![-0.1, -0.1, -0.1, -0.1];
        let result = directional_accuracy(&leader, &follower, "a", "b", &config).unwrap();
        assert!((result.accuracy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_strength_labels() {
        assert_eq!(Strength::from_correlation(0.35), Strength::Strong);
        assert_eq!(Strength::from_correlation(-0.25), Strength::Moderate);
        assert_eq!(Strength::from_correlation(0.15), Strength::Weak);
        assert_eq!(
            DirectionStrength::from_accuracy(0.61),
            Some(DirectionStrength::Strong)
        );
        assert_eq!(
            DirectionStrength::from_accuracy(0.56),
            Some(DirectionStrength::Moderate)
        );
        assert_eq!(DirectionStrength::from_accuracy(0.55), None);
    }

    #[test]
    fn test_top_pairs_bound() {
        let returns = returns_table(vec![
            ("a", noise(100, 1)),
            ("b", noise(100, 2)),
            ("c", noise(100, 3)),
        ]);
        let ranked = vec![pair("a", "b"), pair("a", "c"), pair("b", "c")];
        let config = ScanConfig {
            top_pairs: 2,
            ..Default::default()
        };
        let analyses = analyze_top_pairs(&returns, &ranked, &config);
        assert_eq!(analyses.len(), 2);
    }
}
