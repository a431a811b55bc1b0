//! Correlation Engine
//!
//! Pairwise Pearson correlation matrix over the returns table, ranked
//! unordered pairs, and upper-triangle summary statistics.

use serde::Serialize;
use tracing::debug;

use super::returns::ReturnsTable;
use crate::stats::pearson;

/// Square, symmetric correlation matrix with unit diagonal
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    /// Instrument identifiers in discovery order
    pub symbols: Vec<String>,
    /// Row-major correlation values
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Number of instruments
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Correlation between instruments `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// An unordered instrument pair with its return correlation
#[derive(Debug, Clone, Serialize)]
pub struct RankedPair {
    pub symbol_a: String,
    pub symbol_b: String,
    pub correlation: f64,
}

/// Upper-triangle summary statistics (diagonal excluded)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CorrelationSummary {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Compute the full pairwise correlation matrix
///
/// Each entry is computed over the rows where both columns are defined;
/// degenerate pairs (too few rows, zero variance) contribute 0.0.
pub fn correlation_matrix(returns: &ReturnsTable) -> CorrelationMatrix {
    let n = returns.width();
    let mut values = vec![vec![0.0; n]; n];

    for (i, row) in values.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let rows = returns.pair_rows(i, j);
            let (a, b): (Vec<f64>, Vec<f64>) = rows.into_iter().unzip();
            let correlation = pearson(&a, &b).unwrap_or(0.0);
            values[i][j] = correlation;
            values[j][i] = correlation;
        }
    }

    debug!(instruments = n, "Correlation matrix computed");

    CorrelationMatrix {
        symbols: returns.symbols.clone(),
        values,
    }
}

/// Enumerate each unordered pair exactly once, in upper-triangle order
pub fn enumerate_pairs(matrix: &CorrelationMatrix) -> Vec<RankedPair> {
    let n = matrix.size();
    let mut pairs = Vec::with_capacity(n * (n.saturating_sub(1)) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push(RankedPair {
                symbol_a: matrix.symbols[i].clone(),
                symbol_b: matrix.symbols[j].clone(),
                correlation: matrix.values[i][j],
            });
        }
    }
    pairs
}

/// Rank all pairs by descending absolute correlation
///
/// The sort is stable, so equal magnitudes keep enumeration order.
pub fn rank_pairs(matrix: &CorrelationMatrix) -> Vec<RankedPair> {
    let mut pairs = enumerate_pairs(matrix);
    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}

/// Pairs whose absolute correlation exceeds the threshold, in
/// enumeration order
pub fn high_correlation_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<RankedPair> {
    enumerate_pairs(matrix)
        .into_iter()
        .filter(|pair| pair.correlation.abs() > threshold)
        .collect()
}

/// Mean/max/min over the upper triangle; None when fewer than 2 instruments
pub fn summarize(matrix: &CorrelationMatrix) -> Option<CorrelationSummary> {
    let pairs = enumerate_pairs(matrix);
    if pairs.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for pair in &pairs {
        sum += pair.correlation;
        max = max.max(pair.correlation);
        min = min.min(pair.correlation);
    }

    Some(CorrelationSummary {
        mean: sum / pairs.len() as f64,
        max,
        min,
    })
}
