//! Returns Engine
//!
//! Converts aligned price levels into bucket-over-bucket fractional
//! returns. The first row is always undefined (no predecessor); what
//! happens to rows with remaining gaps is governed by [`AlignmentPolicy`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::resample::AlignedPriceTable;

/// Row-drop policy applied after deriving returns
///
/// The reference behavior drops a row when *any* instrument is missing a
/// return there, coupling unrelated instruments' data availability. That
/// is kept as the default; `PairwiseDrop` retains partial rows and lets
/// each downstream consumer align per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentPolicy {
    /// Drop rows with a missing return in any column (reference behavior)
    #[default]
    WholeTableDrop,
    /// Keep partial rows; consumers align per pair
    PairwiseDrop,
}

impl FromStr for AlignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whole-table" | "whole-table-drop" => Ok(AlignmentPolicy::WholeTableDrop),
            "pairwise" | "pairwise-drop" => Ok(AlignmentPolicy::PairwiseDrop),
            other => Err(format!(
                "unknown alignment policy '{other}' (expected 'whole-table' or 'pairwise')"
            )),
        }
    }
}

/// Fractional returns per instrument on the shared bucket grid
#[derive(Debug, Clone)]
pub struct ReturnsTable {
    /// Bucket times of the retained rows, ascending
    pub timestamps: Vec<DateTime<Utc>>,
    /// Instrument identifiers in discovery order
    pub symbols: Vec<String>,
    /// One column per symbol, parallel to `timestamps`
    pub columns: Vec<Vec<Option<f64>>>,
}

impl ReturnsTable {
    /// Number of retained rows
    pub fn height(&self) -> usize {
        self.timestamps.len()
    }

    /// Number of instrument columns
    pub fn width(&self) -> usize {
        self.symbols.len()
    }

    /// Column index for a symbol, if present
    pub fn column_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Rows where both columns hold a defined return
    pub fn pair_rows(&self, i: usize, j: usize) -> Vec<(f64, f64)> {
        self.columns[i]
            .iter()
            .zip(self.columns[j].iter())
            .filter_map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some((*a, *b)),
                _ => None,
            })
            .collect()
    }
}

/// Derive the returns table: `ret[t] = price[t] / price[t-1] - 1`
///
/// A return is undefined when either price is missing or the division is
/// not finite. Under `WholeTableDrop`, rows with any undefined value are
/// removed entirely; every retained cell is then defined.
pub fn compute_returns(prices: &AlignedPriceTable, policy: AlignmentPolicy) -> ReturnsTable {
    let height = prices.height();

    let columns: Vec<Vec<Option<f64>>> = prices
        .columns
        .iter()
        .map(|column| {
            let mut returns = Vec::with_capacity(height);
            for t in 0..height {
                let value = if t == 0 {
                    None
                } else {
                    match (column[t], column[t - 1]) {
                        (Some(current), Some(previous)) => {
                            let r = current / previous - 1.0;
                            r.is_finite().then_some(r)
                        }
                        _ => None,
                    }
                };
                returns.push(value);
            }
            returns
        })
        .collect();

    let table = ReturnsTable {
        timestamps: prices.timestamps.clone(),
        symbols: prices.symbols.clone(),
        columns,
    };

    match policy {
        AlignmentPolicy::PairwiseDrop => table,
        AlignmentPolicy::WholeTableDrop => drop_incomplete_rows(table),
    }
}

fn drop_incomplete_rows(table: ReturnsTable) -> ReturnsTable {
    let keep: Vec<usize> = (0..table.height())
        .filter(|&t| table.columns.iter().all(|column| column[t].is_some()))
        .collect();

    debug!(
        before = table.height(),
        after = keep.len(),
        "Dropped rows with any undefined return"
    );

    ReturnsTable {
        timestamps: keep.iter().map(|&t| table.timestamps[t]).collect(),
        symbols: table.symbols.clone(),
        columns: table
            .columns
            .iter()
            .map(|column| keep.iter().map(|&t| column[t]).collect())
            .collect(),
    }
}
