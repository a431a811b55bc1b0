//! Configuration for the correlation and lead-lag scan pipeline

use serde::{Deserialize, Serialize};

use crate::scan::returns::AlignmentPolicy;

/// Configuration for a scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Name of the timestamp column in input files
    #[serde(default = "default_time_column")]
    pub time_column: String,

    /// Name of the close-price column in input files
    #[serde(default = "default_price_column")]
    pub price_column: String,

    /// Resampling bucket width in minutes
    #[serde(default = "default_bucket_minutes")]
    pub bucket_minutes: u64,

    /// Row-drop policy applied when deriving returns
    #[serde(default)]
    pub alignment: AlignmentPolicy,

    /// Absolute-correlation threshold for the "highly correlated" listing
    #[serde(default = "default_high_correlation")]
    pub high_correlation_threshold: f64,

    /// Number of ranked pairs shown in the matrix report
    #[serde(default = "default_top_ranked")]
    pub top_ranked: usize,

    /// Number of top-ranked pairs fed to the lead-lag analyzer
    #[serde(default = "default_top_pairs")]
    pub top_pairs: usize,

    /// Maximum lag offset (in buckets) tested in each direction
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,

    /// Minimum pair-aligned rows required before any lag test runs
    #[serde(default = "default_min_pair_rows")]
    pub min_pair_rows: usize,

    /// A lag test runs only with strictly more than this many samples
    #[serde(default = "default_min_lag_samples")]
    pub min_lag_samples: usize,

    /// Minimum rows remaining after the one-step shift for accuracy
    #[serde(default = "default_min_direction_rows")]
    pub min_direction_rows: usize,

    /// Significance level for lead-lag p-values
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,

    /// Minimum absolute correlation for a lag result to count as significant
    #[serde(default = "default_min_significant_correlation")]
    pub min_significant_correlation: f64,

    /// Number of significant results surfaced per pair
    #[serde(default = "default_top_results")]
    pub top_results: usize,
}

// Default value functions for serde
fn default_time_column() -> String {
    "date".to_string()
}
fn default_price_column() -> String {
    "close".to_string()
}
fn default_bucket_minutes() -> u64 {
    5
}
fn default_high_correlation() -> f64 {
    0.7
}
fn default_top_ranked() -> usize {
    10
}
fn default_top_pairs() -> usize {
    6
}
fn default_max_lag() -> usize {
    5
}
fn default_min_pair_rows() -> usize {
    50
}
fn default_min_lag_samples() -> usize {
    20
}
fn default_min_direction_rows() -> usize {
    30
}
fn default_significance_level() -> f64 {
    0.05
}
fn default_min_significant_correlation() -> f64 {
    0.1
}
fn default_top_results() -> usize {
    3
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            time_column: default_time_column(),
            price_column: default_price_column(),
            bucket_minutes: default_bucket_minutes(),
            alignment: AlignmentPolicy::default(),
            high_correlation_threshold: default_high_correlation(),
            top_ranked: default_top_ranked(),
            top_pairs: default_top_pairs(),
            max_lag: default_max_lag(),
            min_pair_rows: default_min_pair_rows(),
            min_lag_samples: default_min_lag_samples(),
            min_direction_rows: default_min_direction_rows(),
            significance_level: default_significance_level(),
            min_significant_correlation: default_min_significant_correlation(),
            top_results: default_top_results(),
        }
    }
}

impl ScanConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.time_column.trim().is_empty() {
            return Err("time_column cannot be empty".to_string());
        }
        if self.price_column.trim().is_empty() {
            return Err("price_column cannot be empty".to_string());
        }
        if self.bucket_minutes == 0 {
            return Err("bucket_minutes must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.high_correlation_threshold) {
            return Err(format!(
                "high_correlation_threshold must be between 0.0 and 1.0, got {}",
                self.high_correlation_threshold
            ));
        }
        if self.top_pairs == 0 {
            return Err("top_pairs must be at least 1".to_string());
        }
        if self.max_lag == 0 {
            return Err("max_lag must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.significance_level) || self.significance_level == 0.0 {
            return Err(format!(
                "significance_level must be in (0.0, 1.0), got {}",
                self.significance_level
            ));
        }
        if !(0.0..=1.0).contains(&self.min_significant_correlation) {
            return Err(format!(
                "min_significant_correlation must be between 0.0 and 1.0, got {}",
                self.min_significant_correlation
            ));
        }
        if self.min_pair_rows < 3 {
            return Err("min_pair_rows must be at least 3".to_string());
        }
        if self.min_lag_samples < 3 {
            return Err("min_lag_samples must be at least 3".to_string());
        }
        Ok(())
    }
}
