//! Statistical primitives shared by the scan pipeline.
//!
//! Pearson correlation over f64 slices, plus the two-sided significance
//! test used by the lead-lag analyzer.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Calculate Pearson correlation coefficient between two series
///
/// Returns a value in [-1.0, 1.0], or None if the inputs are mismatched,
/// too short, or produce a non-finite result.
///
/// # Mathematical Definition
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let n = a.len() as f64;
    let mean_a: f64 = a.iter().sum::<f64>() / n;
    let mean_b: f64 = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        // Degenerate series carry no linear signal
        return Some(0.0);
    }

    let correlation = covariance / (var_a.sqrt() * var_b.sqrt());

    if correlation.is_finite() {
        // Floating-point accumulation can push |r| a hair past 1.0
        Some(correlation.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Pearson correlation with its two-sided significance test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PearsonTest {
    /// Correlation coefficient in [-1.0, 1.0]
    pub correlation: f64,
    /// Two-sided p-value under the null hypothesis r = 0
    pub p_value: f64,
    /// Number of paired observations used
    pub sample_size: usize,
}

/// Run a two-sided Pearson significance test
///
/// The test statistic t = r·√(df / (1 - r²)) with df = n - 2 follows a
/// Student's t distribution under the null hypothesis of zero correlation.
/// Requires at least 3 paired observations; |r| = 1 yields p = 0 directly.
pub fn pearson_test(a: &[f64], b: &[f64]) -> Option<PearsonTest> {
    let correlation = pearson(a, b)?;
    let n = a.len();
    if n < 3 {
        return None;
    }

    let df = (n - 2) as f64;
    let denom = 1.0 - correlation * correlation;

    let p_value = if denom <= f64::EPSILON {
        0.0
    } else {
        let t = correlation * (df / denom).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
    };

    Some(PearsonTest {
        correlation,
        p_value,
        sample_size: n,
    })
}
