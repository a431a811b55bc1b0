//! Report structures and console rendering
//!
//! The structs here are the pipeline's output contract; rendering them to
//! the console (and optionally to JSON via serde) is presentation glue.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::correlation::{CorrelationMatrix, CorrelationSummary, RankedPair};
use super::leadlag::{AnalysisOutcome, PairAnalysis};

/// An instrument excluded during loading
#[derive(Debug, Clone, Serialize)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: String,
}

/// Output of the correlation-matrix scan
#[derive(Debug, Serialize)]
pub struct MatrixReport {
    /// Accepted instrument identifiers in discovery order
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedInstrument>,
    /// First and last bucket time of the aligned table
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Aligned table shape before the returns row-drop
    pub rows: usize,
    pub columns: usize,
    pub high_correlation_threshold: f64,
    pub matrix: CorrelationMatrix,
    /// All pairs, descending absolute correlation
    pub ranked: Vec<RankedPair>,
    pub high_correlation: Vec<RankedPair>,
    pub summary: Option<CorrelationSummary>,
}

/// Output of the lead-lag scan
#[derive(Debug, Serialize)]
pub struct LeadLagReport {
    /// The ranked slice that was analyzed
    pub top_pairs: Vec<RankedPair>,
    pub analyses: Vec<PairAnalysis>,
    pub significance_level: f64,
}

/// Print the matrix report in the classic console layout
pub fn render_matrix(report: &MatrixReport, top_n: usize) {
    for skipped in &report.skipped {
        println!("Skipping {}: {}", skipped.symbol, skipped.reason);
    }

    println!("Number of instruments processed: {}", report.accepted.len());
    if let Some((start, end)) = report.time_range {
        println!("Date range: {start} to {end}");
    }
    println!(
        "Shape of combined data: ({}, {})",
        report.rows, report.columns
    );

    println!("\nCorrelation Matrix between Instruments:");
    print!("{:>12}", "");
    for symbol in &report.matrix.symbols {
        print!("{symbol:>12}");
    }
    println!();
    for (i, symbol) in report.matrix.symbols.iter().enumerate() {
        print!("{symbol:>12}");
        for value in &report.matrix.values[i] {
            print!("{value:>12.4}");
        }
        println!();
    }

    println!("\nTop {top_n} Most Correlated Pairs:");
    for (i, pair) in report.ranked.iter().take(top_n).enumerate() {
        println!(
            "{}. {} - {}: {:.4}",
            i + 1,
            pair.symbol_a,
            pair.symbol_b,
            pair.correlation
        );
    }

    if report.high_correlation.is_empty() {
        println!(
            "\nNo highly correlated pairs found (threshold: {})",
            report.high_correlation_threshold
        );
    } else {
        println!(
            "\nHighly Correlated Pairs (|correlation| > {}):",
            report.high_correlation_threshold
        );
        for pair in &report.high_correlation {
            println!(
                "{} - {}: {:.4}",
                pair.symbol_a, pair.symbol_b, pair.correlation
            );
        }
    }

    if let Some(summary) = &report.summary {
        println!("\nCorrelation Summary:");
        println!("Average correlation: {:.4}", summary.mean);
        println!("Maximum correlation: {:.4}", summary.max);
        println!("Minimum correlation: {:.4}", summary.min);
    }
}

/// Print the lead-lag report in the classic console layout
pub fn render_lead_lag(report: &LeadLagReport) {
    println!("Top {} Most Correlated Pairs:", report.top_pairs.len());
    for (i, pair) in report.top_pairs.iter().enumerate() {
        println!(
            "{}. {} - {}: {:.4}",
            i + 1,
            pair.symbol_a,
            pair.symbol_b,
            pair.correlation
        );
    }

    println!(
        "\nLead-Lag Analysis for Top {} Correlated Pairs:",
        report.top_pairs.len()
    );
    println!("{}", "=".repeat(60));

    for (i, analysis) in report.analyses.iter().enumerate() {
        println!(
            "\nPair {}: {} vs {} (Correlation: {:.4})",
            i + 1,
            analysis.pair.symbol_a,
            analysis.pair.symbol_b,
            analysis.pair.correlation
        );
        println!("{}", "-".repeat(50));

        match &analysis.outcome {
            AnalysisOutcome::InsufficientData { rows } => {
                println!("Insufficient data for lead-lag analysis ({rows} aligned rows)");
            }
            AnalysisOutcome::Analyzed { significant, .. } => {
                if significant.is_empty() {
                    println!("No significant lead-lag relationships found");
                } else {
                    println!(
                        "Significant Lead-Lag Relationships (p < {}):",
                        report.significance_level
                    );
                    for result in significant {
                        println!(
                            "  {} leads {} by {} periods:",
                            result.leader, result.follower, result.lag
                        );
                        println!("    Correlation: {:.4}", result.correlation);
                        println!("    P-value: {:.4}", result.p_value);
                        println!("    Sample size: {}", result.sample_size);
                        println!("    ** {} LEADING INDICATOR **", result.strength);
                        println!();
                    }
                }
            }
        }
    }

    println!("\nDirectional Predictive Accuracy Analysis:");
    println!("{}", "=".repeat(50));

    for (i, analysis) in report.analyses.iter().enumerate() {
        println!(
            "\nPair {}: {} vs {}",
            i + 1,
            analysis.pair.symbol_a,
            analysis.pair.symbol_b
        );

        if let AnalysisOutcome::Analyzed { accuracy, .. } = &analysis.outcome {
            for direction in accuracy {
                println!(
                    "  {} predicting {} direction: {:.3} ({:.1}%)",
                    direction.leader,
                    direction.follower,
                    direction.accuracy,
                    direction.accuracy * 100.0
                );
                if let Some(strength) = &direction.strength {
                    println!(
                        "    ** {} is a {} directional predictor of {} **",
                        direction.leader, strength, direction.follower
                    );
                }
            }
        }
    }
}
