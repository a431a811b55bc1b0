//! Table Loader
//!
//! Reads per-instrument CSV files into [`RawSeries`] values. Every per-file
//! problem is converted into a typed [`SkipReason`] so that one malformed
//! file never aborts the batch; row-level parse failures drop the row only.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, warn};

use super::config::ScanConfig;
use super::error::ScanError;

/// One instrument's raw observations, unsorted, duplicates possible
#[derive(Debug, Clone)]
pub struct RawSeries {
    /// Instrument identifier (file stem of the source CSV)
    pub symbol: String,
    /// (timestamp, price) observations in file order
    pub rows: Vec<(DateTime<Utc>, f64)>,
}

/// Why an instrument file was excluded from the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Header lacks one or both required columns
    MissingColumns { missing: Vec<String> },
    /// No row survived timestamp/price parsing
    EmptyAfterCleaning,
    /// Unreadable or structurally broken file
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumns { missing } => {
                write!(f, "missing required column(s): {}", missing.join(", "))
            }
            SkipReason::EmptyAfterCleaning => {
                write!(f, "no valid rows after timestamp/price parsing")
            }
            SkipReason::Malformed(msg) => write!(f, "malformed file: {msg}"),
        }
    }
}

/// Per-file loading outcome
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// File yielded a usable series
    Loaded(RawSeries),
    /// File was skipped; the batch continues
    Skipped { symbol: String, reason: SkipReason },
}

/// Parse a timestamp permissively
///
/// Accepts RFC 3339, common date/datetime layouts, and integer epoch
/// seconds or milliseconds. Returns None for anything unparseable; callers
/// drop the row rather than failing the file.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    if let Ok(n) = s.parse::<i64>() {
        // Heuristic: values this large are epoch milliseconds
        return if n.abs() >= 100_000_000_000 {
            Utc.timestamp_millis_opt(n).single()
        } else {
            Utc.timestamp_opt(n, 0).single()
        };
    }

    None
}

/// Load one instrument file, converting any failure into a skip outcome
pub fn load_file(path: &Path, symbol: &str, config: &ScanConfig) -> LoadOutcome {
    match read_series(path, symbol, config) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(symbol, error = %e, "Error processing file, skipping instrument");
            LoadOutcome::Skipped {
                symbol: symbol.to_string(),
                reason: SkipReason::Malformed(e.to_string()),
            }
        }
    }
}

fn read_series(path: &Path, symbol: &str, config: &ScanConfig) -> Result<LoadOutcome, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    let time_idx = find(&config.time_column);
    let price_idx = find(&config.price_column);

    let (time_idx, price_idx) = match (time_idx, price_idx) {
        (Some(t), Some(p)) => (t, p),
        (t, p) => {
            let mut missing = Vec::new();
            if t.is_none() {
                missing.push(config.time_column.clone());
            }
            if p.is_none() {
                missing.push(config.price_column.clone());
            }
            warn!(symbol, missing = ?missing, "Skipping file: missing required columns");
            return Ok(LoadOutcome::Skipped {
                symbol: symbol.to_string(),
                reason: SkipReason::MissingColumns { missing },
            });
        }
    };

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record?;
        let time = record.get(time_idx).and_then(parse_timestamp);
        let price = record
            .get(price_idx)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite());

        match (time, price) {
            (Some(time), Some(price)) => rows.push((time, price)),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(symbol, dropped, "Dropped unparseable rows");
    }

    if rows.is_empty() {
        warn!(symbol, "Skipping file: no valid data after cleaning");
        return Ok(LoadOutcome::Skipped {
            symbol: symbol.to_string(),
            reason: SkipReason::EmptyAfterCleaning,
        });
    }

    debug!(symbol, rows = rows.len(), "Loaded instrument");
    Ok(LoadOutcome::Loaded(RawSeries {
        symbol: symbol.to_string(),
        rows,
    }))
}

/// Discover and load every `*.csv` file in a directory
///
/// Files are visited in sorted name order so instrument discovery order is
/// deterministic. The symbol is the file stem.
pub fn load_dir(dir: &Path, config: &ScanConfig) -> Result<Vec<LoadOutcome>, ScanError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let outcomes = paths
        .iter()
        .map(|path| {
            let symbol = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            load_file(path, &symbol, config)
        })
        .collect();

    Ok(outcomes)
}
