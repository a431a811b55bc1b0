//! Resampler/Aligner
//!
//! Buckets each instrument's observations into fixed-width intervals
//! (last observation per bucket), joins all instruments onto the union
//! time grid, and forward-fills interior gaps. Leading gaps before an
//! instrument's first observation stay undefined.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::loader::RawSeries;

/// All instruments joined onto one common ordered bucket grid
#[derive(Debug, Clone)]
pub struct AlignedPriceTable {
    /// Bucket start times, ascending
    pub timestamps: Vec<DateTime<Utc>>,
    /// Instrument identifiers in discovery order
    pub symbols: Vec<String>,
    /// One column per symbol, parallel to `timestamps`
    pub columns: Vec<Vec<Option<f64>>>,
}

impl AlignedPriceTable {
    /// Number of bucket rows
    pub fn height(&self) -> usize {
        self.timestamps.len()
    }

    /// Number of instrument columns
    pub fn width(&self) -> usize {
        self.symbols.len()
    }

    /// First and last bucket time, if any rows exist
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        }
    }
}

/// Floor a timestamp to the start of its bucket
pub fn bucket_floor(ts: DateTime<Utc>, bucket_secs: i64) -> i64 {
    let t = ts.timestamp();
    t - t.rem_euclid(bucket_secs)
}

/// Bucket one series: chronologically-last observation per bucket
///
/// The sort is stable, so among observations sharing a timestamp the
/// later input row wins, matching the loader's file order.
fn resample_series(series: &RawSeries, bucket_secs: i64) -> BTreeMap<i64, f64> {
    let mut rows = series.rows.clone();
    rows.sort_by_key(|(ts, _)| *ts);

    let mut buckets = BTreeMap::new();
    for (ts, price) in rows {
        buckets.insert(bucket_floor(ts, bucket_secs), price);
    }
    buckets
}

/// Forward-fill a column: each gap takes the most recent preceding value
///
/// Never back-fills and never overwrites a defined value; a leading run
/// with no prior value stays undefined.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut filled = Vec::with_capacity(values.len());
    let mut last = None;
    for value in values {
        if value.is_some() {
            last = *value;
        }
        filled.push(last);
    }
    filled
}

/// Resample and align every surviving instrument onto the union grid
///
/// Each series contributes a contiguous bucket range from its first to its
/// last observation; the grid is the sorted union of those ranges.
pub fn align(series: &[RawSeries], bucket_minutes: u64) -> AlignedPriceTable {
    let bucket_secs = bucket_minutes as i64 * 60;

    let resampled: Vec<BTreeMap<i64, f64>> = series
        .iter()
        .map(|s| resample_series(s, bucket_secs))
        .collect();

    let mut grid = BTreeSet::new();
    for buckets in &resampled {
        if let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) {
            let mut t = first;
            while t <= last {
                grid.insert(t);
                t += bucket_secs;
            }
        }
    }

    let mut timestamps = Vec::with_capacity(grid.len());
    let mut grid_secs = Vec::with_capacity(grid.len());
    for &t in &grid {
        if let Some(ts) = DateTime::from_timestamp(t, 0) {
            timestamps.push(ts);
            grid_secs.push(t);
        }
    }

    let columns: Vec<Vec<Option<f64>>> = resampled
        .iter()
        .map(|buckets| {
            let reindexed: Vec<Option<f64>> = grid_secs
                .iter()
                .map(|t| buckets.get(t).copied())
                .collect();
            forward_fill(&reindexed)
        })
        .collect();

    debug!(
        instruments = series.len(),
        buckets = timestamps.len(),
        bucket_minutes,
        "Aligned price table built"
    );

    AlignedPriceTable {
        timestamps,
        symbols: series.iter().map(|s| s.symbol.clone()).collect(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap() + chrono::Duration::minutes(minute)
    }

    fn series(symbol: &str, rows: Vec<(DateTime<Utc>, f64)>) -> RawSeries {
        RawSeries {
            symbol: symbol.to_string(),
            rows,
        }
    }

    #[test]
    fn test_bucket_floor() {
        let t = ts(7); // 09:07
        let floor = bucket_floor(t, 300);
        assert_eq!(floor, ts(5).timestamp());
    }

    #[test]
    fn test_last_observation_in_bucket_wins() {
        let s = series(
            "a",
            vec![(ts(1), 10.0), (ts(4), 11.0), (ts(3), 12.0), (ts(6), 13.0)],
        );
        let table = align(&[s], 5);
        // 09:00 bucket holds the 09:04 observation, 09:05 bucket the 09:06 one
        assert_eq!(table.height(), 2);
        assert_eq!(table.columns[0], vec![Some(11.0), Some(13.0)]);
    }

    #[test]
    fn test_duplicate_timestamp_later_row_wins() {
        let s = series("a", vec![(ts(1), 10.0), (ts(1), 20.0)]);
        let table = align(&[s], 5);
        assert_eq!(table.columns[0], vec![Some(20.0)]);
    }

    #[test]
    fn test_resampling_idempotent_on_bucketed_series() {
        // Already on 5-minute boundaries, gap-free
        let values = [100.0, 101.0, 99.5, 102.0];
        let rows: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (ts(5 * i as i64), v))
            .collect();
        let s = series("a", rows);

        let table = align(&[s.clone()], 5);
        assert_eq!(table.height(), values.len());
        let round_tripped: Vec<_> = table.columns[0].iter().map(|v| v.unwrap()).collect();
        assert_eq!(round_tripped, values);

        // Feeding the aligned output back through changes nothing
        let again = align(
            &[series(
                "a",
                table
                    .timestamps
                    .iter()
                    .zip(round_tripped.iter())
                    .map(|(t, v)| (*t, *v))
                    .collect(),
            )],
            5,
        );
        assert_eq!(again.columns[0], table.columns[0]);
        assert_eq!(again.timestamps, table.timestamps);
    }

    #[test]
    fn test_forward_fill_interior_gap() {
        let filled = forward_fill(&[Some(1.0), None, None, Some(2.0), None]);
        assert_eq!(
            filled,
            vec![Some(1.0), Some(1.0), Some(1.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn test_forward_fill_never_backfills() {
        let filled = forward_fill(&[None, None, Some(3.0), None]);
        assert_eq!(filled, vec![None, None, Some(3.0), Some(3.0)]);
    }

    #[test]
    fn test_forward_fill_never_overwrites() {
        let original = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(forward_fill(&original), original.to_vec());
    }

    #[test]
    fn test_union_grid_and_leading_gap() {
        // "a" starts at 09:00, "b" starts at 09:10 and has an interior gap
        let a = series("a", vec![(ts(0), 1.0), (ts(5), 2.0), (ts(10), 3.0), (ts(15), 4.0)]);
        let b = series("b", vec![(ts(10), 50.0), (ts(20), 51.0)]);

        let table = align(&[a, b], 5);
        assert_eq!(table.height(), 5); // 09:00 .. 09:20
        assert_eq!(table.symbols, vec!["a".to_string(), "b".to_string()]);

        // "a" forward-fills past its last observation onto the union grid
        assert_eq!(
            table.columns[0],
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(4.0)]
        );
        // "b" keeps its leading gap, fills its interior one
        assert_eq!(
            table.columns[1],
            vec![None, None, Some(50.0), Some(50.0), Some(51.0)]
        );
    }

    #[test]
    fn test_empty_input() {
        let table = align(&[], 5);
        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), 0);
        assert!(table.time_range().is_none());
    }
}
