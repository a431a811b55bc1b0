//! Correlation and Lead-Lag Scan Pipeline
//!
//! Loads per-instrument CSV price files, resamples them onto a common
//! bucket grid, derives a returns table, ranks pairs by return
//! correlation, and tests the top pairs for lead-lag relationships.
//!
//! # Example
//!
//! ```ignore
//! use pairscope::scan::{self, ScanConfig};
//!
//! let config = ScanConfig::default();
//! let outcomes = scan::loader::load_dir(Path::new("data"), &config)?;
//! let data = scan::prepare(outcomes, &config)?;
//! let report = scan::pipeline::lead_lag_report(&data, &config);
//! ```

pub mod config;
pub mod correlation;
pub mod error;
pub mod leadlag;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod resample;
pub mod returns;

pub use config::ScanConfig;
pub use error::ScanError;
pub use loader::{LoadOutcome, RawSeries, SkipReason};
pub use pipeline::{prepare, PreparedData};
pub use returns::AlignmentPolicy;
