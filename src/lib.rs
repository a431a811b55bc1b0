//! PairScope: correlation and lead-lag scanner for per-instrument price
//! history files.

pub mod cli;
pub mod commands;
pub mod scan;
pub mod stats;
