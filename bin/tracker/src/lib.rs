//! Periodic cryptocurrency market tracker.
//!
//! Each cycle fetches the top assets by market cap from CoinGecko, computes
//! summary statistics and rewrites a two-sheet workbook (plus an optional
//! plain-text report) in place.

pub mod coingecko;
pub mod config;
pub mod errors;
pub mod persist;
pub mod scheduler;
