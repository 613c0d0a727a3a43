//! Shared market model and pure analysis for the crypto tracker.

pub mod asset;
pub mod breakdown;
pub mod format;
pub mod summary;

pub use asset::{AssetRecord, AssetTable};
pub use breakdown::MarketBreakdown;
pub use summary::{analyze, SummaryStats};
