//! Per-cycle summary statistics over an [`AssetTable`].
//!
//! Everything here is computed in `f64`. Rounding only happens at display
//! time (see [`crate::format`]): prices and percentages to 2 decimals,
//! market cap and volume to whole units.

use crate::asset::{AssetRecord, AssetTable};

/// Number of records kept in the market-cap leaderboard
pub const TOP_N: usize = 5;

/// Derived, read-only statistics for one fetch cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    /// Mean current price; `None` when the table is empty
    pub average_price: Option<f64>,
    pub total_market_cap: f64,
    pub total_volume: f64,
    /// Up to [`TOP_N`] records, market cap descending
    pub top_by_market_cap: Vec<AssetRecord>,
    pub max_change: Option<AssetRecord>,
    pub min_change: Option<AssetRecord>,
}

impl SummaryStats {
    pub fn has_data(&self) -> bool {
        self.average_price.is_some()
    }
}

/// Compute summary statistics for a table.
///
/// Ties are resolved by table position: the leaderboard uses a stable sort,
/// and the change extremes keep the first record holding the extreme value.
pub fn analyze(table: &AssetTable) -> SummaryStats {
    let records = &table.records;

    let average_price = if records.is_empty() {
        None
    } else {
        let sum: f64 = records.iter().map(|r| r.current_price).sum();
        Some(sum / records.len() as f64)
    };

    SummaryStats {
        average_price,
        total_market_cap: records.iter().map(|r| r.market_cap).sum(),
        total_volume: records.iter().map(|r| r.volume_24h).sum(),
        top_by_market_cap: top_by(records, TOP_N, |r| r.market_cap),
        max_change: first_extreme(records, |candidate, best| candidate > best),
        min_change: first_extreme(records, |candidate, best| candidate < best),
    }
}

/// Highest `n` records by `key`, descending, input order on ties
pub(crate) fn top_by<F>(records: &[AssetRecord], n: usize, key: F) -> Vec<AssetRecord>
where
    F: Fn(&AssetRecord) -> f64,
{
    let mut sorted: Vec<&AssetRecord> = records.iter().collect();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.into_iter().take(n).cloned().collect()
}

/// Lowest `n` records by `key`, ascending, input order on ties
pub(crate) fn bottom_by<F>(records: &[AssetRecord], n: usize, key: F) -> Vec<AssetRecord>
where
    F: Fn(&AssetRecord) -> f64,
{
    let mut sorted: Vec<&AssetRecord> = records.iter().collect();
    sorted.sort_by(|a, b| key(a).total_cmp(&key(b)));
    sorted.into_iter().take(n).cloned().collect()
}

fn first_extreme<F>(records: &[AssetRecord], replaces: F) -> Option<AssetRecord>
where
    F: Fn(f64, f64) -> bool,
{
    let mut best: Option<&AssetRecord> = None;
    for record in records {
        match best {
            Some(current) if !replaces(record.price_change_24h, current.price_change_24h) => {}
            _ => best = Some(record),
        }
    }
    best.cloned()
}
