use crate::asset::{AssetRecord, AssetTable};
use crate::summary::{bottom_by, top_by, TOP_N};

/// Extended statistics used by the HTML market report
#[derive(Debug, Clone, PartialEq)]
pub struct MarketBreakdown {
    pub top_by_volume: Vec<AssetRecord>,
    /// Largest 24h change first
    pub top_gainers: Vec<AssetRecord>,
    /// Smallest 24h change first
    pub top_losers: Vec<AssetRecord>,
    pub median_price: Option<f64>,
    /// Bitcoin share of the table's total market cap, in percent
    pub bitcoin_dominance: f64,
}

impl MarketBreakdown {
    pub fn from_table(table: &AssetTable) -> Self {
        let records = &table.records;

        Self {
            top_by_volume: top_by(records, TOP_N, |r| r.volume_24h),
            top_gainers: top_by(records, TOP_N, |r| r.price_change_24h),
            top_losers: bottom_by(records, TOP_N, |r| r.price_change_24h),
            median_price: median(records.iter().map(|r| r.current_price).collect()),
            bitcoin_dominance: bitcoin_dominance(records),
        }
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn bitcoin_dominance(records: &[AssetRecord]) -> f64 {
    let total: f64 = records.iter().map(|r| r.market_cap).sum();
    if total <= 0.0 {
        return 0.0;
    }
    records
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case("bitcoin"))
        .map(|btc| btc.market_cap / total * 100.0)
        .unwrap_or(0.0)
}
