mod client;
mod types;

pub use client::CoinGeckoClient;
pub use types::{
    parse_markets, MarketEntry, MarketQuery, DEFAULT_ASSET_COUNT, DEFAULT_CURRENCY, MAX_PAGE_SIZE,
    SUPPORTED_CURRENCIES,
};

use crate::errors::FetchError;
use common::AssetTable;

/// Source of one market snapshot per call
#[async_trait::async_trait]
pub trait MarketSource: Send + Sync {
    /// Make a single fetch attempt for the given query
    async fn fetch_markets(&self, query: &MarketQuery) -> Result<AssetTable, FetchError>;

    /// Short identifier for logs
    fn name(&self) -> &str;
}
