use crate::errors::FetchError;
use common::AssetRecord;
use serde::Deserialize;

pub const DEFAULT_ASSET_COUNT: u32 = 50;
pub const DEFAULT_CURRENCY: &str = "usd";

/// Provider page-size ceiling for /coins/markets
pub const MAX_PAGE_SIZE: u32 = 250;

/// Quote currencies accepted by /coins/markets `vs_currency`
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "usd", "eur", "gbp", "jpy", "aud", "cad", "chf", "cny", "hkd", "inr", "krw", "sgd", "nzd",
    "sek", "nok", "dkk", "pln", "czk", "huf", "brl", "mxn", "ars", "clp", "zar", "try", "rub",
    "uah", "ils", "aed", "sar", "kwd", "bhd", "thb", "idr", "myr", "php", "vnd", "twd", "pkr",
    "bdt", "lkr", "ngn", "gel", "btc", "eth", "ltc", "bch", "bnb", "xrp", "xlm", "dot", "link",
    "sats", "bits", "xau", "xag", "xdr",
];

/// Validated parameters for one markets request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketQuery {
    count: u32,
    currency: String,
}

impl MarketQuery {
    pub fn new(count: u32, currency: &str) -> Result<Self, FetchError> {
        if count == 0 || count > MAX_PAGE_SIZE {
            return Err(FetchError::InvalidQuery(format!(
                "asset count must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, count
            )));
        }

        let currency = currency.trim().to_lowercase();
        if !SUPPORTED_CURRENCIES.contains(&currency.as_str()) {
            return Err(FetchError::InvalidQuery(format!(
                "unsupported currency '{}'",
                currency
            )));
        }

        Ok(Self { count, currency })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            count: DEFAULT_ASSET_COUNT,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// One element of the /coins/markets response array
///
/// Only the fields the tracker uses; numeric fields are nullable upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

impl MarketEntry {
    /// Convert to a record at the given 1-based table position
    pub fn into_record(self, rank: u32) -> Result<AssetRecord, FetchError> {
        let id = self.id.as_deref().unwrap_or("<unknown>");
        let symbol = self
            .symbol
            .ok_or_else(|| FetchError::Parse(format!("entry {} ({}) has no symbol", rank, id)))?;
        let name = self
            .name
            .ok_or_else(|| FetchError::Parse(format!("entry {} ({}) has no name", rank, id)))?;

        if self.current_price.is_none() || self.market_cap.is_none() {
            tracing::debug!(symbol = %symbol, "Missing price or market cap, defaulting to 0");
        }

        Ok(AssetRecord {
            rank,
            symbol: symbol.to_uppercase(),
            name,
            current_price: self.current_price.unwrap_or(0.0),
            market_cap: self.market_cap.unwrap_or(0.0),
            volume_24h: self.total_volume.unwrap_or(0.0),
            price_change_24h: self.price_change_percentage_24h.unwrap_or(0.0),
        })
    }
}

/// Parse a /coins/markets body into at most `limit` records
pub fn parse_markets(body: &str, limit: u32) -> Result<Vec<AssetRecord>, FetchError> {
    let entries: Vec<MarketEntry> = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("unexpected markets payload: {}", e)))?;

    entries
        .into_iter()
        .take(limit as usize)
        .enumerate()
        .map(|(idx, entry)| entry.into_record(idx as u32 + 1))
        .collect()
}
