use chrono::{DateTime, Utc};

/// Market snapshot of a single cryptocurrency for one fetch cycle
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    /// 1-based position in the provider's market-cap ordering
    pub rank: u32,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    /// 24h price change in percent (5.0 means +5%)
    pub price_change_24h: f64,
}

/// Ordered records of one fetch cycle, as returned by the data source
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTable {
    /// Lowercase quote currency code (e.g. "usd")
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<AssetRecord>,
}

impl AssetTable {
    pub fn new(currency: impl Into<String>, fetched_at: DateTime<Utc>, records: Vec<AssetRecord>) -> Self {
        Self {
            currency: currency.into().to_lowercase(),
            fetched_at,
            records,
        }
    }

    pub fn empty(currency: impl Into<String>) -> Self {
        Self::new(currency, Utc::now(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetRecord> {
        self.records.iter()
    }

    /// Currency label used in column headers, e.g. "USD"
    pub fn currency_label(&self) -> String {
        self.currency.to_uppercase()
    }
}

impl<'a> IntoIterator for &'a AssetTable {
    type Item = &'a AssetRecord;
    type IntoIter = std::slice::Iter<'a, AssetRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn record(rank: u32, name: &str, price: f64, cap: f64, volume: f64, change: f64) -> AssetRecord {
        AssetRecord {
            rank,
            symbol: name.chars().take(3).collect::<String>().to_uppercase(),
            name: name.to_string(),
            current_price: price,
            market_cap: cap,
            volume_24h: volume,
            price_change_24h: change,
        }
    }

    pub fn table(records: Vec<AssetRecord>) -> AssetTable {
        let fetched_at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        AssetTable::new("usd", fetched_at, records)
    }
}
