use super::types::{parse_markets, MarketQuery};
use super::MarketSource;
use crate::config::CoinGeckoConfig;
use crate::errors::FetchError;
use common::AssetTable;
use reqwest::Client;
use std::time::{Duration, Instant};

const MARKETS_ENDPOINT: &str = "/coins/markets";

/// Single-attempt client for the CoinGecko markets endpoint
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &CoinGeckoConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the top `query.count()` assets by market cap.
    ///
    /// One request, no retries. A 429 from the provider surfaces as
    /// `FetchError::Http { status: 429 }` like any other non-2xx status.
    pub async fn fetch_markets(&self, query: &MarketQuery) -> Result<AssetTable, FetchError> {
        let url = format!("{}{}", self.base_url, MARKETS_ENDPOINT);
        let per_page = query.count().to_string();
        let start = Instant::now();

        tracing::debug!(%url, currency = query.currency(), count = query.count(), "Fetching markets");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", query.currency()),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ])
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let fetched_at = chrono::Utc::now();
        let body = response.text().await.map_err(FetchError::Network)?;
        let records = parse_markets(&body, query.count())?;

        tracing::debug!(
            assets = records.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Fetched markets"
        );

        Ok(AssetTable::new(query.currency(), fetched_at, records))
    }
}

#[async_trait::async_trait]
impl MarketSource for CoinGeckoClient {
    async fn fetch_markets(&self, query: &MarketQuery) -> Result<AssetTable, FetchError> {
        CoinGeckoClient::fetch_markets(self, query).await
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
