use crate::coingecko::{MarketQuery, DEFAULT_ASSET_COUNT, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Seconds between the end of one cycle and the start of the next
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

pub const DEFAULT_WORKBOOK_PATH: &str = "crypto_data_live.xlsx";
pub const DEFAULT_REPORT_PATH: &str = "crypto_analysis_report.txt";
pub const DEFAULT_HTML_REPORT_PATH: &str = "Crypto_Analysis_Report.html";

const MIN_TIMEOUT_SECS: u64 = 10;
const MAX_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub coingecko: CoinGeckoConfig,
    pub market: MarketConfig,
    pub output: OutputConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub asset_count: u32,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub workbook_path: PathBuf,
    pub report_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub refresh_interval_secs: u64,
    pub report_policy: ReportPolicy,
}

/// When the plain-text report is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportPolicy {
    Never,
    /// Only on the first successful cycle
    #[default]
    First,
    Every,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            timeout_secs: 20,
            user_agent: concat!("crypto-tracker/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            asset_count: DEFAULT_ASSET_COUNT,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            report_policy: ReportPolicy::First,
        }
    }
}

impl TrackerConfig {
    pub async fn load_from_file(path: &Path) -> eyre::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load `tracker.json` from `config_dir`, falling back to defaults
    pub async fn load_or_default(config_dir: &Path) -> eyre::Result<Self> {
        let path = config_dir.join("tracker.json");
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "Loading config");
            Self::load_from_file(&path).await
        } else {
            tracing::debug!(path = %path.display(), "tracker.json not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = std::env::var("TRACKER_REFRESH_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.schedule.refresh_interval_secs = secs;
        }
        if let Ok(path) = std::env::var("TRACKER_WORKBOOK_PATH") {
            self.output.workbook_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("TRACKER_REPORT_PATH") {
            self.output.report_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("COINGECKO_BASE_URL") {
            self.coingecko.base_url = url;
        }
        self
    }

    /// Check values and build the market query
    pub fn validate(&mut self) -> eyre::Result<MarketQuery> {
        if self.schedule.refresh_interval_secs == 0 {
            eyre::bail!("refresh_interval_secs must be greater than 0");
        }

        let clamped = self.coingecko.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        if clamped != self.coingecko.timeout_secs {
            tracing::warn!(
                requested = self.coingecko.timeout_secs,
                using = clamped,
                "Request timeout out of range"
            );
            self.coingecko.timeout_secs = clamped;
        }

        Ok(MarketQuery::new(self.market.asset_count, &self.market.currency)?)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.refresh_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.schedule.refresh_interval_secs, 300);
        assert_eq!(config.schedule.report_policy, ReportPolicy::First);
        assert_eq!(config.market.asset_count, 50);
        assert_eq!(config.market.currency, "usd");
        assert_eq!(config.output.workbook_path, PathBuf::from("crypto_data_live.xlsx"));
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "schedule": { "refresh_interval_secs": 60, "report_policy": "every" } }"#;
        let config: TrackerConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.schedule.refresh_interval_secs, 60);
        assert_eq!(config.schedule.report_policy, ReportPolicy::Every);
        assert_eq!(config.coingecko.timeout_secs, 20);
        assert_eq!(config.output.report_path, PathBuf::from(DEFAULT_REPORT_PATH));
    }

    #[test]
    fn test_validate() {
        let mut config = TrackerConfig::default();
        config.coingecko.timeout_secs = 90;
        let query = config.validate().unwrap();
        assert_eq!(config.coingecko.timeout_secs, 30);
        assert_eq!(query.count(), 50);

        let mut config = TrackerConfig::default();
        config.market.asset_count = 500;
        assert!(config.validate().is_err());

        let mut config = TrackerConfig::default();
        config.schedule.refresh_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_or_default(dir.path()).await.unwrap();
        assert_eq!(config.schedule.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tracker.json"),
            r#"{ "market": { "asset_count": 20, "currency": "eur" } }"#,
        )
        .unwrap();

        let config = TrackerConfig::load_or_default(dir.path()).await.unwrap();
        assert_eq!(config.market.asset_count, 20);
        assert_eq!(config.market.currency, "eur");
    }
}
