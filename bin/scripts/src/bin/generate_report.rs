//! Market Report Script
//!
//! Fetches one CoinGecko snapshot and writes a standalone HTML report with
//! the market overview, the top 5 by market cap and the 24h gainers and
//! losers.

use clap::Parser;
use common::format::percent;
use common::MarketBreakdown;
use eyre::Result;
use std::path::PathBuf;
use tracing::{info, warn};

use tracker::coingecko::{CoinGeckoClient, MarketQuery};
use tracker::config::{TrackerConfig, DEFAULT_HTML_REPORT_PATH};
use tracker::persist::{render_html_report, write_atomic};

/// CLI arguments for the script
#[derive(Parser, Debug)]
#[command(name = "generate-report")]
#[command(about = "Fetch the current market snapshot and write an HTML analysis report")]
struct Args {
    /// Output HTML file
    #[arg(short, long, default_value = DEFAULT_HTML_REPORT_PATH)]
    output: PathBuf,

    /// Path to configuration directory (tracker.json)
    #[arg(long, default_value = "./configs/dev")]
    config_path: PathBuf,

    /// Number of assets to include (defaults to tracker.json / 50)
    #[arg(short, long)]
    count: Option<u32>,

    /// Quote currency (defaults to tracker.json / usd)
    #[arg(long)]
    currency: Option<String>,

    /// Print the report to stdout instead of writing the file
    #[arg(short, long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "generate_report=info,tracker=info".into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting market report generation");

    let mut config = TrackerConfig::load_or_default(&args.config_path)
        .await?
        .with_env_overrides();
    config.validate()?;

    let query = MarketQuery::new(
        args.count.unwrap_or(config.market.asset_count),
        args.currency.as_deref().unwrap_or(&config.market.currency),
    )?;

    let client = CoinGeckoClient::new(&config.coingecko)?;
    let table = client.fetch_markets(&query).await?;
    info!("Fetched {} assets from {}", table.len(), client.base_url());

    if table.is_empty() {
        warn!("Provider returned no assets, report will contain no data");
    }

    let stats = common::analyze(&table);
    let breakdown = MarketBreakdown::from_table(&table);
    info!(
        bitcoin_dominance = %percent(breakdown.bitcoin_dominance),
        median_price = ?breakdown.median_price,
        "Analysis complete"
    );

    let html = render_html_report(&table, &stats, &breakdown);

    if args.dry_run {
        println!("{}", html);
        info!("Dry run - report not written");
        return Ok(());
    }

    write_atomic(&args.output, html.as_bytes()).await?;
    info!("Report written to {}", args.output.display());

    Ok(())
}
