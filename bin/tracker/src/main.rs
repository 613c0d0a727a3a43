use clap::Parser;
use eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracker::coingecko::CoinGeckoClient;
use tracker::config::{ReportPolicy, TrackerConfig};
use tracker::persist::Persister;
use tracker::scheduler::{CycleOutcome, TrackerLoop, TrackerLoopConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration directory
    #[arg(long, default_value = "./configs/dev")]
    config_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// When to write the text report (overrides tracker.json)
    #[arg(long, value_enum)]
    report: Option<ReportPolicy>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cryptocurrency Live Tracker");

    let config_dir = PathBuf::from(&cli.config_path);
    let mut config = TrackerConfig::load_or_default(&config_dir)
        .await?
        .with_env_overrides();
    if let Some(policy) = cli.report {
        config.schedule.report_policy = policy;
    }
    let query = config.validate()?;

    tracing::info!(
        source = %config.coingecko.base_url,
        assets = query.count(),
        currency = query.currency(),
        interval_secs = config.schedule.refresh_interval_secs,
        "Config loaded"
    );

    let client = CoinGeckoClient::new(&config.coingecko)?;
    let persister = Persister::new(&config.output);

    tracing::info!(
        workbook = %persister.workbook_path().display(),
        report = %persister.report_path().display(),
        "Data will be updated every {} minutes. Press Ctrl+C to stop.",
        config.schedule.refresh_interval_secs / 60
    );

    let mut tracker = TrackerLoop::new(
        client,
        persister,
        query,
        TrackerLoopConfig {
            refresh_interval: config.refresh_interval(),
            report_policy: config.schedule.report_policy,
        },
    );

    if cli.once {
        return match tracker.run_cycle().await {
            CycleOutcome::Updated { assets, report_written } => {
                tracing::info!(assets, report_written, "Single cycle complete");
                Ok(())
            }
            CycleOutcome::Skipped(e) => Err(e.into()),
        };
    }

    let cancel_token = tracker.cancel_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                cancel_token.cancel();
            }
            Err(e) => tracing::error!(?e, "Failed to listen for Ctrl-C"),
        }
    });

    let cycles = tracker.run().await;

    tracing::info!(cycles, "Cryptocurrency Live Tracker Stopped");
    Ok(())
}
