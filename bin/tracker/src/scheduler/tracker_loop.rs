use crate::coingecko::{MarketQuery, MarketSource};
use crate::config::ReportPolicy;
use crate::errors::CycleError;
use crate::persist::Persister;
use chrono::Local;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Tracker loop configuration
#[derive(Debug, Clone)]
pub struct TrackerLoopConfig {
    /// Sleep after each finished cycle; the real period is this plus cycle time
    pub refresh_interval: Duration,
    pub report_policy: ReportPolicy,
}

impl Default for TrackerLoopConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(crate::config::DEFAULT_REFRESH_INTERVAL_SECS),
            report_policy: ReportPolicy::First,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Running,
    Stopped,
}

/// Result of one fetch → analyze → persist cycle
#[derive(Debug)]
pub enum CycleOutcome {
    Updated { assets: usize, report_written: bool },
    Skipped(CycleError),
}

impl CycleOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, CycleOutcome::Updated { .. })
    }
}

/// Periodic market tracker
///
/// Cycles run strictly one after another on the calling task. Cancellation
/// is observed between cycles and during the sleep; an in-flight fetch or
/// write always runs to completion.
pub struct TrackerLoop<S: MarketSource> {
    source: S,
    persister: Persister,
    query: MarketQuery,
    config: TrackerLoopConfig,
    cancel_token: CancellationToken,
    state: TrackerState,
    cycles: u64,
    report_written: bool,
}

impl<S: MarketSource> TrackerLoop<S> {
    pub fn new(source: S, persister: Persister, query: MarketQuery, config: TrackerLoopConfig) -> Self {
        Self {
            source,
            persister,
            query,
            config,
            cancel_token: CancellationToken::new(),
            state: TrackerState::Running,
            cycles: 0,
            report_written: false,
        }
    }

    /// Get cancellation token for graceful shutdown
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run cycles until the cancel token fires; returns the number of cycles run
    pub async fn run(&mut self) -> u64 {
        tracing::info!(
            source = self.source.name(),
            assets = self.query.count(),
            currency = self.query.currency(),
            interval_secs = self.config.refresh_interval.as_secs(),
            report = ?self.config.report_policy,
            "Starting tracker loop"
        );

        while !self.cancel_token.is_cancelled() {
            let outcome = self.run_cycle().await;
            if self.cancel_token.is_cancelled() {
                break;
            }

            let interval_secs = self.config.refresh_interval.as_secs();
            if outcome.is_updated() {
                tracing::info!(interval_secs, "Data updated successfully, waiting for next update");
            } else {
                tracing::warn!(interval_secs, "Cycle skipped, will retry on next update");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.refresh_interval) => {}
                _ = self.cancel_token.cancelled() => {}
            }
        }

        self.state = TrackerState::Stopped;
        tracing::info!(cycles = self.cycles, "Tracker loop stopped");
        self.cycles
    }

    /// Execute a single cycle; errors are logged and folded into the outcome
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        let cycle = self.cycles;
        let start = Instant::now();

        tracing::info!(cycle, at = %Local::now().format("%Y-%m-%d %H:%M:%S"), "Update #{}", cycle);

        match self.execute().await {
            Ok((assets, report_written)) => {
                tracing::debug!(cycle, elapsed_ms = start.elapsed().as_millis() as u64, "Cycle complete");
                CycleOutcome::Updated {
                    assets,
                    report_written,
                }
            }
            Err(error) => {
                tracing::error!(cycle, stage = error.stage(), %error, "Cycle failed");
                CycleOutcome::Skipped(error)
            }
        }
    }

    async fn execute(&mut self) -> Result<(usize, bool), CycleError> {
        let table = self.source.fetch_markets(&self.query).await?;
        let stats = common::analyze(&table);

        tracing::debug!(
            assets = table.len(),
            total_market_cap = stats.total_market_cap,
            average_price = ?stats.average_price,
            "Analysis complete"
        );

        self.persister.write_workbook(&table, &stats).await?;

        let write_report = match self.config.report_policy {
            ReportPolicy::Never => false,
            ReportPolicy::First => !self.report_written,
            ReportPolicy::Every => true,
        };
        if write_report {
            self.persister.write_report(&table, &stats).await?;
            self.report_written = true;
        }

        Ok((table.len(), write_report))
    }
}
