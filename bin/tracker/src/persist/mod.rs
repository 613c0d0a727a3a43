//! Spreadsheet and report output for one cycle.
//!
//! Every write renders the full artifact in memory first and then replaces
//! the target file in one step, so a failed write leaves the previous
//! content on disk.

mod atomic;
mod chart;
mod html;
mod report;
mod workbook;

pub use atomic::{lock_file_candidates, write_atomic};
#[cfg(test)]
pub(crate) use atomic::fixtures as test_fixtures;
pub use html::render_html_report;
pub use report::render_text_report;
pub use workbook::{data_headers, render_workbook, ANALYSIS_SHEET, DATA_SHEET, TIMESTAMP_FORMAT};

use crate::config::OutputConfig;
use crate::errors::WriteError;
use common::{AssetTable, SummaryStats};
use std::path::{Path, PathBuf};

/// Writes cycle output to fixed paths, overwriting previous content
#[derive(Debug, Clone)]
pub struct Persister {
    workbook_path: PathBuf,
    report_path: PathBuf,
}

impl Persister {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            workbook_path: config.workbook_path.clone(),
            report_path: config.report_path.clone(),
        }
    }

    pub fn workbook_path(&self) -> &Path {
        &self.workbook_path
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Replace the spreadsheet with the "Live Crypto Data" and "Analysis" sheets
    pub async fn write_workbook(&self, table: &AssetTable, stats: &SummaryStats) -> Result<(), WriteError> {
        let bytes = render_workbook(table, stats)?;
        write_atomic(&self.workbook_path, &bytes).await?;

        tracing::info!(
            path = %self.workbook_path.display(),
            assets = table.len(),
            "Workbook updated"
        );
        Ok(())
    }

    /// Replace the plain-text analysis report
    pub async fn write_report(&self, table: &AssetTable, stats: &SummaryStats) -> Result<(), WriteError> {
        let report = render_text_report(table, stats);
        write_atomic(&self.report_path, report.as_bytes()).await?;

        tracing::info!(path = %self.report_path.display(), "Analysis report generated");
        Ok(())
    }
}
