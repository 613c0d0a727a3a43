//! Error types for a tracker cycle

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching market data
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid market query: {0}")]
    InvalidQuery(String),

    /// Connection failure or request timeout
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success HTTP response
    #[error("HTTP error {status}")]
    Http { status: u16 },

    /// Payload did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors raised while persisting a cycle's output
#[derive(Debug, Error)]
pub enum WriteError {
    /// Target is held open by another process (e.g. a spreadsheet viewer)
    #[error("{} is locked by another process{}", .path.display(), lock_hint(.lock_file))]
    Locked {
        path: PathBuf,
        /// Owner file that marked the target as open, if one was found
        lock_file: Option<PathBuf>,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

fn lock_hint(lock_file: &Option<PathBuf>) -> String {
    match lock_file {
        Some(lock) => format!(" (owner file {})", lock.display()),
        None => String::new(),
    }
}

/// Any error that aborts the persistence step of one cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl CycleError {
    /// Pipeline stage that failed, for log output
    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Write(_) => "persist",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(FetchError::Http { status: 429 }.to_string(), "HTTP error 429");
        assert_eq!(
            FetchError::Parse("expected array".to_string()).to_string(),
            "Parse error: expected array"
        );

        let locked = WriteError::Locked {
            path: PathBuf::from("crypto_data_live.xlsx"),
            lock_file: None,
        };
        assert_eq!(locked.to_string(), "crypto_data_live.xlsx is locked by another process");

        let owned = WriteError::Locked {
            path: PathBuf::from("crypto_data_live.xlsx"),
            lock_file: Some(PathBuf::from("~$ypto_data_live.xlsx")),
        };
        assert_eq!(
            owned.to_string(),
            "crypto_data_live.xlsx is locked by another process (owner file ~$ypto_data_live.xlsx)"
        );
    }

    #[test]
    fn test_cycle_error_stage() {
        let fetch: CycleError = FetchError::Http { status: 500 }.into();
        assert_eq!(fetch.stage(), "fetch");
        assert_eq!(fetch.to_string(), "HTTP error 500");

        let write: CycleError = WriteError::Locked {
            path: PathBuf::from("out.xlsx"),
            lock_file: None,
        }
        .into();
        assert_eq!(write.stage(), "persist");
    }
}
