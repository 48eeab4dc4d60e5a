//! Log source abstraction.
//!
//! The engine only ever sees a materialized `Vec<RawRecord>`; everything
//! that blocks (process execution, timeouts) lives behind `JournalSource`.

pub mod journalctl;

use crate::domain::RawRecord;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

pub use journalctl::JournalctlSource;

/// Retrieval window passed to a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Newest-first line cap (`journalctl -n`); `None` means the source's
    /// own default applies.
    pub limit: Option<u64>,
    /// Passed through verbatim as `--since`.
    pub since: Option<String>,
    /// Passed through verbatim as `--until`.
    pub until: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to run journalctl: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("journalctl exited with {status}: {stderr}")]
    CommandFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("journalctl produced non-UTF-8 output: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of raw journald records.
///
/// This trait is dyn-compatible by using boxed futures instead of
/// `impl Future`, so the application and tests can swap implementations.
pub trait JournalSource: Send + Sync {
    fn fetch(
        &self,
        options: FetchOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + '_>>;
}
