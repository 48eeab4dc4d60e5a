//! `journalctl`-backed record source.

use super::{FetchOptions, JournalSource, SourceError};
use crate::domain::RawRecord;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default wall-clock budget for one journalctl invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches records by running the system `journalctl` binary with JSON
/// output, one record per line.
#[derive(Debug, Clone)]
pub struct JournalctlSource {
    binary: String,
    timeout: Duration,
}

impl Default for JournalctlSource {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalctlSource {
    pub fn new() -> Self {
        Self {
            binary: "journalctl".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the binary, for tests and unusual installs.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, options: FetchOptions) -> Result<Vec<RawRecord>, SourceError> {
        let mut command = Command::new(&self.binary);
        command
            .args(cli_args(&options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timeout drops the future; the child must not outlive it
            .kill_on_drop(true);

        tracing::debug!(binary = %self.binary, ?options, "Fetching journal records");

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| SourceError::Timeout(self.timeout))??;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout)?;
        let records: Vec<RawRecord> = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(RawRecord::new)
            .collect();

        tracing::info!(records = records.len(), "Journal fetch complete");
        Ok(records)
    }
}

impl JournalSource for JournalctlSource {
    fn fetch(
        &self,
        options: FetchOptions,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawRecord>, SourceError>> + Send + '_>> {
        Box::pin(self.run(options))
    }
}

fn cli_args(options: &FetchOptions) -> Vec<String> {
    let mut args = vec!["--output=json".to_string(), "--no-pager".to_string()];
    if let Some(limit) = options.limit {
        args.push("-n".to_string());
        args.push(limit.to_string());
    }
    if let Some(since) = &options.since {
        args.push("--since".to_string());
        args.push(since.clone());
    }
    if let Some(until) = &options.until {
        args.push("--until".to_string());
        args.push(until.clone());
    }
    args
}
