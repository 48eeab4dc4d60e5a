use crate::domain::{Domain, Severity};
use crate::source::FetchOptions;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read config file: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Verbosity of the diagnostics on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Classify and aggregate journald records", long_about = None)]
pub struct Config {
    /// Newest-first line cap passed to journalctl
    #[arg(long, env = "JOURNAL_LIMIT", default_value = "10000")]
    pub limit: u64,

    /// Lower time bound, passed through to journalctl --since
    #[arg(long, env = "JOURNAL_SINCE")]
    pub since: Option<String>,

    /// Upper time bound, passed through to journalctl --until
    #[arg(long, env = "JOURNAL_UNTIL")]
    pub until: Option<String>,

    /// Fetch timeout in seconds
    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value = "30")]
    pub fetch_timeout_secs: u64,

    /// journalctl binary to invoke
    #[arg(long, env = "JOURNALCTL_BIN", default_value = "journalctl")]
    pub journalctl_bin: String,

    /// Shard the aggregation fold across CPU cores
    #[arg(long, env = "PARALLEL")]
    pub parallel: bool,

    /// TOML file extending the built-in domain table
    #[arg(long, env = "DOMAIN_TABLE")]
    pub domain_table: Option<PathBuf>,

    /// Log level for diagnostics on stderr
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Per-bucket totals and error rates
    Summary,
    /// Severity counts per bucket and domain
    Detailed {
        /// Restrict to one bucket label, e.g. Jun or Unknown
        #[arg(long)]
        bucket: Option<String>,
        /// Restrict to one domain, e.g. NETWORK
        #[arg(long, value_parser = parse_domain)]
        domain: Option<Domain>,
    },
    /// Per-domain totals across all buckets
    Domains,
    /// Error-rate anomaly scoring across buckets
    Anomalies,
    /// Keyword scan over the fetched batch
    Search {
        keyword: String,
        /// Exact severity to keep, e.g. ERROR
        #[arg(long, value_parser = parse_severity)]
        level: Option<Severity>,
    },
    /// First error-class records in the fetched batch
    Errors {
        /// Matches returned at most
        #[arg(long, default_value_t = crate::query::DEFAULT_ERROR_LIMIT)]
        limit: usize,
    },
}

/// Optional TOML layer; any field left out keeps its flag/default value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    limit: Option<u64>,
    since: Option<String>,
    until: Option<String>,
    fetch_timeout_secs: Option<u64>,
    journalctl_bin: Option<String>,
    parallel: Option<bool>,
    domain_table: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit: 10000,
            since: None,
            until: None,
            fetch_timeout_secs: 30,
            journalctl_bin: "journalctl".to_string(),
            parallel: false,
            domain_table: None,
            log_level: LogLevel::Info,
            config_file: None,
            command: Command::Summary,
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        if let Some(path) = config.config_file.clone() {
            config.apply_file(&path)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Fills fields still at their defaults from a TOML file. Flags and
    /// environment variables win over file values.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&raw)?;
        let defaults = Config::default();

        if self.limit == defaults.limit {
            if let Some(limit) = file.limit {
                self.limit = limit;
            }
        }
        if self.since.is_none() {
            self.since = file.since;
        }
        if self.until.is_none() {
            self.until = file.until;
        }
        if self.fetch_timeout_secs == defaults.fetch_timeout_secs {
            if let Some(secs) = file.fetch_timeout_secs {
                self.fetch_timeout_secs = secs;
            }
        }
        if self.journalctl_bin == defaults.journalctl_bin {
            if let Some(binary) = file.journalctl_bin {
                self.journalctl_bin = binary;
            }
        }
        if !self.parallel {
            if let Some(parallel) = file.parallel {
                self.parallel = parallel;
            }
        }
        if self.domain_table.is_none() {
            self.domain_table = file.domain_table;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::InvalidConfig(
                "limit must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "fetch timeout must be greater than 0".to_string(),
            ));
        }
        if self.journalctl_bin.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "journalctl binary must not be empty".to_string(),
            ));
        }
        if let Command::Errors { limit } = &self.command {
            if *limit == 0 {
                return Err(ConfigError::InvalidConfig(
                    "error listing limit must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Retrieval window handed to the journal source.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            limit: Some(self.limit),
            since: self.since.clone(),
            until: self.until.clone(),
        }
    }
}

fn parse_domain(raw: &str) -> Result<Domain, String> {
    Domain::from_name(raw)
        .ok_or_else(|| format!("unknown domain '{raw}' (expected e.g. KERNEL, NETWORK, MISC)"))
}

fn parse_severity(raw: &str) -> Result<Severity, String> {
    Severity::from_name(raw)
        .ok_or_else(|| format!("unknown severity '{raw}' (expected EMERGENCY through DEBUG)"))
}
