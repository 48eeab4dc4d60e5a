pub mod config;
pub mod logging;

pub use config::{Command, Config, ConfigError, LogLevel};

use crate::aggregate::Aggregator;
use crate::classify::DomainTable;
use crate::query::SearchOptions;
use crate::session::AnalysisSession;
use crate::source::{JournalSource, JournalctlSource};
use anyhow::Context;
use std::process;
use tracing::{error, info, warn};

/// One-shot application: fetch a batch, run the requested query, print one
/// JSON document to stdout.
pub struct App {
    config: Config,
    source: Box<dyn JournalSource>,
    aggregator: Aggregator,
}

impl App {
    pub fn from_args<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args(args)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let table = match &config.domain_table {
            Some(path) => DomainTable::from_toml_file(path)
                .with_context(|| format!("loading domain table from {}", path.display()))?,
            None => DomainTable::builtin(),
        };
        let aggregator = Aggregator::new(table).with_parallel(config.parallel);
        let source = JournalctlSource::new()
            .with_binary(config.journalctl_bin.clone())
            .with_timeout(config.fetch_timeout());

        Ok(Self {
            config,
            source: Box::new(source),
            aggregator,
        })
    }

    /// Swaps the record source, for tests.
    pub fn with_source(mut self, source: Box<dyn JournalSource>) -> Self {
        self.source = source;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let document = self.execute().await?;
        println!("{document}");
        Ok(())
    }

    /// Fetches, analyzes as the command requires, and renders the answer.
    ///
    /// A failed fetch degrades to an empty batch: analyzing zero records is
    /// a valid run, and the warning on stderr is the operator's signal.
    pub async fn execute(&self) -> anyhow::Result<String> {
        let records = match self.source.fetch(self.config.fetch_options()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "Journal fetch failed; continuing with an empty batch");
                Vec::new()
            }
        };

        let mut session = AnalysisSession::new();
        session.load(records);

        let document = match &self.config.command {
            Command::Summary => {
                session.analyze(&self.aggregator);
                serde_json::to_string_pretty(&session.summary()?)?
            }
            Command::Detailed { bucket, domain } => {
                session.analyze(&self.aggregator);
                serde_json::to_string_pretty(
                    &session.detailed_breakdown(bucket.as_deref(), *domain)?,
                )?
            }
            Command::Domains => {
                session.analyze(&self.aggregator);
                serde_json::to_string_pretty(&session.domain_statistics()?)?
            }
            Command::Anomalies => {
                session.analyze(&self.aggregator);
                serde_json::to_string_pretty(&session.detect_anomalies()?)?
            }
            Command::Search { keyword, level } => {
                let options = SearchOptions {
                    level: *level,
                    ..SearchOptions::default()
                };
                serde_json::to_string_pretty(&session.search(keyword, &options))?
            }
            Command::Errors { limit } => {
                serde_json::to_string_pretty(&session.recent_errors(*limit))?
            }
        };
        Ok(document)
    }
}

// Main entry point for the application
pub async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().collect();

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            process::exit(1);
        }
    };

    logging::init_tracing(config.log_level);
    info!(version = crate::VERSION, command = ?config.command, "Starting journal-triage");

    match App::from_config(config) {
        Ok(app) => {
            if let Err(err) = app.run().await {
                error!(error = %err, "Application error");
                process::exit(1);
            }
        }
        Err(err) => {
            error!(error = %err, "Startup error");
            process::exit(1);
        }
    }

    Ok(())
}
