use super::config::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber.
///
/// Diagnostics go to stderr so stdout stays reserved for query output.
/// Uses JSON format when `LOG_FORMAT=json`; `RUST_LOG` directives extend
/// the configured base level.
pub fn init_tracing(level: LogLevel) {
    let filter =
        EnvFilter::from_default_env().add_directive(tracing::Level::from(level).into());
    let use_json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    if use_json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
