use super::config::{LogFormat, LogLevel};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets that are too chatty at the agent's own level.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("Failed to install tracing subscriber: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter string: the agent level first, then the quiet targets at `warn`.
pub fn build_filter_string(level: LogLevel) -> String {
    let mut parts = Vec::with_capacity(QUIET_TARGETS.len() + 1);
    parts.push(level.as_str().to_string());
    parts.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
    parts.join(",")
}

pub fn build_filter(level: LogLevel) -> Result<EnvFilter, LoggingError> {
    let filter = build_filter_string(level);
    EnvFilter::try_new(&filter).map_err(|source| LoggingError::InvalidFilter { filter, source })
}

/// Install the global subscriber. Called once by the binary; the library
/// itself only emits through `tracing` macros.
pub fn init_logging(level: LogLevel, format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_filter(level)?;

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).compact())
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_string_starts_with_level() {
        let filter = build_filter_string(LogLevel::Debug);
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("hyper=warn"));
        assert!(filter.contains("reqwest=warn"));
    }

    #[test]
    fn test_filter_builds_for_every_level() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert!(build_filter(level).is_ok());
        }
    }
}
