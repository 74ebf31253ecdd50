mod cli;
mod settings;
mod validation;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Argument error: {0}")]
    ArgumentError(#[from] clap::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
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

/// Output format of the agent's own diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Collection mode. Selects the defaults for every tunable that is not set
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Coarse polling and larger batches
    #[default]
    Batch,
    /// Sub-second polling, small batches, events tagged `live_stream`
    Live,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModePreset {
    pub poll_interval: Duration,
    pub batch_size: usize,
    pub batch_timeout: Duration,
    pub request_timeout: Duration,
    pub origin_tag: Option<&'static str>,
}

impl AgentMode {
    pub fn preset(&self) -> ModePreset {
        match self {
            AgentMode::Batch => ModePreset {
                poll_interval: Duration::from_secs(1),
                batch_size: 10,
                batch_timeout: Duration::from_secs(5),
                request_timeout: Duration::from_secs(10),
                origin_tag: None,
            },
            AgentMode::Live => ModePreset {
                poll_interval: Duration::from_millis(500),
                batch_size: 5,
                batch_timeout: Duration::from_secs(2),
                request_timeout: Duration::from_secs(5),
                origin_tag: Some("live_stream"),
            },
        }
    }
}

pub use cli::{Config, DEFAULT_ENDPOINT, DEFAULT_LOG_FILE};
pub use settings::AgentSettings;
