use super::settings::AgentSettings;
use super::{AgentMode, ConfigError, LogFormat, LogLevel};
use crate::buffer::BatchConfig;
use crate::sender::{DeliveryConfig, WireSchema};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_FILE: &str = "/var/log/tailscale/tailscaled.log";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001/api/tailscale/agent";

/// Raw configuration as given on the command line, in the environment or in
/// a TOML file.
///
/// Every tunable is optional so that sources can be layered: CLI/env first,
/// then the config file, then the defaults of the selected [`AgentMode`].
#[derive(Parser, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Log file to follow
    #[arg(long, env = "TAILSCALE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Collector endpoint receiving the JSON batches
    #[arg(long, env = "BACKEND_URL")]
    pub endpoint: Option<String>,

    /// Collection mode (selects defaults for the tunables below)
    #[arg(long, env = "AGENT_MODE", ignore_case = true)]
    pub mode: Option<AgentMode>,

    /// Events per batch before an immediate flush
    #[arg(long, env = "BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Seconds since the last flush before a non-empty batch is sent
    #[arg(long, env = "BATCH_TIMEOUT")]
    pub batch_timeout_secs: Option<u64>,

    /// Sleep between polls of the log file, in milliseconds
    #[arg(long, env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Collector request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Marker attached to every event (e.g. live_stream)
    #[arg(long, env = "ORIGIN_TAG")]
    pub origin_tag: Option<String>,

    /// Secondary endpoint receiving each cycle's events immediately
    /// (http or https; websocket URLs are rejected)
    #[arg(long, env = "STREAM_URL")]
    pub stream_endpoint: Option<String>,

    /// Payload field naming
    #[arg(long, env = "WIRE_SCHEMA", ignore_case = true)]
    pub wire_schema: Option<WireSchema>,

    /// Upper bound on retained events; oldest are dropped beyond it
    #[arg(long, env = "MAX_PENDING_EVENTS")]
    pub max_pending_events: Option<usize>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", ignore_case = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", ignore_case = true)]
    pub log_format: Option<LogFormat>,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Config::try_parse_from(args)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Layer the config file (if any) underneath, then resolve and validate.
    pub fn load(self) -> Result<AgentSettings, ConfigError> {
        let layered = match &self.config_file {
            Some(path) => {
                let file = Config::from_file(path)?;
                self.or(file)
            }
            None => self,
        };
        layered.resolve()
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: Config) -> Config {
        Config {
            log_file: self.log_file.or(fallback.log_file),
            endpoint: self.endpoint.or(fallback.endpoint),
            mode: self.mode.or(fallback.mode),
            batch_size: self.batch_size.or(fallback.batch_size),
            batch_timeout_secs: self.batch_timeout_secs.or(fallback.batch_timeout_secs),
            poll_interval_ms: self.poll_interval_ms.or(fallback.poll_interval_ms),
            request_timeout_secs: self.request_timeout_secs.or(fallback.request_timeout_secs),
            origin_tag: self.origin_tag.or(fallback.origin_tag),
            stream_endpoint: self.stream_endpoint.or(fallback.stream_endpoint),
            wire_schema: self.wire_schema.or(fallback.wire_schema),
            max_pending_events: self.max_pending_events.or(fallback.max_pending_events),
            log_level: self.log_level.or(fallback.log_level),
            log_format: self.log_format.or(fallback.log_format),
            config_file: self.config_file,
        }
    }

    /// Apply mode defaults and validate.
    pub fn resolve(self) -> Result<AgentSettings, ConfigError> {
        let mode = self.mode.unwrap_or_default();
        let preset = mode.preset();
        let wire_schema = self.wire_schema.unwrap_or_default();
        let request_timeout = self
            .request_timeout_secs
            .map_or(preset.request_timeout, Duration::from_secs);

        let delivery_for = |endpoint: String| DeliveryConfig {
            endpoint,
            timeout: request_timeout,
            connection_timeout: request_timeout.min(Duration::from_secs(5)),
            wire_schema,
            ..DeliveryConfig::default()
        };

        let settings = AgentSettings {
            log_file: self
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            mode,
            poll_interval: self
                .poll_interval_ms
                .map_or(preset.poll_interval, Duration::from_millis),
            batch: BatchConfig {
                max_size: self.batch_size.unwrap_or(preset.batch_size),
                max_wait_time: self
                    .batch_timeout_secs
                    .map_or(preset.batch_timeout, Duration::from_secs),
                max_pending: self.max_pending_events,
            },
            delivery: delivery_for(
                self.endpoint
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            ),
            stream: self.stream_endpoint.map(delivery_for),
            origin_tag: self
                .origin_tag
                .or_else(|| preset.origin_tag.map(str::to_string)),
            log_level: self.log_level.unwrap_or(LogLevel::Info),
            log_format: self.log_format.unwrap_or_default(),
        };

        settings.validate()?;
        Ok(settings)
    }
}
