use super::{AgentMode, LogFormat, LogLevel};
use crate::buffer::BatchConfig;
use crate::sender::DeliveryConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Fully resolved, validated agent configuration.
///
/// Built once at startup by [`Config::load`](super::Config::load) and handed
/// to the agent; nothing reads configuration from the environment after
/// this point.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub log_file: PathBuf,
    pub mode: AgentMode,
    pub poll_interval: Duration,
    pub batch: BatchConfig,
    pub delivery: DeliveryConfig,
    /// Secondary push channel, if configured.
    pub stream: Option<DeliveryConfig>,
    pub origin_tag: Option<String>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}
