use crate::app::config::ConfigError;
use crate::collector::TailError;
use crate::sender::DeliveryError;
use thiserror::Error;

/// Top-level error type for the agent.
///
/// Everything that reaches this type is fatal: the process logs it and exits
/// non-zero. Recoverable conditions (rotation, malformed lines, collector
/// outages) are handled inside their own modules and never surface here.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Log file error: {0}")]
    Tail(#[from] TailError),

    #[error("Delivery setup error: {0}")]
    Delivery(#[from] DeliveryError),
}
