pub mod agent;
pub mod config;
pub mod logging;
pub mod shutdown;

pub use agent::{Agent, AgentState, AgentSummary, CycleReport, FlushOutcome};
pub use config::{AgentMode, AgentSettings, Config, ConfigError, LogFormat, LogLevel};
pub use logging::{LoggingError, init_logging};
pub use shutdown::spawn_signal_listener;

use crate::sender::CollectorClient;
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct App {
    settings: AgentSettings,
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

    /// Layer the config file, resolve mode defaults and validate.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        if let Some(path) = &config.config_file {
            eprintln!("Loading configuration from file: {}", path.display());
        }
        let settings = config.load().context("Failed to load configuration")?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Run until SIGINT/SIGTERM. Returns once the final flush is done.
    pub async fn run(self) -> anyhow::Result<AgentSummary> {
        self.run_until(CancellationToken::new()).await
    }

    pub async fn run_until(self, shutdown: CancellationToken) -> anyhow::Result<AgentSummary> {
        let settings = self.settings;
        let client = CollectorClient::new(settings.delivery.clone())
            .context("Failed to create collector client")?;
        let stream = settings
            .stream
            .clone()
            .map(CollectorClient::new)
            .transpose()
            .context("Failed to create stream client")?;

        // Clones share their counters with the ones moved into the agent.
        let client_handle = client.clone();
        let stream_handle = stream.clone();

        let agent = Agent::connect(&settings, client, stream)
            .await
            .with_context(|| format!("Failed to open {}", settings.log_file.display()))?;

        let signals = spawn_signal_listener(shutdown.clone());
        let result = agent.run(shutdown.clone()).await;
        shutdown.cancel();
        signals.abort();

        let stats = client_handle.stats();
        info!(
            total_requests = stats.total_requests,
            successful_requests = stats.successful_requests,
            failed_requests = stats.failed_requests,
            events_delivered = stats.events_delivered,
            average_response_ms = stats.average_response_time.as_millis() as u64,
            "Collector client statistics"
        );
        if let Some(stream) = stream_handle {
            let stats = stream.stats();
            info!(
                total_requests = stats.total_requests,
                failed_requests = stats.failed_requests,
                "Stream client statistics"
            );
        }

        Ok(result?)
    }
}

// Main entry point for the application
pub async fn main() -> ExitCode {
    // clap prints usage, --help and --version itself
    let config = Config::parse();

    let app = match App::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(app.settings().log_level, app.settings().log_format) {
        eprintln!("Logging setup failed: {e}");
        return ExitCode::FAILURE;
    }

    info!("Starting tailscale-log-agent v{}", crate::VERSION);

    match app.run().await {
        Ok(_) => {
            info!("tailscale-log-agent stopped.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Agent error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
