use super::settings::AgentSettings;
use super::ConfigError;
use url::Url;

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {name} URL '{value}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidUrl(format!(
            "Unsupported {name} URL scheme '{scheme}' in '{value}' (expected http or https)"
        ))),
    }
}

impl AgentSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Log file path must not be empty".to_string(),
            ));
        }

        validate_http_url("endpoint", &self.delivery.endpoint)?;
        if let Some(stream) = &self.stream {
            validate_http_url("stream endpoint", &stream.endpoint)?;
        }

        if self.batch.max_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        match self.batch.max_pending {
            Some(max_pending) if max_pending < self.batch.max_size => {
                return Err(ConfigError::InvalidConfig(format!(
                    "Max pending events ({}) must be at least as large as batch size ({})",
                    max_pending, self.batch.max_size
                )));
            }
            _ => {}
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.delivery.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::app::config::{Config, ConfigError};

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config = Config {
            endpoint: Some("ws://localhost:3001/ws/tailscale".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_websocket_stream_endpoint() {
        let config = Config {
            stream_endpoint: Some("ws://localhost:3001/ws/tailscale".to_string()),
            ..Config::default()
        };
        match config.resolve() {
            Err(ConfigError::InvalidUrl(message)) => {
                assert!(message.contains("stream endpoint"));
                assert!(message.contains("'ws'"));
            }
            other => panic!("expected InvalidUrl, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let config = Config {
            batch_size: Some(0),
            ..Config::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_cap_below_batch_size() {
        let config = Config {
            batch_size: Some(10),
            max_pending_events: Some(5),
            ..Config::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_poll_interval_and_timeout() {
        let config = Config {
            poll_interval_ms: Some(0),
            ..Config::default()
        };
        assert!(config.resolve().is_err());

        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.resolve().is_err());
    }
}
