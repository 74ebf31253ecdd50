use super::serialization::{BatchSerializer, SerializationError, WireSchema};
use crate::domain::Event;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Request timeout: {0}")]
    Timeout(String),
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    pub wire_schema: WireSchema,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/api/tailscale/agent".to_string(),
            timeout: Duration::from_secs(10),
            connection_timeout: Duration::from_secs(5),
            user_agent: format!("tailscale-log-agent/{}", env!("CARGO_PKG_VERSION")),
            wire_schema: WireSchema::Canonical,
        }
    }
}

/// Outcome of one accepted delivery.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub batch_id: String,
    pub status_code: u16,
    pub events_sent: usize,
    pub bytes_sent: usize,
    pub latency: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub events_delivered: u64,
    pub average_response_time: Duration,
}

#[derive(Debug, Default)]
pub struct ClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    events_delivered: AtomicU64,
    total_response_time: AtomicU64,
}

impl ClientStats {
    pub fn record_request(&self, success: bool, events: usize, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
            self.events_delivered.fetch_add(events as u64, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DeliveryStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time.load(Ordering::Relaxed);

        let average_response_time = if total_requests > 0 {
            Duration::from_millis(total_response_time / total_requests)
        } else {
            Duration::ZERO
        };

        DeliveryStats {
            total_requests,
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            average_response_time,
        }
    }
}

/// HTTP client for the collector endpoint.
///
/// One POST per call, bounded by `DeliveryConfig::timeout`, never retried
/// here: retention and retry belong to the caller's batch.
#[derive(Debug, Clone)]
pub struct CollectorClient {
    client: Client,
    config: DeliveryConfig,
    endpoint_url: Url,
    serializer: BatchSerializer,
    agent_host: String,
    stats: Arc<ClientStats>,
}

impl CollectorClient {
    pub fn new(config: DeliveryConfig) -> Result<Self, DeliveryError> {
        let endpoint_url: Url = config.endpoint.parse().map_err(|e| {
            DeliveryError::InvalidConfiguration(format!(
                "Invalid endpoint URL '{}': {}",
                config.endpoint, e
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                DeliveryError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        let agent_host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            client,
            serializer: BatchSerializer::new(config.wire_schema),
            config,
            endpoint_url,
            agent_host,
            stats: Arc::new(ClientStats::default()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats.snapshot()
    }

    /// POST `events` as a JSON array. Any non-2xx status, timeout or
    /// connection failure is an error.
    pub async fn send_events(&self, events: &[Event]) -> Result<DeliveryReceipt, DeliveryError> {
        let start = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let payload = self.serializer.serialize(events)?;
        let bytes_sent = payload.len();
        let headers = self.build_headers(&batch_id, events.len())?;

        debug!(
            batch_id = %batch_id,
            events = events.len(),
            bytes = bytes_sent,
            endpoint = %self.endpoint_url,
            "Sending batch"
        );

        let response = match self
            .client
            .post(self.endpoint_url.clone())
            .headers(headers)
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, events.len(), start.elapsed());
                error!(batch_id = %batch_id, error = %e, "Failed to send batch");
                return Err(if e.is_timeout() {
                    DeliveryError::Timeout(format!(
                        "No response within {:?}",
                        self.config.timeout
                    ))
                } else {
                    DeliveryError::Network(e)
                });
            }
        };

        let status = response.status();
        let latency = start.elapsed();
        self.stats
            .record_request(status.is_success(), events.len(), latency);

        if status.is_success() {
            info!(
                batch_id = %batch_id,
                events = events.len(),
                bytes = bytes_sent,
                latency_ms = latency.as_millis() as u64,
                "Successfully sent batch"
            );
            return Ok(DeliveryReceipt {
                batch_id,
                status_code: status.as_u16(),
                events_sent: events.len(),
                bytes_sent,
                latency,
            });
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            batch_id = %batch_id,
            status = status.as_u16(),
            body = %body,
            "Collector rejected batch"
        );
        Err(DeliveryError::Http {
            status: status.as_u16(),
            body,
        })
    }

    pub fn build_headers(&self, batch_id: &str, batch_size: usize) -> Result<HeaderMap, DeliveryError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers.insert(
            HeaderName::from_static("x-batch-id"),
            HeaderValue::from_str(batch_id).map_err(|e| {
                DeliveryError::InvalidHeaderValue(format!("Invalid batch ID: {e}"))
            })?,
        );

        headers.insert(
            HeaderName::from_static("x-batch-size"),
            HeaderValue::from(batch_size as u64),
        );

        headers.insert(
            HeaderName::from_static("x-agent-version"),
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        );

        // Hostnames are not guaranteed to be valid header values.
        if let Ok(host) = HeaderValue::from_str(&self.agent_host) {
            headers.insert(HeaderName::from_static("x-agent-host"), host);
        }

        Ok(headers)
    }
}
