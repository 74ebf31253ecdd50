use std::time::Duration;
use tailscale_log_agent::parser::parse;
use tailscale_log_agent::sender::{
    BatchSink, CollectorClient, DeliveryConfig, DeliveryError, WireSchema,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, header_exists, method, path},
};

const LINE: &str =
    "2024-01-15T14:32:45 [INFO] tailscaled: peer connected: node_id=123, user=john@example.com";

fn config_for(server: &MockServer, schema: WireSchema) -> DeliveryConfig {
    DeliveryConfig {
        endpoint: format!("{}/api/tailscale/agent", server.uri()),
        timeout: Duration::from_secs(2),
        connection_timeout: Duration::from_secs(1),
        wire_schema: schema,
        ..DeliveryConfig::default()
    }
}

#[tokio::test]
async fn test_posts_json_array_with_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tailscale/agent"))
        .and(header("content-type", "application/json"))
        .and(header("x-batch-size", "1"))
        .and(header_exists("x-batch-id"))
        .and(header_exists("x-agent-version"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = CollectorClient::new(config_for(&server, WireSchema::Canonical)).unwrap();
    let events = vec![parse(LINE).unwrap()];
    let receipt = client.send(&events).await.unwrap();

    assert_eq!(receipt.status_code, 200);
    assert_eq!(receipt.events_sent, 1);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.is_array());
    assert_eq!(body[0]["event_type"], "peer_connected");
    assert_eq!(body[0]["user"], "john@example.com");

    let stats = client.stats();
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.events_delivered, 1);
}

#[tokio::test]
async fn test_legacy_schema_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = CollectorClient::new(config_for(&server, WireSchema::Legacy)).unwrap();
    client.send(&[parse(LINE).unwrap()]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body[0]["ts"], "2024-01-15T14:32:45");
    assert_eq!(body[0]["type"], "peer_connected");
    assert_eq!(body[0]["raw"], LINE);
}

#[tokio::test]
async fn test_non_success_status_is_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("collector overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = CollectorClient::new(config_for(&server, WireSchema::Canonical)).unwrap();
    let result = client.send(&[parse(LINE).unwrap()]).await;

    match result {
        Err(DeliveryError::Http { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "collector overloaded");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(client.stats().failed_requests, 1);
}

#[tokio::test]
async fn test_slow_collector_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = config_for(&server, WireSchema::Canonical);
    config.timeout = Duration::from_millis(200);
    let client = CollectorClient::new(config).unwrap();

    let result = client.send(&[parse(LINE).unwrap()]).await;
    assert!(matches!(result, Err(DeliveryError::Timeout(_))));
}

#[tokio::test]
async fn test_unreachable_collector_is_network_error() {
    let config = DeliveryConfig {
        endpoint: "http://127.0.0.1:9/api/tailscale/agent".to_string(),
        timeout: Duration::from_secs(2),
        connection_timeout: Duration::from_secs(1),
        ..DeliveryConfig::default()
    };
    let client = CollectorClient::new(config).unwrap();

    let result = client.send(&[parse(LINE).unwrap()]).await;
    assert!(result.is_err());
}
