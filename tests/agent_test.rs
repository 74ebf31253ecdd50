use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tailscale_log_agent::app::{App, Config};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

fn config_for(log_file: &Path, server: &MockServer, batch_size: usize) -> Config {
    Config {
        log_file: Some(log_file.to_path_buf()),
        endpoint: Some(format!("{}/api/tailscale/agent", server.uri())),
        batch_size: Some(batch_size),
        batch_timeout_secs: Some(3600),
        poll_interval_ms: Some(50),
        request_timeout_secs: Some(2),
        ..Config::default()
    }
}

/// Append `text` after `delay`, then cancel `token` after `cancel_after`.
fn write_then_cancel(
    path: PathBuf,
    text: &'static str,
    delay: Duration,
    cancel_after: Duration,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        drop(file);

        tokio::time::sleep(cancel_after).await;
        token.cancel();
    });
}

fn log_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tailscaled.log");
    fs::write(&path, "2024-01-15T14:00:00 preexisting line is never sent\n").unwrap();
    path
}

#[tokio::test]
async fn test_appended_lines_reach_collector() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let app = App::from_config(config_for(&path, &server, 2)).unwrap();
    let token = CancellationToken::new();
    write_then_cancel(
        path,
        "2024-01-15T14:32:45 peer connected: node_id=123, user=john@example.com\n\
         2024-01-15T14:32:46 peer disconnected: node_id=456\n",
        Duration::from_millis(100),
        Duration::from_millis(500),
        token.clone(),
    );

    let summary = app.run_until(token).await.unwrap();
    assert_eq!(summary.events_delivered, 2);
    assert_eq!(summary.successful_flushes, 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["event_type"], "peer_connected");
    assert_eq!(body[1]["event_type"], "peer_disconnected");
}

#[tokio::test]
async fn test_shutdown_flushes_partial_batch() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::from_config(config_for(&path, &server, 100)).unwrap();
    let token = CancellationToken::new();
    write_then_cancel(
        path,
        "login user=alice\n",
        Duration::from_millis(100),
        Duration::from_millis(300),
        token.clone(),
    );

    let summary = app.run_until(token).await.unwrap();
    assert_eq!(summary.events_delivered, 1);
    assert_eq!(summary.events_undelivered, 0);
}

#[tokio::test]
async fn test_collector_outage_retains_and_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = log_file(&dir);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = App::from_config(config_for(&path, &server, 1)).unwrap();
    let token = CancellationToken::new();
    write_then_cancel(
        path,
        "dns query example.com\n",
        Duration::from_millis(100),
        Duration::from_millis(400),
        token.clone(),
    );

    let summary = app.run_until(token).await.unwrap();
    assert!(summary.failed_flushes >= 2);
    assert_eq!(summary.events_delivered, 0);
    assert_eq!(summary.events_undelivered, 1);
}

#[tokio::test]
async fn test_missing_log_file_fails_startup() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let app = App::from_config(config_for(&dir.path().join("absent.log"), &server, 1)).unwrap();
    let result = app.run_until(CancellationToken::new()).await;
    assert!(result.is_err());
}
