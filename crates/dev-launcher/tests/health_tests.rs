//! Integration tests for health gating using wiremock mock server

use dev_launcher::{HealthProber, LauncherError};

use std::time::{Duration, Instant};

use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const HEALTH_PATH: &str = "/api/health";

fn health_url(server: &MockServer) -> String {
    format!("{}{HEALTH_PATH}", server.uri())
}

#[tokio::test]
async fn test_healthy_on_first_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let prober = HealthProber::new(
        health_url(&mock_server),
        Duration::from_secs(5),
        Duration::from_millis(100),
    )
    .unwrap();
    let report = prober.wait_for_health().await.unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.status, 200);
}

#[tokio::test]
async fn test_unavailable_then_ok_takes_two_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let prober = HealthProber::new(
        health_url(&mock_server),
        Duration::from_secs(5),
        Duration::from_millis(100),
    )
    .unwrap();
    let report = prober.wait_for_health().await.unwrap();

    assert_eq!(report.attempts, 2);
    assert_eq!(report.status, 200);
    assert!(report.elapsed >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_not_found_counts_as_healthy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let prober = HealthProber::new(
        health_url(&mock_server),
        Duration::from_secs(5),
        Duration::from_millis(100),
    )
    .unwrap();
    let report = prober.wait_for_health().await.unwrap();

    assert_eq!(report.attempts, 1);
    assert_eq!(report.status, 404);
}

#[tokio::test]
async fn test_hanging_endpoint_times_out_within_window() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(HEALTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(60)))
        .mount(&mock_server)
        .await;

    let prober = HealthProber::new(
        health_url(&mock_server),
        Duration::from_millis(1_000),
        Duration::from_millis(200),
    )
    .unwrap();

    let start = Instant::now();
    let result = prober.wait_for_health().await;
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(LauncherError::TimedOut { .. })));
    assert!(elapsed >= Duration::from_millis(1_000), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1_400), "returned late: {elapsed:?}");
}

#[tokio::test]
async fn test_connection_refused_times_out() {
    // Reserve a port, then free it so nothing is listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let prober = HealthProber::new(
        format!("http://127.0.0.1:{port}{HEALTH_PATH}"),
        Duration::from_millis(500),
        Duration::from_millis(100),
    )
    .unwrap();
    let result = prober.wait_for_health().await;

    match result {
        Err(LauncherError::TimedOut { attempts, timeout_ms, .. }) => {
            assert!(attempts >= 2);
            assert_eq!(timeout_ms, 500);
        }
        other => panic!("expected TimedOut, got {other:?}"),
    }
}

#[test]
fn test_healthy_status_range() {
    assert!(HealthProber::is_healthy_status(200));
    assert!(HealthProber::is_healthy_status(302));
    assert!(HealthProber::is_healthy_status(499));
    assert!(!HealthProber::is_healthy_status(500));
    assert!(!HealthProber::is_healthy_status(503));
    assert!(!HealthProber::is_healthy_status(199));
}
