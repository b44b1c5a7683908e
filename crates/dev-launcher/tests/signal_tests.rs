//! Real SIGINT/SIGTERM delivered to the test process.
//!
//! Every test here signals the whole process, so they run one at a time.

#![cfg(unix)]

use dev_config::Config;
use dev_launcher::{LaunchState, Supervisor, shutdown_signal};

use std::time::Duration;

use nix::sys::signal::{Signal, kill};
use nix::unistd::getpid;
use serial_test::serial;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const TRAP: &str = "trap 'touch terminated; exit 0' TERM; while true; do sleep 0.1; done";

async fn assert_resolves_on(signal: Signal) {
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    // First poll installs the handlers
    let early = tokio::time::timeout(Duration::from_millis(50), shutdown.as_mut()).await;
    assert!(early.is_err(), "resolved before any signal was sent");

    kill(getpid(), signal).unwrap();

    let resolved = tokio::time::timeout(Duration::from_secs(2), shutdown).await;
    assert!(resolved.is_ok(), "not resolved after {signal:?}");
}

#[tokio::test]
#[serial]
async fn test_shutdown_signal_resolves_on_sigterm() {
    assert_resolves_on(Signal::SIGTERM).await;
}

#[tokio::test]
#[serial]
async fn test_shutdown_signal_resolves_on_sigint() {
    assert_resolves_on(Signal::SIGINT).await;
}

#[tokio::test]
#[serial]
async fn test_sigterm_while_running_stops_both_and_exits_zero() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir(root.path().join("server")).unwrap();
    std::fs::create_dir(root.path().join("web")).unwrap();

    let health = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&health)
        .await;

    let mut config = Config::default();
    config.server.command = TRAP.to_string();
    config.server.host = health.address().ip().to_string();
    config.server.port = health.address().port();
    config.web.command = TRAP.to_string();
    config.setup.install_command = String::new();
    config.setup.generate_command = String::new();
    config.health.interval_ms = 50;

    let supervisor = Supervisor::new(config, root.path());
    let mut state = supervisor.subscribe();

    let send_sigterm = async {
        state
            .wait_for(|state| *state == LaunchState::Running)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        kill(getpid(), Signal::SIGTERM).unwrap();
    };

    let (result, ()) = tokio::join!(supervisor.run(shutdown_signal()), send_sigterm);

    assert_eq!(result.unwrap(), 0);
    assert!(root.path().join("server/terminated").exists());
    assert!(root.path().join("web/terminated").exists());
}
