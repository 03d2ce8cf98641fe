//! Integration tests for daemon serving and graceful shutdown

use dlx_engine::config::Config;
use dlx_engine::daemon::Daemon;
use sdk::types::TaskStatus;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

fn test_config() -> Config {
    Config::from_toml_str(
        r#"
[core]
log_level = "warn"
bind = "127.0.0.1:0"

[providers.bytebot]
base_url = "http://127.0.0.1:1"
"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_serves_until_shutdown_signal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let daemon = Daemon::new(test_config());
    let center = daemon.center().clone();
    let server = tokio::spawn(daemon.serve(listener, async {
        rx.await.ok();
    }));

    let client = reqwest::Client::new();
    let status: serde_json::Value = client
        .get(format!("http://{}/api/status", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["service"], "dlx-command-center");

    let response = client
        .post(format!(
            "http://{}/api/directives/self-healing/tasks/sh-1/assign",
            addr
        ))
        .json(&serde_json::json!({ "agentId": "aura-main" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(center.active_work(), 1);

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    // Running work is aborted and the task is left where it was
    assert_eq!(center.active_work(), 0);
    let status = center.read(|s| s.directives.get("self-healing").unwrap().tasks[0].status);
    assert_eq!(status, TaskStatus::InProgress);
}

#[tokio::test]
async fn test_startup_is_chronicled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let daemon = Daemon::new(test_config());
    let center = daemon.center().clone();
    let server = tokio::spawn(daemon.serve(listener, async {
        rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();
    server.await.unwrap().unwrap();

    let online = center.read(|s| {
        s.chronicle
            .entries()
            .iter()
            .any(|e| e.message.starts_with("Command Center server online"))
    });
    assert!(online);
}
