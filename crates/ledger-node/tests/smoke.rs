//! End-to-end smoke test for ledger-node.
//!
//! Starts a real node process against a fresh data directory and exercises
//! the admin API's public routes.
//!
//! Run with:
//!   cargo test -p ledger-node --test smoke

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

async fn wait_for_health(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(resp) = client.get(url).send().await {
            if resp.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    false
}

#[tokio::test]
async fn smoke_node_boots_and_serves_admin_api() {
    let data_dir = std::env::temp_dir().join(format!("ledgercraft_e2e_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&data_dir);
    std::fs::create_dir_all(&data_dir).unwrap();

    let api_port = free_port();
    let api_url = format!("http://127.0.0.1:{api_port}");

    let node_bin = env!("CARGO_BIN_EXE_ledger-node");
    let child = Command::new(node_bin)
        .args(["--data-dir", data_dir.to_str().unwrap(), "--api-host", &format!(":{api_port}")])
        .env("TESTING", "true")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn ledger-node");

    let _guard = NodeGuard { child, data_dir };

    let http = reqwest::Client::new();
    assert!(
        wait_for_health(&http, &format!("{api_url}/health"), Duration::from_secs(20)).await,
        "ledger-node did not become ready within 20 seconds"
    );

    let version: serde_json::Value =
        http.get(format!("{api_url}/version")).send().await.unwrap().json().await.unwrap();
    assert!(version["protocol_version"].is_string());

    let info: serde_json::Value =
        http.get(format!("{api_url}/info")).send().await.unwrap().json().await.unwrap();
    assert_eq!(info["height"], 0, "genesis block should already be mined");

    // Protected routes reject requests with no bearer token.
    let resp = http.get(format!("{api_url}/blockchain")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
}
