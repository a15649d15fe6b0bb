//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use oracle_submit::config::{AppConfig, NodeConfig};
use oracle_submit::ledger::rpc::{OUTCOME_METHOD, SUBMIT_METHOD};
use oracle_submit::ledger::{
    AdminKeypair, BlockDigest, LedgerConnection, LedgerError, MockLedger, SignedBlock,
};

pub const TEST_PHRASE: &str = "test test test test test test test test test test test junk";

pub const ORACLE_PACKAGE: &str = "0x8d2f";
pub const APP_PACKAGE: &str = "0xab";

pub fn admin() -> AdminKeypair {
    AdminKeypair::from_phrase(TEST_PHRASE, 0).unwrap()
}

/// Valid configuration pointing at `addr`, with fast polling.
pub fn test_config(addr: Option<SocketAddr>) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(addr) = addr {
        config.node.rpc_url = format!("http://{}", addr);
    }
    config.node.poll_interval_ms = 10;
    config.node.max_poll_interval_ms = 50;
    config.node.confirmation_timeout_secs = 5;
    config.packages.oracle_package_id = ORACLE_PACKAGE.into();
    config.packages.app_package_id = APP_PACKAGE.into();
    config
}

pub fn node_config(addr: SocketAddr) -> NodeConfig {
    test_config(Some(addr)).node
}

/// Serve `ledger` as a JSON-RPC node on an ephemeral port.
pub async fn start_mock_node(ledger: MockLedger) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().route("/", post(handle_rpc)).with_state(ledger);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

async fn handle_rpc(State(ledger): State<MockLedger>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let param = request["params"][0].clone();

    let result = match request["method"].as_str() {
        Some(SUBMIT_METHOD) => match serde_json::from_value::<SignedBlock>(param) {
            Ok(block) => ledger
                .submit(&block)
                .await
                .map(|digest| json!({ "digest": digest })),
            Err(e) => Err(LedgerError::Codec(e.to_string())),
        },
        Some(OUTCOME_METHOD) => match serde_json::from_value::<BlockDigest>(param) {
            Ok(digest) => ledger
                .execution_outcome(&digest)
                .await
                .map(|outcome| json!(outcome)),
            Err(e) => Err(LedgerError::Codec(e.to_string())),
        },
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": "method not found" },
            }))
        }
    };

    Json(match result {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(LedgerError::Rejected { reason }) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": reason },
        }),
        Err(e) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32602, "message": e.to_string() },
        }),
    })
}
