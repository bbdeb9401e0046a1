//! Probe tests against in-process JSON-RPC stubs.
//!
//! Each stub is a tiny axum server on an ephemeral port that answers every
//! POST with a fixed reply, so fallback ordering can be checked end to end
//! without any external network.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use url::Url;
use wl_chains::{probe_chain, ChainRegistry, TransportResolver};
use wl_domain::{ChainDescriptor, ChainId, Error};

// ── Stubs ───────────────────────────────────────────────────────────────

async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

/// Answers `eth_chainId` with `chain_hex`.
async fn rpc_stub(chain_hex: &'static str) -> Url {
    let app = Router::new().route(
        "/",
        post(move || async move {
            Json(serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": chain_hex }))
        }),
    );
    serve(app).await
}

async fn failing_stub() -> Url {
    let app = Router::new().route("/", post(|| async { StatusCode::BAD_GATEWAY }));
    serve(app).await
}

/// A port nobody listens on.
async fn dead_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

fn resolver_for(chain_id: u64, transports: Vec<Url>) -> TransportResolver {
    let mut reg = ChainRegistry::new();
    reg.register(ChainDescriptor::new(chain_id, "test", "ETH", transports))
        .unwrap();
    TransportResolver::new(Arc::new(reg), Duration::from_secs(30))
}

const TIMEOUT: Duration = Duration::from_secs(5);

// ── Tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn healthy_first_endpoint() {
    let good = rpc_stub("0x1").await;
    let resolver = resolver_for(1, vec![good.clone()]);
    let client = reqwest::Client::new();

    let report = probe_chain(&client, &resolver, ChainId(1), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(report.endpoint, good);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn falls_back_and_records_failure() {
    let bad = failing_stub().await;
    let good = rpc_stub("0x89").await;
    let resolver = resolver_for(137, vec![bad.clone(), good.clone()]);
    let client = reqwest::Client::new();

    let report = probe_chain(&client, &resolver, ChainId(137), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(report.endpoint, good);
    assert_eq!(report.failed, vec![bad.clone()]);

    // The failure now steers plain endpoint selection too.
    assert!(resolver.is_cooling_down(&bad));
    assert_eq!(resolver.endpoint_for(ChainId(137)).unwrap(), good);
}

#[tokio::test]
async fn wrong_chain_counts_as_failure() {
    let mainnet = rpc_stub("0x1").await;
    let resolver = resolver_for(43114, vec![mainnet.clone()]);
    let client = reqwest::Client::new();

    let err = probe_chain(&client, &resolver, ChainId(43114), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("reports chain 1"));
    assert!(resolver.is_cooling_down(&mainnet));
}

#[tokio::test]
async fn all_endpoints_down() {
    let a = dead_endpoint().await;
    let b = failing_stub().await;
    let resolver = resolver_for(1, vec![a, b]);
    let client = reqwest::Client::new();

    let err = probe_chain(&client, &resolver, ChainId(1), TIMEOUT)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("all 2 transports"));
}

#[tokio::test]
async fn unknown_chain_is_not_probed() {
    let resolver = resolver_for(1, vec![]);
    let client = reqwest::Client::new();
    let err = probe_chain(&client, &resolver, ChainId(10), TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownChain(ChainId(10))));
}
