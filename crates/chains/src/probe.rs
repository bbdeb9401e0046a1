//! JSON-RPC reachability probe.
//!
//! Sends `eth_chainId` to each candidate transport in resolver order and
//! feeds every outcome back into the [`TransportResolver`], so a probe run
//! also primes the fallback ordering.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use wl_domain::error::{Error, Result};
use wl_domain::trace::TraceEvent;
use wl_domain::ChainId;

use crate::transport::TransportResolver;

/// Outcome of a successful probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub chain_id: ChainId,
    pub endpoint: Url,
    pub latency_ms: u64,
    /// Endpoints that failed before `endpoint` answered.
    pub failed: Vec<Url>,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Probe `chain_id`, falling through its transports until one answers with
/// the expected chain id.
pub async fn probe_chain(
    client: &reqwest::Client,
    resolver: &TransportResolver,
    chain_id: ChainId,
    timeout: Duration,
) -> Result<ProbeReport> {
    let candidates = resolver.candidates(chain_id)?;
    let mut failed = Vec::new();
    let mut last_error = String::new();

    for endpoint in candidates {
        let start = Instant::now();
        let outcome = request_chain_id(client, &endpoint, timeout).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let outcome = outcome.and_then(|reported| {
            if reported == chain_id {
                Ok(())
            } else {
                Err(format!("endpoint reports chain {reported}"))
            }
        });

        TraceEvent::TransportProbed {
            chain_id,
            endpoint: endpoint.to_string(),
            ok: outcome.is_ok(),
            duration_ms,
        }
        .emit();

        match outcome {
            Ok(()) => {
                resolver.record_success(&endpoint);
                return Ok(ProbeReport {
                    chain_id,
                    endpoint,
                    latency_ms: duration_ms,
                    failed,
                    checked_at: Utc::now(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    chain_id = %chain_id,
                    endpoint = %endpoint,
                    error = %e,
                    "transport probe failed, trying next"
                );
                resolver.record_failure(&endpoint);
                failed.push(endpoint);
                last_error = e;
            }
        }
    }

    Err(Error::Transport(format!(
        "all {} transports for chain {chain_id} failed (last error: {last_error})",
        failed.len()
    )))
}

async fn request_chain_id(
    client: &reqwest::Client,
    endpoint: &Url,
    timeout: Duration,
) -> std::result::Result<ChainId, String> {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_chainId",
        "params": [],
    });

    let resp = client
        .post(endpoint.clone())
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = resp.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    let parsed: RpcResponse = resp.json().await.map_err(|e| e.to_string())?;
    if let Some(err) = parsed.error {
        return Err(format!("rpc error {}: {}", err.code, err.message));
    }
    let hex = parsed.result.ok_or_else(|| "missing result".to_string())?;
    parse_quantity(&hex).map(ChainId)
}

/// Parse a JSON-RPC hex quantity such as `"0x89"`.
fn parse_quantity(raw: &str) -> std::result::Result<u64, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity '{raw}' lacks 0x prefix"))?;
    u64::from_str_radix(digits, 16).map_err(|e| format!("quantity '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_quantities() {
        assert_eq!(parse_quantity("0x1"), Ok(1));
        assert_eq!(parse_quantity("0x89"), Ok(137));
        assert_eq!(parse_quantity("0xa86a"), Ok(43114));
        assert!(parse_quantity("137").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }
}
