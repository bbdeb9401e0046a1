//! `walletctl chains`: list configured networks, optionally probing them.
//!
//! Works from the file-level config alone; the relay credential is not
//! needed to reach public RPC endpoints.

use std::sync::Arc;

use anyhow::Context;
use wl_chains::{probe_chain, ChainRegistry, TransportResolver};
use wl_domain::config::Config;

/// Print every chain with its selected endpoint.  With `probe`, also check
/// each chain over JSON-RPC.  Returns `false` when any probe failed.
pub async fn run(config: &Config, probe: bool) -> anyhow::Result<bool> {
    let registry =
        ChainRegistry::from_config(&config.chains).context("building chain registry")?;
    let resolver = TransportResolver::new(Arc::new(registry), config.session.transport_cooldown());

    for chain in resolver.registry().iter() {
        let endpoint = resolver
            .endpoint_for(chain.chain_id)
            .map(|url| url.to_string())
            .unwrap_or_else(|e| format!("({e})"));
        println!(
            "{:>8}  {:<16} {:<6} {}",
            chain.chain_id, chain.name, chain.native_currency, endpoint
        );
    }

    if !probe {
        return Ok(true);
    }

    let client = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let timeout = config.session.probe_timeout();

    println!();
    let mut all_ok = true;
    for chain_id in resolver.registry().chain_ids() {
        match probe_chain(&client, &resolver, chain_id, timeout).await {
            Ok(report) => {
                let fallback = if report.failed.is_empty() {
                    String::new()
                } else {
                    format!(" (after {} failed)", report.failed.len())
                };
                println!(
                    "  OK    {chain_id:>8}  {}  {}ms{fallback}",
                    report.endpoint, report.latency_ms
                );
            }
            Err(e) => {
                all_ok = false;
                println!("  FAIL  {chain_id:>8}  {e}");
            }
        }
    }

    Ok(all_ok)
}
