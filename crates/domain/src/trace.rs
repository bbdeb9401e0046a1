use serde::Serialize;

use crate::chain::ChainId;
use crate::error::ErrorKind;

/// Structured trace events emitted across all walletlink crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ChainRegistered {
        chain_id: ChainId,
        name: String,
        transports: usize,
    },
    TransportFallback {
        chain_id: ChainId,
        skipped: String,
        selected: String,
    },
    TransportProbed {
        chain_id: ChainId,
        endpoint: String,
        ok: bool,
        duration_ms: u64,
    },
    StateCommitted {
        from: &'static str,
        to: &'static str,
        generation: u64,
    },
    HandshakeStarted {
        generation: u64,
        request_id: String,
        connector: String,
        requested_chain: Option<ChainId>,
    },
    HandshakeFinished {
        generation: u64,
        duration_ms: u64,
        failure: Option<ErrorKind>,
    },
    StaleResponseDiscarded {
        generation: u64,
        current_generation: u64,
        response: &'static str,
    },
    ChainSwitched {
        from: ChainId,
        to: ChainId,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "wl_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::ChainSwitched {
            from: ChainId(1),
            to: ChainId(137),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "ChainSwitched");
        assert_eq!(json["from"], 1);
        assert_eq!(json["to"], 137);
    }
}
