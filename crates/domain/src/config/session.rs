use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigIssue;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session timing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long to wait for the wallet to grant accounts.
    #[serde(default = "d_60000")]
    pub handshake_timeout_ms: u64,
    /// How long to wait for the wallet to accept a chain switch.
    #[serde(default = "d_30000")]
    pub switch_timeout_ms: u64,
    /// A transport that failed within this window is skipped in favour of
    /// the next listed one.
    #[serde(default = "d_30000")]
    pub transport_cooldown_ms: u64,
    /// Per-request timeout for `walletctl chains --probe`.
    #[serde(default = "d_5000")]
    pub probe_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 60_000,
            switch_timeout_ms: 30_000,
            transport_cooldown_ms: 30_000,
            probe_timeout_ms: 5_000,
        }
    }
}

impl SessionConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn switch_timeout(&self) -> Duration {
        Duration::from_millis(self.switch_timeout_ms)
    }

    pub fn transport_cooldown(&self) -> Duration {
        Duration::from_millis(self.transport_cooldown_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Zero timeouts are errors; a zero cooldown only warns.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("session.handshake_timeout_ms", self.handshake_timeout_ms),
            ("session.switch_timeout_ms", self.switch_timeout_ms),
            ("session.probe_timeout_ms", self.probe_timeout_ms),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(field, "timeout must be greater than 0"));
            }
        }
        if self.transport_cooldown_ms == 0 {
            issues.push(ConfigIssue::warning(
                "session.transport_cooldown_ms",
                "cooldown of 0 disables transport fallback",
            ));
        }
        issues
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_60000() -> u64 {
    60_000
}
fn d_30000() -> u64 {
    30_000
}
fn d_5000() -> u64 {
    5_000
}
