use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// Shared error type used across all walletlink crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // ── Configuration (fatal at startup) ─────────────────────────────
    #[error("chain {0} is already registered")]
    DuplicateChain(ChainId),

    #[error("unknown chain: {0}")]
    UnknownChain(ChainId),

    #[error("invalid chain id: {0}")]
    InvalidChain(ChainId),

    #[error("relay project id is missing (set it in [relay] or via {env})")]
    MissingCredential { env: String },

    #[error("no RPC transport available for chain {0}")]
    NoTransportAvailable(ChainId),

    #[error("chain {chain_id}: invalid transport '{url}': {reason}")]
    InvalidTransport {
        chain_id: ChainId,
        url: String,
        reason: String,
    },

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    // ── Lifecycle / contract violations ──────────────────────────────
    #[error("session manager is already initialized")]
    AlreadyInitialized,

    #[error("session manager is not initialized")]
    NotInitialized,

    #[error("{operation} is not valid while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("{0} requires a tokio runtime")]
    NoRuntime(&'static str),

    #[error("{0} response arrived after the session moved on; discarded")]
    Superseded(&'static str),

    // ── Wallet / transport ───────────────────────────────────────────
    #[error("chain switch rejected: {0}")]
    SwitchRejected(ErrorKind),

    #[error("transport: {0}")]
    Transport(String),

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error belongs to the fatal startup class.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DuplicateChain(_)
                | Error::UnknownChain(_)
                | Error::InvalidChain(_)
                | Error::MissingCredential { .. }
                | Error::NoTransportAvailable(_)
                | Error::InvalidTransport { .. }
                | Error::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session failure reasons
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Why a wallet interaction failed.  Stored in the `Error` session state and
/// returned by wallet connectors; never raised out of a handshake task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The user declined the request in their wallet.
    UserRejected,
    /// The wallet did not answer before the deadline.
    Timeout,
    /// Relay, bridge or RPC failure between us and the wallet.
    TransportFailure,
    /// The wallet is on a chain that is not configured.
    UnsupportedChain,
}

impl ErrorKind {
    /// Every session failure can be retried with a fresh `connect()`.
    pub fn is_retryable(self) -> bool {
        true
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UserRejected => "request rejected in wallet",
            Self::Timeout => "wallet did not respond in time",
            Self::TransportFailure => "could not reach wallet",
            Self::UnsupportedChain => "wallet is on an unsupported network",
        };
        f.write_str(text)
    }
}
