use serde::{Deserialize, Serialize};

use wl_domain::{Address, ChainId, ErrorKind};

/// How the wallet is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// An injected browser extension wallet.
    BrowserExtension,
    /// A mobile wallet paired through the relay.
    RelayMobile,
    Hardware,
}

impl std::fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BrowserExtension => "browser_extension",
            Self::RelayMobile => "relay_mobile",
            Self::Hardware => "hardware",
        })
    }
}

/// The single authoritative connection status of a session.
///
/// Readers always receive owned snapshots; only the session manager
/// replaces the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting {
        requested_chain_id: Option<ChainId>,
    },
    Connected {
        address: Address,
        chain_id: ChainId,
        connector_kind: ConnectorKind,
    },
    Error {
        reason: ErrorKind,
        retryable: bool,
    },
}

impl SessionState {
    /// Short name for logs, traces and `InvalidState` errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting { .. } => "connecting",
            Self::Connected { .. } => "connected",
            Self::Error { .. } => "error",
        }
    }

    pub(crate) fn failed(reason: ErrorKind) -> Self {
        Self::Error {
            reason,
            retryable: reason.is_retryable(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            Self::Connected { address, .. } => Some(*address),
            _ => None,
        }
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        match self {
            Self::Connected { chain_id, .. } => Some(*chain_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_state_is_retryable() {
        assert_eq!(
            SessionState::failed(ErrorKind::Timeout),
            SessionState::Error {
                reason: ErrorKind::Timeout,
                retryable: true
            }
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let state = SessionState::Connected {
            address: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap(),
            chain_id: ChainId(137),
            connector_kind: ConnectorKind::RelayMobile,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "connected");
        assert_eq!(json["chain_id"], 137);
        assert_eq!(json["connector_kind"], "relay_mobile");
        assert_eq!(json["address"], "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn accessors_only_answer_when_connected() {
        assert!(SessionState::default().address().is_none());
        assert!(SessionState::Connecting {
            requested_chain_id: Some(ChainId(1))
        }
        .chain_id()
        .is_none());
    }
}
