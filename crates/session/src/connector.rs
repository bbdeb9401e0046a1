use std::sync::Weak;

use uuid::Uuid;

use wl_chains::RelayCredential;
use wl_domain::config::AppMetadata;
use wl_domain::{Address, ChainId, ErrorKind};

use crate::manager::Shared;
use crate::state::ConnectorKind;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handshake types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything a connector needs to open a wallet session.
#[derive(Debug, Clone)]
pub struct HandshakeRequest {
    /// Correlates connector logs with the session's trace events.
    pub request_id: Uuid,
    /// Chain the dApp would like the wallet on, if any.
    pub preferred_chain: Option<ChainId>,
    /// Every chain the session accepts, in registration order.
    pub supported_chains: Vec<ChainId>,
    pub credential: RelayCredential,
    pub app: AppMetadata,
}

/// Accounts granted by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// Granted accounts; the first one becomes the session address.
    pub accounts: Vec<Address>,
    /// Chain the wallet is on after the handshake.
    pub chain_id: ChainId,
}

/// Notifications the wallet pushes after a handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of exposed accounts changed; empty means access was revoked.
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
    /// The wallet ended the session on its side.
    Disconnected,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Connector trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The external wallet, as seen by the session manager.
///
/// Implementations wrap a concrete transport (injected extension, relay
/// pairing, hardware bridge) and map its failures onto [`ErrorKind`].  They
/// must not touch session state themselves: results flow back through return
/// values and the [`EventSink`] handed to [`WalletConnector::subscribe`].
#[async_trait::async_trait]
pub trait WalletConnector: Send + Sync {
    fn kind(&self) -> ConnectorKind;

    /// Ask the user to expose their accounts.
    async fn request_accounts(&self, request: HandshakeRequest) -> Result<Handshake, ErrorKind>;

    /// Ask the wallet to move to `chain_id`.
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ErrorKind>;

    /// Tear down the wallet session.  Best effort.
    async fn disconnect(&self) -> Result<(), ErrorKind>;

    /// Called once by `initialize`.  Connectors that never push
    /// notifications can keep the default.
    fn subscribe(&self, sink: EventSink) {
        let _ = sink;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event sink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Holds only a weak reference so a connector keeping the sink alive does
// not keep the manager alive.

/// Where a connector pushes [`WalletEvent`]s.
#[derive(Clone)]
pub struct EventSink {
    shared: Weak<Shared>,
}

impl EventSink {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        Self { shared }
    }

    /// Apply `event` to the session.  Returns `false` once the manager is
    /// gone.
    pub fn emit(&self, event: WalletEvent) -> bool {
        match self.shared.upgrade() {
            Some(shared) => {
                shared.handle_event(event);
                true
            }
            None => {
                tracing::debug!(?event, "session manager dropped, ignoring wallet event");
                false
            }
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}
