//! The connection session manager.
//!
//! One [`SessionManager`] per dApp session.  All state lives in [`Shared`]
//! behind a single `parking_lot::Mutex`; the lock is never held across an
//! `.await` and never while listeners run.
//!
//! Every connect attempt and every disconnect bumps a generation counter.
//! Asynchronous wallet responses carry the generation they were issued under
//! and are dropped when it no longer matches, so a late handshake or chain
//! switch can never resurrect a session the user already left.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

use wl_chains::{ChainRegistry, Configuration};
use wl_domain::error::{Error, Result};
use wl_domain::trace::TraceEvent;
use wl_domain::{ChainId, ErrorKind};

use crate::connector::{EventSink, Handshake, HandshakeRequest, WalletConnector, WalletEvent};
use crate::listeners::{ListenerSet, Subscription};
use crate::state::SessionState;

/// What `connect()` did.
#[derive(Debug)]
pub enum ConnectAttempt {
    /// A handshake task was spawned.  Awaiting the handle is optional; the
    /// outcome is committed to session state either way.  The task is
    /// aborted when the session moves on before it finishes, in which case
    /// the handle resolves to a cancelled `JoinError`.
    Started(JoinHandle<()>),
    /// A handshake is already in flight; nothing was started.
    AlreadyConnecting,
    AlreadyConnected,
}

impl ConnectAttempt {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    pub fn into_handle(self) -> Option<JoinHandle<()>> {
        match self {
            Self::Started(handle) => Some(handle),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Shared state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) struct Shared {
    connector: Arc<dyn WalletConnector>,
    config: OnceLock<Configuration>,
    core: Mutex<Core>,
    listeners: Arc<ListenerSet>,
}

struct Core {
    state: SessionState,
    generation: u64,
    /// The in-flight handshake task of the current generation.
    handshake: Option<AbortHandle>,
    /// Committed snapshots not yet delivered to listeners.
    pending: VecDeque<SessionState>,
    /// Set while some caller is delivering `pending`.
    draining: bool,
}

impl Core {
    /// Start a new generation, cancelling any handshake of the old one.
    fn advance(&mut self) {
        self.generation += 1;
        if let Some(task) = self.handshake.take() {
            task.abort();
            tracing::debug!(generation = self.generation, "aborted in-flight handshake");
        }
    }

    fn commit(&mut self, next: SessionState) {
        TraceEvent::StateCommitted {
            from: self.state.name(),
            to: next.name(),
            generation: self.generation,
        }
        .emit();
        self.pending.push_back(next.clone());
        self.state = next;
    }
}

impl Shared {
    /// Deliver queued snapshots until the queue is empty.
    ///
    /// Only one caller drains at a time.  A commit made while another caller
    /// is draining (including from inside a listener) is picked up by that
    /// caller, so listeners see snapshots strictly in commit order.
    fn drain(&self) {
        {
            let mut core = self.core.lock();
            if core.draining {
                return;
            }
            core.draining = true;
        }

        loop {
            let next = {
                let mut core = self.core.lock();
                match core.pending.pop_front() {
                    Some(state) => state,
                    None => {
                        core.draining = false;
                        return;
                    }
                }
            };
            self.listeners.notify(&next);
        }
    }

    async fn run_handshake(
        self: Arc<Self>,
        generation: u64,
        request: HandshakeRequest,
        chains: Arc<ChainRegistry>,
        timeout: Duration,
    ) {
        let started = Instant::now();
        TraceEvent::HandshakeStarted {
            generation,
            request_id: request.request_id.to_string(),
            connector: self.connector.kind().to_string(),
            requested_chain: request.preferred_chain,
        }
        .emit();

        let call = AssertUnwindSafe(self.connector.request_accounts(request)).catch_unwind();
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                tracing::error!(generation, "wallet connector panicked during handshake");
                Err(ErrorKind::TransportFailure)
            }
            Err(_) => {
                tracing::warn!(
                    generation,
                    timeout_ms = timeout.as_millis() as u64,
                    "wallet handshake timed out"
                );
                Err(ErrorKind::Timeout)
            }
        };

        let next = match outcome {
            Ok(handshake) => self.granted(handshake, &chains),
            Err(kind) => SessionState::failed(kind),
        };

        TraceEvent::HandshakeFinished {
            generation,
            duration_ms: started.elapsed().as_millis() as u64,
            failure: match next {
                SessionState::Error { reason, .. } => Some(reason),
                _ => None,
            },
        }
        .emit();

        {
            let mut core = self.core.lock();
            if core.generation != generation {
                TraceEvent::StaleResponseDiscarded {
                    generation,
                    current_generation: core.generation,
                    response: "handshake",
                }
                .emit();
                return;
            }
            core.handshake = None;
            core.commit(next);
        }
        self.drain();
    }

    /// Turn a completed handshake into the state to commit.
    fn granted(&self, handshake: Handshake, chains: &ChainRegistry) -> SessionState {
        let Some(&address) = handshake.accounts.first() else {
            tracing::warn!("wallet granted no accounts");
            return SessionState::failed(ErrorKind::TransportFailure);
        };
        if !chains.contains(handshake.chain_id) {
            tracing::warn!(
                chain_id = %handshake.chain_id,
                "wallet connected on an unsupported chain"
            );
            return SessionState::failed(ErrorKind::UnsupportedChain);
        }

        tracing::info!(
            address = %address,
            chain_id = %handshake.chain_id,
            connector = %self.connector.kind(),
            "wallet connected"
        );
        SessionState::Connected {
            address,
            chain_id: handshake.chain_id,
            connector_kind: self.connector.kind(),
        }
    }

    /// Apply a wallet notification in arrival order.
    pub(crate) fn handle_event(&self, event: WalletEvent) {
        let Some(config) = self.config.get() else {
            tracing::debug!(?event, "wallet event before initialize, ignoring");
            return;
        };

        {
            let mut core = self.core.lock();
            let next = match (event, &core.state) {
                (
                    WalletEvent::AccountsChanged(accounts),
                    SessionState::Connected {
                        address,
                        chain_id,
                        connector_kind,
                    },
                ) => match accounts.first() {
                    None => {
                        tracing::info!("wallet revoked account access");
                        Some(SessionState::Disconnected)
                    }
                    Some(account) if account == address => None,
                    Some(&account) => {
                        tracing::info!(address = %account, "wallet switched account");
                        Some(SessionState::Connected {
                            address: account,
                            chain_id: *chain_id,
                            connector_kind: *connector_kind,
                        })
                    }
                },
                (
                    WalletEvent::ChainChanged(to),
                    SessionState::Connected {
                        address,
                        chain_id,
                        connector_kind,
                    },
                ) => {
                    if to == *chain_id {
                        None
                    } else if config.chains().contains(to) {
                        tracing::info!(from = %chain_id, to = %to, "wallet changed chain");
                        Some(SessionState::Connected {
                            address: *address,
                            chain_id: to,
                            connector_kind: *connector_kind,
                        })
                    } else {
                        tracing::warn!(chain_id = %to, "wallet moved to an unsupported chain");
                        Some(SessionState::failed(ErrorKind::UnsupportedChain))
                    }
                }
                (
                    WalletEvent::Disconnected,
                    SessionState::Connecting { .. } | SessionState::Connected { .. },
                ) => {
                    tracing::info!("wallet ended the session");
                    Some(SessionState::Disconnected)
                }
                (event, state) => {
                    tracing::debug!(?event, state = state.name(), "ignoring wallet event");
                    None
                }
            };

            let Some(next) = next else {
                return;
            };
            // Leaving the connected session invalidates in-flight responses.
            if !next.is_connected() {
                core.advance();
            }
            core.commit(next);
        }
        self.drain();
    }

    /// Fire-and-forget wallet teardown.
    fn teardown(&self) {
        let connector = self.connector.clone();
        match Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    match AssertUnwindSafe(connector.disconnect()).catch_unwind().await {
                        Ok(Ok(())) => tracing::debug!("wallet teardown acknowledged"),
                        Ok(Err(kind)) => tracing::warn!(reason = %kind, "wallet teardown failed"),
                        Err(_) => tracing::error!("wallet connector panicked during teardown"),
                    }
                });
            }
            Err(_) => tracing::warn!("no tokio runtime, skipping wallet teardown"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionManager
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Owns the session state and drives it from user calls and wallet events.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl SessionManager {
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            shared: Arc::new(Shared {
                connector,
                config: OnceLock::new(),
                core: Mutex::new(Core {
                    state: SessionState::Disconnected,
                    generation: 0,
                    handshake: None,
                    pending: VecDeque::new(),
                    draining: false,
                }),
                listeners: Arc::new(ListenerSet::default()),
            }),
        }
    }

    /// Store `config` and attach to the connector's notifications.
    ///
    /// Must be called exactly once; a second call fails with
    /// [`Error::AlreadyInitialized`] and leaves the first configuration in
    /// place.
    pub fn initialize(&self, config: Configuration) -> Result<()> {
        let chains = config.chains().len();
        if self.shared.config.set(config).is_err() {
            tracing::warn!("session manager initialized twice");
            return Err(Error::AlreadyInitialized);
        }

        self.shared.connector.subscribe(self.event_sink());
        tracing::info!(
            connector = %self.shared.connector.kind(),
            chains,
            "session manager initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.config.get().is_some()
    }

    pub fn configuration(&self) -> Result<&Configuration> {
        self.shared.config.get().ok_or(Error::NotInitialized)
    }

    /// An owned snapshot of the current state.
    pub fn current_state(&self) -> SessionState {
        self.shared.core.lock().state.clone()
    }

    /// Call `listener` after every committed transition, in commit order.
    pub fn on_state_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        self.shared.listeners.add(Arc::new(listener))
    }

    /// A sink that applies wallet notifications to this session.
    pub fn event_sink(&self) -> EventSink {
        EventSink::new(Arc::downgrade(&self.shared))
    }

    /// Start a wallet handshake.
    ///
    /// Returns immediately.  While a handshake is in flight or a wallet is
    /// connected this is a no-op.  `preferred_chain` must be configured.
    pub fn connect(&self, preferred_chain: Option<ChainId>) -> Result<ConnectAttempt> {
        let config = self.configuration()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime("connect"))?;

        let generation = {
            let mut core = self.shared.core.lock();
            match core.state {
                SessionState::Connecting { .. } => {
                    tracing::debug!("connect ignored, handshake already in flight");
                    return Ok(ConnectAttempt::AlreadyConnecting);
                }
                SessionState::Connected { .. } => {
                    tracing::debug!("connect ignored, already connected");
                    return Ok(ConnectAttempt::AlreadyConnected);
                }
                SessionState::Disconnected | SessionState::Error { .. } => {}
            }
            if let Some(chain_id) = preferred_chain {
                config.chains().resolve(chain_id)?;
            }

            core.advance();
            core.commit(SessionState::Connecting {
                requested_chain_id: preferred_chain,
            });
            core.generation
        };
        self.shared.drain();

        let request = HandshakeRequest {
            request_id: Uuid::new_v4(),
            preferred_chain,
            supported_chains: config.chains().chain_ids(),
            credential: config.credential().clone(),
            app: config.app().clone(),
        };
        let task = self.shared.clone().run_handshake(
            generation,
            request,
            config.chains().clone(),
            config.session().handshake_timeout(),
        );
        let handle = runtime.spawn(task);

        // The session may have moved on while listeners ran.
        {
            let mut core = self.shared.core.lock();
            if core.generation == generation {
                core.handshake = Some(handle.abort_handle());
            } else {
                handle.abort();
            }
        }
        Ok(ConnectAttempt::Started(handle))
    }

    /// Move to `Disconnected` now, from any state.
    ///
    /// Wallet teardown runs in the background and its outcome never touches
    /// session state.  Does nothing when already disconnected.
    pub fn disconnect(&self) {
        {
            let mut core = self.shared.core.lock();
            if core.state == SessionState::Disconnected {
                return;
            }
            core.advance();
            core.commit(SessionState::Disconnected);
        }
        tracing::info!("session disconnected");
        self.shared.drain();
        self.shared.teardown();
    }

    /// Ask the wallet to move to `chain_id` and record it on acceptance.
    ///
    /// Only valid while connected.  A refusal or timeout returns
    /// [`Error::SwitchRejected`] and keeps the current chain.
    pub async fn switch_chain(&self, chain_id: ChainId) -> Result<()> {
        let config = self.configuration()?;
        config.chains().resolve(chain_id)?;

        let (generation, from) = {
            let core = self.shared.core.lock();
            match core.state {
                SessionState::Connected { chain_id: current, .. } => (core.generation, current),
                ref other => {
                    return Err(Error::InvalidState {
                        operation: "switch_chain",
                        state: other.name(),
                    })
                }
            }
        };
        if from == chain_id {
            tracing::debug!(chain_id = %chain_id, "already on requested chain");
            return Ok(());
        }

        let timeout = config.session().switch_timeout();
        let call = AssertUnwindSafe(self.shared.connector.switch_chain(chain_id)).catch_unwind();
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                tracing::error!("wallet connector panicked during chain switch");
                Err(ErrorKind::TransportFailure)
            }
            Err(_) => Err(ErrorKind::Timeout),
        };
        if let Err(kind) = outcome {
            tracing::warn!(from = %from, to = %chain_id, reason = %kind, "chain switch rejected");
            return Err(Error::SwitchRejected(kind));
        }

        {
            let mut core = self.shared.core.lock();
            let current = match core.state {
                SessionState::Connected {
                    address,
                    chain_id: current,
                    connector_kind,
                } if core.generation == generation => Some((address, current, connector_kind)),
                _ => None,
            };
            let Some((address, current, connector_kind)) = current else {
                TraceEvent::StaleResponseDiscarded {
                    generation,
                    current_generation: core.generation,
                    response: "switch_chain",
                }
                .emit();
                return Err(Error::Superseded("switch_chain"));
            };
            // A matching chainChanged notification may have landed first.
            if current == chain_id {
                return Ok(());
            }
            core.commit(SessionState::Connected {
                address,
                chain_id,
                connector_kind,
            });
        }

        TraceEvent::ChainSwitched { from, to: chain_id }.emit();
        self.shared.drain();
        Ok(())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.shared.core.lock();
        f.debug_struct("SessionManager")
            .field("connector", &self.shared.connector.kind())
            .field("initialized", &self.is_initialized())
            .field("state", &core.state.name())
            .field("generation", &core.generation)
            .field("listeners", &self.shared.listeners.len())
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
