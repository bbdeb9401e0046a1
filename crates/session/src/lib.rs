//! `wl-session`: the wallet connection session manager.
//!
//! A [`SessionManager`] owns the single authoritative [`SessionState`] for
//! one dApp session.  It is driven by explicit calls from presentation code
//! (`connect`, `disconnect`, `switch_chain`) and by notifications from the
//! external wallet, which reach it through an [`EventSink`].
//!
//! ```text
//!                connect()                 handshake ok
//!  Disconnected ───────────► Connecting ─────────────────► Connected
//!       ▲                        │                            │  │
//!       │                        │ rejected / timeout /       │  │ accountsChanged(addr)
//!       │                        │ transport failure          │  │ chainChanged / switch_chain
//!       │                        ▼                            │  ▼
//!       │     connect()        Error ◄── unsupported chain ───┘ Connected'
//!       │   ┌──────────────────┘
//!       │   ▼
//!       └── disconnect() / accountsChanged([]) / wallet disconnected
//! ```
//!
//! Every committed transition is delivered to listeners registered with
//! [`SessionManager::on_state_change`], in commit order.  [`project`] turns a
//! state into the status line shown to the user.

pub mod connector;
pub mod listeners;
pub mod manager;
pub mod state;
pub mod status;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use connector::{EventSink, Handshake, HandshakeRequest, WalletConnector, WalletEvent};
pub use listeners::Subscription;
pub use manager::{ConnectAttempt, SessionManager};
pub use state::{ConnectorKind, SessionState};
pub use status::project;
