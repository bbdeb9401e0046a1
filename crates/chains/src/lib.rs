//! Static network configuration for a walletlink session: the chain
//! registry, RPC transport selection with failure fallback, the relay
//! credential, and the immutable [`Configuration`] handed to the session
//! manager.

pub mod configuration;
pub mod credential;
pub mod probe;
pub mod registry;
pub mod transport;

// Re-exports for convenience.
pub use configuration::{Configuration, ConfigurationBuilder};
pub use credential::{CredentialConfig, RelayCredential};
pub use probe::{probe_chain, ProbeReport};
pub use registry::ChainRegistry;
pub use transport::TransportResolver;
