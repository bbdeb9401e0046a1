//! Chain registry.
//!
//! Holds every supported network, keyed by chain id, in registration order.
//! The registry is filled while the [`Configuration`](crate::Configuration)
//! is being built and is only read afterwards.

use std::collections::HashMap;

use wl_domain::config::ChainConfig;
use wl_domain::error::{Error, Result};
use wl_domain::trace::TraceEvent;
use wl_domain::{ChainDescriptor, ChainId};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ChainRegistry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default)]
pub struct ChainRegistry {
    chains: Vec<ChainDescriptor>,
    index: HashMap<ChainId, usize>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `[[chains]]` config entries.
    ///
    /// Unlike provider registration, a bad chain entry aborts the whole
    /// build: a session must never start with a partial network list.
    pub fn from_config(chains: &[ChainConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for cfg in chains {
            registry.register(ChainDescriptor::from_config(cfg)?)?;
        }
        Ok(registry)
    }

    /// Add a chain.  Fails with [`Error::DuplicateChain`] when the id is
    /// already present and [`Error::InvalidChain`] for chain id 0.
    pub fn register(&mut self, descriptor: ChainDescriptor) -> Result<()> {
        let chain_id = descriptor.chain_id;
        if chain_id.0 == 0 {
            return Err(Error::InvalidChain(chain_id));
        }
        if self.index.contains_key(&chain_id) {
            return Err(Error::DuplicateChain(chain_id));
        }

        tracing::info!(
            chain_id = %chain_id,
            name = %descriptor.name,
            transports = descriptor.transports.len(),
            "registered chain"
        );
        TraceEvent::ChainRegistered {
            chain_id,
            name: descriptor.name.clone(),
            transports: descriptor.transports.len(),
        }
        .emit();

        self.index.insert(chain_id, self.chains.len());
        self.chains.push(descriptor);
        Ok(())
    }

    /// Look up a chain by id.
    pub fn resolve(&self, chain_id: ChainId) -> Result<&ChainDescriptor> {
        self.index
            .get(&chain_id)
            .map(|&i| &self.chains[i])
            .ok_or(Error::UnknownChain(chain_id))
    }

    pub fn contains(&self, chain_id: ChainId) -> bool {
        self.index.contains_key(&chain_id)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.iter()
    }

    /// Registered chain ids, in registration order.
    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.iter().map(|c| c.chain_id).collect()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(id: u64) -> ChainDescriptor {
        ChainDescriptor::new(id, format!("chain-{id}"), "ETH", Vec::new())
    }

    #[test]
    fn register_and_resolve() {
        let mut reg = ChainRegistry::new();
        reg.register(chain(1)).unwrap();
        reg.register(chain(137)).unwrap();

        assert_eq!(reg.resolve(ChainId(137)).unwrap().name, "chain-137");
        assert!(reg.contains(ChainId(1)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut reg = ChainRegistry::new();
        reg.register(chain(1)).unwrap();
        let err = reg.register(chain(1)).unwrap_err();
        assert!(matches!(err, Error::DuplicateChain(ChainId(1))));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn zero_is_rejected() {
        let mut reg = ChainRegistry::new();
        assert!(matches!(
            reg.register(chain(0)),
            Err(Error::InvalidChain(ChainId(0)))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn unknown_chain() {
        let reg = ChainRegistry::new();
        assert!(matches!(
            reg.resolve(ChainId(5)),
            Err(Error::UnknownChain(ChainId(5)))
        ));
    }

    #[test]
    fn keeps_registration_order() {
        let mut reg = ChainRegistry::new();
        for id in [43114, 1, 137] {
            reg.register(chain(id)).unwrap();
        }
        assert_eq!(
            reg.chain_ids(),
            vec![ChainId(43114), ChainId(1), ChainId(137)]
        );
    }

    #[test]
    fn from_default_config() {
        let reg = ChainRegistry::from_config(&wl_domain::config::Config::default().chains).unwrap();
        assert_eq!(reg.chain_ids(), vec![ChainId(1), ChainId(137), ChainId(43114)]);
        assert_eq!(reg.resolve(ChainId(1)).unwrap().native_currency, "ETH");
    }
}
