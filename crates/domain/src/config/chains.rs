use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chains
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One `[[chains]]` entry.  Transport URLs are kept as raw strings here and
/// parsed when the runtime configuration is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub native_currency: String,
    /// RPC endpoints, tried in listed order.
    #[serde(default)]
    pub transports: Vec<String>,
}

impl ChainConfig {
    /// Ethereum mainnet.
    pub fn mainnet() -> Self {
        Self {
            chain_id: 1,
            name: "Ethereum".into(),
            native_currency: "ETH".into(),
            transports: vec!["https://ethereum-public.nodies.app".into()],
        }
    }

    /// Polygon PoS.
    pub fn polygon() -> Self {
        Self {
            chain_id: 137,
            name: "Polygon".into(),
            native_currency: "POL".into(),
            transports: vec!["https://polygon-rpc.com".into()],
        }
    }

    /// Avalanche C-Chain.
    pub fn avalanche() -> Self {
        Self {
            chain_id: 43114,
            name: "Avalanche".into(),
            native_currency: "AVAX".into(),
            transports: vec!["https://api.avax.network/ext/bc/C/rpc".into()],
        }
    }
}

pub(super) fn d_chains() -> Vec<ChainConfig> {
    vec![
        ChainConfig::mainnet(),
        ChainConfig::polygon(),
        ChainConfig::avalanche(),
    ]
}
