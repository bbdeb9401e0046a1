//! Chain identifiers and immutable chain descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ChainConfig;
use crate::error::{Error, Result};

/// EIP-155 chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A supported network: identity, display data and the ordered list of RPC
/// transports to try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    pub chain_id: ChainId,
    pub name: String,
    pub native_currency: String,
    /// Tried in listed order.
    pub transports: Vec<Url>,
}

impl ChainDescriptor {
    pub fn new(
        chain_id: impl Into<ChainId>,
        name: impl Into<String>,
        native_currency: impl Into<String>,
        transports: Vec<Url>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            name: name.into(),
            native_currency: native_currency.into(),
            transports,
        }
    }

    /// Build a descriptor from its config entry, parsing every transport URL.
    ///
    /// Only `http` and `https` transports are accepted.
    pub fn from_config(cfg: &ChainConfig) -> Result<Self> {
        let chain_id = ChainId(cfg.chain_id);
        let transports = cfg
            .transports
            .iter()
            .map(|raw| parse_transport(chain_id, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            chain_id,
            name: cfg.name.clone(),
            native_currency: cfg.native_currency.clone(),
            transports,
        })
    }
}

pub(crate) fn parse_transport(chain_id: ChainId, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidTransport {
        chain_id,
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidTransport {
            chain_id,
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_keeps_transport_order() {
        let cfg = ChainConfig {
            chain_id: 1,
            name: "Ethereum".into(),
            native_currency: "ETH".into(),
            transports: vec![
                "https://a.example/rpc".into(),
                "https://b.example/rpc".into(),
            ],
        };
        let desc = ChainDescriptor::from_config(&cfg).unwrap();
        assert_eq!(desc.chain_id, ChainId(1));
        assert_eq!(desc.transports[0].as_str(), "https://a.example/rpc");
        assert_eq!(desc.transports[1].as_str(), "https://b.example/rpc");
    }

    #[test]
    fn rejects_websocket_transport() {
        let cfg = ChainConfig {
            chain_id: 137,
            name: "Polygon".into(),
            native_currency: "POL".into(),
            transports: vec!["wss://polygon.example".into()],
        };
        let err = ChainDescriptor::from_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidTransport { chain_id: ChainId(137), .. }));
    }

    #[test]
    fn rejects_garbage_transport() {
        let err = parse_transport(ChainId(1), "not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidTransport { .. }));
    }
}
