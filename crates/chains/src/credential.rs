//! Relay project credential.
//!
//! The relay accepts pairing requests only with a valid project id and
//! rejects empty ones without a useful error, so an empty credential is a
//! fatal startup error here rather than a degraded mode.

use wl_domain::config::RelayConfig;
use wl_domain::error::{Error, Result};

/// The credential as configured, before validation.
#[derive(Clone)]
pub struct CredentialConfig {
    value: String,
    /// Env var the value was (or would have been) read from; used in errors.
    source_env: String,
}

impl CredentialConfig {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source_env: RelayConfig::default().project_id_env,
        }
    }

    /// Resolve from `[relay]`: direct value, then env var, else empty.
    pub fn from_relay(relay: &RelayConfig) -> Self {
        Self {
            value: relay.resolve_project_id().unwrap_or_default(),
            source_env: relay.project_id_env.clone(),
        }
    }

    /// Fail with [`Error::MissingCredential`] when the value is blank.
    pub fn validate(self) -> Result<RelayCredential> {
        let value = self.value.trim();
        if value.is_empty() {
            tracing::error!(env = %self.source_env, "relay project id is missing");
            return Err(Error::MissingCredential {
                env: self.source_env,
            });
        }
        Ok(RelayCredential(value.to_owned()))
    }
}

// Manual Debug impl to avoid leaking the credential.
impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("set", &!self.value.trim().is_empty())
            .field("source_env", &self.source_env)
            .finish()
    }
}

/// A validated, non-empty relay project id.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayCredential(String);

impl RelayCredential {
    /// The raw value, for handing to a wallet connector.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Last four characters only, e.g. `****4c5e`.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("****{tail}")
    }
}

impl std::fmt::Debug for RelayCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RelayCredential({})", self.masked())
    }
}
