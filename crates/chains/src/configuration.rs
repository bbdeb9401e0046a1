//! The immutable runtime configuration consumed by the session manager.

use std::sync::Arc;

use wl_domain::config::{ensure_valid, AppMetadata, Config, SessionConfig};
use wl_domain::error::Result;
use wl_domain::ChainDescriptor;

use crate::credential::{CredentialConfig, RelayCredential};
use crate::registry::ChainRegistry;
use crate::transport::TransportResolver;

/// Validated networks, relay credential and app metadata.
///
/// Only obtainable through [`ConfigurationBuilder::build`] or
/// [`Configuration::from_config`], both of which validate the credential
/// first, so holding a `Configuration` proves the relay can be used.
#[derive(Debug, Clone)]
pub struct Configuration {
    chains: Arc<ChainRegistry>,
    credential: RelayCredential,
    app: AppMetadata,
    session: SessionConfig,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Build from the file-level [`Config`].
    ///
    /// Any error-level issue from [`Config::validate`] fails the build with
    /// [`Error::Config`](wl_domain::Error::Config), after the credential check.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credential = CredentialConfig::from_relay(&config.relay).validate()?;
        ensure_valid(&config.validate())?;
        let chains = ChainRegistry::from_config(&config.chains)?;

        tracing::info!(
            chains = chains.len(),
            credential = %credential.masked(),
            app = %config.app.name,
            "configuration built"
        );

        Ok(Self {
            chains: Arc::new(chains),
            credential,
            app: config.app.clone(),
            session: config.session.clone(),
        })
    }

    pub fn chains(&self) -> &Arc<ChainRegistry> {
        &self.chains
    }

    pub fn credential(&self) -> &RelayCredential {
        &self.credential
    }

    pub fn app(&self) -> &AppMetadata {
        &self.app
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// A fresh resolver over this configuration's chains.
    pub fn transport_resolver(&self) -> TransportResolver {
        TransportResolver::new(self.chains.clone(), self.session.transport_cooldown())
    }
}

/// Fluent builder for [`Configuration`].
///
/// ```rust,no_run
/// # use wl_chains::Configuration;
/// # use wl_domain::ChainDescriptor;
/// let config = Configuration::builder()
///     .credential("project-id")
///     .chain(ChainDescriptor::new(1, "Ethereum", "ETH", vec![]))
///     .build()
///     .unwrap();
/// ```
pub struct ConfigurationBuilder {
    chains: Vec<ChainDescriptor>,
    credential: CredentialConfig,
    app: AppMetadata,
    session: SessionConfig,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            chains: Vec::new(),
            credential: CredentialConfig::new(""),
            app: AppMetadata::default(),
            session: SessionConfig::default(),
        }
    }

    pub fn chain(mut self, descriptor: ChainDescriptor) -> Self {
        self.chains.push(descriptor);
        self
    }

    pub fn credential(mut self, value: impl Into<String>) -> Self {
        self.credential = CredentialConfig::new(value);
        self
    }

    pub fn app(mut self, app: AppMetadata) -> Self {
        self.app = app;
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Validate the credential, the app metadata and the session timing,
    /// then register every chain.
    pub fn build(self) -> Result<Configuration> {
        let credential = self.credential.validate()?;

        let mut issues = self.app.validate();
        issues.extend(self.session.validate());
        ensure_valid(&issues)?;

        let mut chains = ChainRegistry::new();
        for descriptor in self.chains {
            chains.register(descriptor)?;
        }

        Ok(Configuration {
            chains: Arc::new(chains),
            credential,
            app: self.app,
            session: self.session,
        })
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wl_domain::config::RelayConfig;
    use wl_domain::{ChainId, Error};

    #[test]
    fn builder_requires_credential() {
        let err = Configuration::builder()
            .chain(ChainDescriptor::new(1, "Ethereum", "ETH", vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential { .. }));
    }

    #[test]
    fn builder_rejects_duplicate_chain() {
        let err = Configuration::builder()
            .credential("abc")
            .chain(ChainDescriptor::new(1, "Ethereum", "ETH", vec![]))
            .chain(ChainDescriptor::new(1, "Again", "ETH", vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateChain(ChainId(1))));
    }

    #[test]
    fn credential_checked_before_chains() {
        let err = Configuration::builder()
            .chain(ChainDescriptor::new(1, "Ethereum", "ETH", vec![]))
            .chain(ChainDescriptor::new(1, "Again", "ETH", vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential { .. }));
    }

    #[test]
    fn from_default_config_with_project_id() {
        let config = Config {
            relay: RelayConfig {
                project_id: Some("abc".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let built = Configuration::from_config(&config).unwrap();
        assert_eq!(built.chains().len(), 3);
        assert_eq!(built.credential().expose(), "abc");

        let resolver = built.transport_resolver();
        assert_eq!(
            resolver.endpoint_for(ChainId(1)).unwrap().as_str(),
            "https://ethereum-public.nodies.app/"
        );
    }

    #[test]
    fn from_config_rejects_what_validate_rejects() {
        let mut config = Config {
            relay: RelayConfig {
                project_id: Some("abc".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        config.app.name = String::new();
        config.session.handshake_timeout_ms = 0;

        let err = Configuration::from_config(&config).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Config(_)));
        assert!(msg.contains("app.name"));
        assert!(msg.contains("session.handshake_timeout_ms"));
    }

    #[test]
    fn from_config_accepts_warnings() {
        let mut config = Config {
            relay: RelayConfig {
                project_id: Some("abc".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        config.app.icon_url = Some("/logo.png".into());
        config.session.transport_cooldown_ms = 0;
        assert!(Configuration::from_config(&config).is_ok());
    }

    #[test]
    fn builder_rejects_empty_app_name() {
        let err = Configuration::builder()
            .credential("abc")
            .app(AppMetadata {
                name: "  ".into(),
                ..Default::default()
            })
            .chain(ChainDescriptor::new(1, "Ethereum", "ETH", vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("app.name")));
    }

    #[test]
    fn builder_rejects_zero_timeouts() {
        for session in [
            SessionConfig {
                handshake_timeout_ms: 0,
                ..Default::default()
            },
            SessionConfig {
                switch_timeout_ms: 0,
                ..Default::default()
            },
        ] {
            let err = Configuration::builder()
                .credential("abc")
                .session(session)
                .chain(ChainDescriptor::new(1, "Ethereum", "ETH", vec![]))
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::Config(ref m) if m.contains("timeout")));
        }
    }

    #[test]
    fn from_config_without_project_id_fails() {
        let config = Config {
            relay: RelayConfig {
                project_id_env: "WL_TEST_CONFIGURATION_NEVER_SET".into(),
                project_id: None,
            },
            ..Default::default()
        };
        assert!(matches!(
            Configuration::from_config(&config),
            Err(Error::MissingCredential { .. })
        ));
    }
}
