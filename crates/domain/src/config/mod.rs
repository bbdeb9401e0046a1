mod chains;
mod logging;
mod relay;
mod session;

pub use chains::*;
pub use logging::*;
pub use relay::*;
pub use session::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::chain::{parse_transport, ChainId};
use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub app: AppMetadata,
    /// Supported networks, in display order.
    #[serde(default = "d_chains")]
    pub chains: Vec<ChainConfig>,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            app: AppMetadata::default(),
            chains: d_chains(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

/// Fail with [`Error::Config`] when any issue is error-level.  Warnings are
/// ignored.
pub fn ensure_valid(issues: &[ConfigIssue]) -> Result<()> {
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(errors.join("; ")))
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.relay.resolve_project_id().is_none() {
            issues.push(ConfigIssue::error(
                "relay.project_id",
                format!(
                    "relay project id is not set (set relay.project_id or ${})",
                    self.relay.project_id_env
                ),
            ));
        }

        issues.extend(self.app.validate());

        if self.chains.is_empty() {
            issues.push(ConfigIssue::error("chains", "at least one chain must be configured"));
        }

        let mut seen = HashSet::new();
        for (i, chain) in self.chains.iter().enumerate() {
            if chain.chain_id == 0 {
                issues.push(ConfigIssue::error(
                    format!("chains[{i}].chain_id"),
                    "chain id must be greater than 0",
                ));
            } else if !seen.insert(chain.chain_id) {
                issues.push(ConfigIssue::error(
                    format!("chains[{i}].chain_id"),
                    format!("chain {} is listed more than once", chain.chain_id),
                ));
            }

            if chain.transports.is_empty() {
                issues.push(ConfigIssue::error(
                    format!("chains[{i}].transports"),
                    "at least one RPC transport is required",
                ));
            }
            for (j, raw) in chain.transports.iter().enumerate() {
                if let Err(e) = parse_transport(ChainId(chain.chain_id), raw) {
                    issues.push(ConfigIssue::error(
                        format!("chains[{i}].transports[{j}]"),
                        e.to_string(),
                    ));
                }
            }
        }

        issues.extend(self.session.validate());

        issues
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
