use serde::{Deserialize, Serialize};

use super::ConfigIssue;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Relay credential
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Env var holding the relay project id.  Consulted only when
    /// `project_id` is not set.
    #[serde(default = "d_project_id_env")]
    pub project_id_env: String,
    /// Direct project id (for config-only setups; prefer the env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            project_id_env: d_project_id_env(),
            project_id: None,
        }
    }
}

impl RelayConfig {
    /// Resolve the project id: direct value first, then the env var.
    /// Blank values count as absent.
    pub fn resolve_project_id(&self) -> Option<String> {
        if let Some(id) = self.project_id.as_deref().map(str::trim) {
            if !id.is_empty() {
                return Some(id.to_owned());
            }
        }
        std::env::var(&self.project_id_env)
            .ok()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }
}

fn d_project_id_env() -> String {
    "WALLETCONNECT_PROJECT_ID".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// App metadata
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Display metadata shown by the wallet during pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default = "d_app_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Square icon, no bigger than 1024x1024px / 1MB.  Not enforced here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: d_app_name(),
            description: String::new(),
            url: None,
            icon_url: None,
        }
    }
}

impl AppMetadata {
    /// An empty name is an error; a non-absolute url or icon only warns.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::error("app.name", "app name must not be empty"));
        }
        for (field, value) in [("app.url", &self.url), ("app.icon_url", &self.icon_url)] {
            if let Some(raw) = value {
                if url::Url::parse(raw).is_err() {
                    issues.push(ConfigIssue::warning(
                        field,
                        format!("'{raw}' is not an absolute URL"),
                    ));
                }
            }
        }
        issues
    }
}

fn d_app_name() -> String {
    "walletlink".into()
}
