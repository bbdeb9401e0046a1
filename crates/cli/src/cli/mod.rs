pub mod chains;
pub mod config;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use wl_domain::config::Config;

/// walletctl: inspect and check walletlink configurations.
#[derive(Debug, Parser)]
#[command(name = "walletctl", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// List configured chains and the RPC endpoint each would use.
    Chains {
        /// Send `eth_chainId` to each chain's transports and report which
        /// one answers.
        #[arg(long)]
        probe: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

pub const CONFIG_ENV: &str = "WALLETLINK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "walletlink.toml";

/// Load the configuration from the path in `WALLETLINK_CONFIG` (or
/// `walletlink.toml`).  Returns the parsed [`Config`] and the path used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path =
        std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path`, or fall back to [`Config::default`] when it does not exist.
pub fn load_config_from(path: &str) -> anyhow::Result<Config> {
    if !Path::new(path).exists() {
        tracing::debug!(path, "config file not found, using defaults");
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    toml::from_str(&raw).with_context(|| format!("parsing {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.chains.len(), 3);
    }

    #[test]
    fn reads_chains_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[relay]
project_id = "abc"

[[chains]]
chain_id = 137
name = "Polygon"
native_currency = "POL"
transports = ["https://polygon-rpc.com"]
"#
        )
        .unwrap();

        let config = load_config_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.chains.len(), 1);
        assert_eq!(config.chains[0].chain_id, 137);
        assert_eq!(config.relay.project_id.as_deref(), Some("abc"));
    }

    #[test]
    fn parse_error_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[chains]]\nchain_id = \"one\"").unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains(&path));
    }

    #[test]
    fn cli_parses_probe_flag() {
        let cli = Cli::try_parse_from(["walletctl", "chains", "--probe"]).unwrap();
        assert!(matches!(cli.command, Command::Chains { probe: true }));

        let cli = Cli::try_parse_from(["walletctl", "config", "validate"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Validate)));
    }
}
