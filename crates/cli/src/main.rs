use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::cli::{Cli, Command, ConfigCommand};
use wl_domain::config::{LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = wl_cli::cli::load_config()?;
            init_tracing(&config.logging);
            if !wl_cli::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _config_path) = wl_cli::cli::load_config()?;
            init_tracing(&config.logging);
            wl_cli::cli::config::show(&config)
        }
        Command::Chains { probe } => {
            let (config, _config_path) = wl_cli::cli::load_config()?;
            init_tracing(&config.logging);
            if !wl_cli::cli::chains::run(&config, probe).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Version => {
            println!("walletctl {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Install the stderr subscriber.  `RUST_LOG` wins over the configured
/// filter.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
