//! dlclient CLI entry point.

use anyhow::Result;
use clap::Parser;

use dlclient::cli::{handle_error, Cli, Commands};
use dlclient::infrastructure::config::ConfigLoader;
use dlclient::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Client(args) => {
            dlclient::cli::commands::client::execute(args, &config, cli.json).await
        }
    }
}
