//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::client::ClientArgs;

#[derive(Parser, Debug)]
#[command(name = "dlclient")]
#[command(about = "dlclient - download client configuration store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .dlclient/config.yaml and .dlclient/local.yaml)
    #[arg(short, long, global = true, env = "DLCLIENT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download client management commands
    Client(ClientArgs),
}
