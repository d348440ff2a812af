//! Download client CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteDownloadClientRepository};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Config, DownloadClient, DownloadClientType};
use crate::domain::ports::DownloadClientRepository;

#[derive(Args, Debug)]
pub struct ClientArgs {
    #[command(subcommand)]
    pub command: ClientCommands,
}

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List configured download clients
    List,
    /// Show a download client
    Show {
        /// Client ID
        id: i32,
    },
    /// Add a download client
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Client protocol (qbittorrent, deluge_v2, transmission, sonarr, ...)
        #[arg(long = "type", value_parser = parse_client_type)]
        client_type: DownloadClientType,
        /// Host name or address
        #[arg(long)]
        host: String,
        /// Port
        #[arg(long)]
        port: i32,
        #[command(flatten)]
        options: ClientOptions,
    },
    /// Replace fields of an existing download client
    Update {
        /// Client ID
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type", value_parser = parse_client_type)]
        client_type: Option<DownloadClientType>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<i32>,
        #[command(flatten)]
        options: ClientOptions,
    },
    /// Remove a download client and detach its actions
    Remove {
        /// Client ID
        id: i32,
    },
}

/// Optional fields shared by `add` and `update`.
#[derive(Args, Debug, Default)]
pub struct ClientOptions {
    /// Enable or disable the client
    #[arg(long)]
    pub enabled: Option<bool>,
    /// Connect over TLS
    #[arg(long)]
    pub tls: Option<bool>,
    /// Skip TLS certificate verification
    #[arg(long)]
    pub tls_skip_verify: Option<bool>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// API key for *arr and usenet clients
    #[arg(long)]
    pub api_key: Option<String>,
}

impl ClientOptions {
    fn apply(self, client: &mut DownloadClient) {
        if let Some(enabled) = self.enabled {
            client.enabled = enabled;
        }
        if let Some(tls) = self.tls {
            client.tls = tls;
        }
        if let Some(skip) = self.tls_skip_verify {
            client.tls_skip_verify = skip;
        }
        if let Some(username) = self.username {
            client.username = username;
        }
        if let Some(password) = self.password {
            client.password = password;
        }
        if let Some(api_key) = self.api_key {
            client.settings.api_key = Some(api_key);
        }
    }
}

fn parse_client_type(s: &str) -> Result<DownloadClientType, String> {
    DownloadClientType::from_str(s).ok_or_else(|| {
        let known: Vec<&str> = DownloadClientType::ALL
            .iter()
            .map(DownloadClientType::as_str)
            .collect();
        format!("unknown client type '{s}' (expected one of: {})", known.join(", "))
    })
}

#[derive(Debug, Serialize)]
pub struct ClientOutput {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub client_type: String,
    pub enabled: bool,
    pub host: String,
    pub port: i32,
    pub tls: bool,
    pub tls_skip_verify: bool,
    pub username: String,
    pub has_password: bool,
    pub has_api_key: bool,
}

impl From<&DownloadClient> for ClientOutput {
    fn from(c: &DownloadClient) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            client_type: c.client_type.as_str().to_string(),
            enabled: c.enabled,
            host: c.host.clone(),
            port: c.port,
            tls: c.tls,
            tls_skip_verify: c.tls_skip_verify,
            username: c.username.clone(),
            has_password: !c.password.is_empty(),
            has_api_key: c.settings.api_key.as_deref().is_some_and(|k| !k.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientListOutput {
    pub clients: Vec<ClientOutput>,
    pub total: usize,
}

impl CommandOutput for ClientListOutput {
    fn to_human(&self) -> String {
        if self.clients.is_empty() {
            return "No download clients configured.".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                ["ID", "Name", "Type", "Enabled", "Address"]
                    .into_iter()
                    .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
            );

        for c in &self.clients {
            let scheme = if c.tls { "https" } else { "http" };
            table.add_row(vec![
                Cell::new(c.id),
                Cell::new(truncate(&c.name, 30)),
                Cell::new(&c.client_type),
                Cell::new(if c.enabled { "yes" } else { "no" }),
                Cell::new(format!("{scheme}://{}:{}", c.host, c.port)),
            ]);
        }

        format!("{table}\n{} client(s)", self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ClientDetailOutput {
    pub client: ClientOutput,
}

impl CommandOutput for ClientDetailOutput {
    fn to_human(&self) -> String {
        let c = &self.client;
        let mut lines = vec![
            format!("Client: {} ({})", c.name, c.id),
            format!("Type: {}", c.client_type),
            format!("Enabled: {}", c.enabled),
            format!("Host: {}:{}", c.host, c.port),
            format!("TLS: {} (skip verify: {})", c.tls, c.tls_skip_verify),
        ];

        if !c.username.is_empty() {
            lines.push(format!("Username: {}", c.username));
        }
        if c.has_password {
            lines.push("Password: ********".to_string());
        }
        if c.has_api_key {
            lines.push("API key: ********".to_string());
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ClientActionOutput {
    pub success: bool,
    pub message: String,
    pub client: Option<ClientOutput>,
}

impl CommandOutput for ClientActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClientCommandOutput {
    List(ClientListOutput),
    Detail(ClientDetailOutput),
    Action(ClientActionOutput),
}

impl CommandOutput for ClientCommandOutput {
    fn to_human(&self) -> String {
        match self {
            Self::List(o) => o.to_human(),
            Self::Detail(o) => o.to_human(),
            Self::Action(o) => o.to_human(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::List(o) => o.to_json(),
            Self::Detail(o) => o.to_json(),
            Self::Action(o) => o.to_json(),
        }
    }
}

/// Run one client subcommand against `repo`.
pub async fn handle<R: DownloadClientRepository + ?Sized>(
    repo: &R,
    command: ClientCommands,
) -> Result<ClientCommandOutput> {
    let out = match command {
        ClientCommands::List => {
            let clients = repo.list().await.context("Failed to list download clients")?;
            ClientCommandOutput::List(ClientListOutput {
                total: clients.len(),
                clients: clients.iter().map(ClientOutput::from).collect(),
            })
        }

        ClientCommands::Show { id } => {
            let client = repo.find_by_id(id).await?;
            ClientCommandOutput::Detail(ClientDetailOutput {
                client: ClientOutput::from(client.as_ref()),
            })
        }

        ClientCommands::Add {
            name,
            client_type,
            host,
            port,
            options,
        } => {
            let mut client = DownloadClient::new(name, client_type, host, port);
            options.apply(&mut client);
            client.validate()?;

            let stored = repo.store(client).await.context("Failed to store download client")?;
            ClientCommandOutput::Action(ClientActionOutput {
                success: true,
                message: format!("Download client '{}' added with ID {}", stored.name, stored.id),
                client: Some(ClientOutput::from(stored.as_ref())),
            })
        }

        ClientCommands::Update {
            id,
            name,
            client_type,
            host,
            port,
            options,
        } => {
            let mut client = repo.find_by_id(id).await?.as_ref().clone();
            if let Some(name) = name {
                client.name = name;
            }
            if let Some(client_type) = client_type {
                client.client_type = client_type;
            }
            if let Some(host) = host {
                client.host = host;
            }
            if let Some(port) = port {
                client.port = port;
            }
            options.apply(&mut client);
            client.validate()?;

            let updated = repo.update(client).await.context("Failed to update download client")?;
            ClientCommandOutput::Action(ClientActionOutput {
                success: true,
                message: format!("Download client {} updated", updated.id),
                client: Some(ClientOutput::from(updated.as_ref())),
            })
        }

        ClientCommands::Remove { id } => {
            repo.delete(id).await?;
            ClientCommandOutput::Action(ClientActionOutput {
                success: true,
                message: format!("Download client {id} removed"),
                client: None,
            })
        }
    };

    Ok(out)
}

pub async fn execute(args: ClientArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = initialize_database(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;

    let repo = SqliteDownloadClientRepository::with_config(pool.clone(), config.repository.clone());
    let result = handle(&repo, args.command).await;
    pool.close().await;

    output(&result?, json_mode);
    Ok(())
}
