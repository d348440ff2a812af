//! Download client domain model.
//!
//! A download client is a configured endpoint of an external download engine
//! (torrent client, usenet downloader, or *arr application) that actions
//! dispatch work to.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Protocol spoken by a download client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadClientType {
    Qbittorrent,
    DelugeV1,
    DelugeV2,
    Rtorrent,
    Transmission,
    Porla,
    Radarr,
    Sonarr,
    Lidarr,
    Whisparr,
    Readarr,
    Sabnzbd,
}

impl DownloadClientType {
    pub const ALL: [Self; 12] = [
        Self::Qbittorrent,
        Self::DelugeV1,
        Self::DelugeV2,
        Self::Rtorrent,
        Self::Transmission,
        Self::Porla,
        Self::Radarr,
        Self::Sonarr,
        Self::Lidarr,
        Self::Whisparr,
        Self::Readarr,
        Self::Sabnzbd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qbittorrent => "qbittorrent",
            Self::DelugeV1 => "deluge_v1",
            Self::DelugeV2 => "deluge_v2",
            Self::Rtorrent => "rtorrent",
            Self::Transmission => "transmission",
            Self::Porla => "porla",
            Self::Radarr => "radarr",
            Self::Sonarr => "sonarr",
            Self::Lidarr => "lidarr",
            Self::Whisparr => "whisparr",
            Self::Readarr => "readarr",
            Self::Sabnzbd => "sabnzbd",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for DownloadClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP basic auth in front of the client's web API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub auth: bool,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// When slow torrents are skipped. Stored in the upstream spelling
/// (`ALWAYS`, `MAX_DOWNLOADS_REACHED`); values this crate does not know are
/// kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlowTorrentCondition {
    #[default]
    Always,
    MaxDownloadsReached,
    Other(String),
}

impl From<String> for SlowTorrentCondition {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ALWAYS" => Self::Always,
            "MAX_DOWNLOADS_REACHED" => Self::MaxDownloadsReached,
            _ => Self::Other(value),
        }
    }
}

impl From<SlowTorrentCondition> for String {
    fn from(value: SlowTorrentCondition) -> Self {
        match value {
            SlowTorrentCondition::Always => "ALWAYS".to_string(),
            SlowTorrentCondition::MaxDownloadsReached => "MAX_DOWNLOADS_REACHED".to_string(),
            SlowTorrentCondition::Other(raw) => raw,
        }
    }
}

/// Client-specific dispatch rules. Opaque to the store; keys without a field
/// here are carried in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadClientRules {
    pub enabled: bool,
    pub max_active_downloads: i32,
    pub ignore_slow_torrents: bool,
    pub ignore_slow_torrents_condition: SlowTorrentCondition,
    pub download_speed_threshold: i64,
    pub upload_speed_threshold: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Settings persisted as a JSON blob inside the client row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClientSettings {
    #[serde(rename = "apikey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicAuth>,
    #[serde(default)]
    pub rules: DownloadClientRules,
}

/// A download client configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadClient {
    /// Assigned by the store on creation; `0` until then.
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub client_type: DownloadClientType,
    pub enabled: bool,
    pub host: String,
    pub port: i32,
    pub tls: bool,
    pub tls_skip_verify: bool,
    pub username: String,
    pub password: String,
    pub settings: DownloadClientSettings,
}

impl DownloadClient {
    /// Create an enabled client with no credentials and default settings.
    pub fn new(
        name: impl Into<String>,
        client_type: DownloadClientType,
        host: impl Into<String>,
        port: i32,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            client_type,
            enabled: true,
            host: host.into(),
            port,
            tls: false,
            tls_skip_verify: false,
            username: String::new(),
            password: String::new(),
            settings: DownloadClientSettings::default(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationFailed("name cannot be empty".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(DomainError::ValidationFailed(format!(
                "client '{}': host cannot be empty",
                self.name
            )));
        }
        if !(0..=65535).contains(&self.port) {
            return Err(DomainError::ValidationFailed(format!(
                "client '{}': port {} out of range",
                self.name, self.port
            )));
        }
        Ok(())
    }
}
