// SPDX-FileCopyrightText: 2026 The packdeck Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Client-side mirror of the JSON shapes the agent exposes.
//!
//! Everything here is read-mostly snapshot data owned by the agent; the only
//! values we ever construct locally are `PackUrl`s (to start a download) and
//! the configuration document (to save it back).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Parsed pack URL: `irc://server/channel/bot/pack`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PackUrl {
    pub server: String,
    pub channel: String,
    pub bot: String,
    pub pack: i32,
}

impl PackUrl {
    /// Parse a pack URL. The channel may be given with or without its `#`
    /// prefix, and the pack number may carry a leading `#`.
    pub fn parse(url: &str) -> Result<Self, String> {
        if !url.starts_with("irc://") {
            return Err("URL must start with irc://".to_string());
        }

        let path = url.trim_start_matches("irc://");
        let parts: Vec<&str> = path.split('/').collect();

        if parts.len() != 4 {
            return Err("URL must have format: irc://server/channel/bot/pack".to_string());
        }

        let server = parts[0].to_string();
        let mut channel = parts[1].to_string();
        let bot = parts[2].to_string();

        if !channel.starts_with('#') {
            channel = format!("#{}", channel);
        }

        let pack = parts[3]
            .trim_start_matches('#')
            .parse::<i32>()
            .map_err(|_| format!("Invalid pack number: {}", parts[3]))?;

        Ok(Self {
            server,
            channel,
            bot,
            pack,
        })
    }

    pub fn to_url(&self) -> String {
        format!(
            "irc://{}/{}/{}/{}",
            self.server,
            self.channel.trim_start_matches('#'),
            self.bot,
            self.pack
        )
    }
}

impl fmt::Display for PackUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_url())
    }
}

/// One row returned by a provider search. Identity is positional within the
/// result set; nothing here is persisted client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub server: String,
    pub bot: String,
    pub channel: String,
    pub pack_number: i32,
    pub file_name: String,
    pub file_size: Option<u64>,
    pub downloads: Option<u32>,
}

impl SearchResult {
    pub fn pack_url(&self) -> PackUrl {
        PackUrl {
            server: self.server.clone(),
            channel: self.channel.clone(),
            bot: self.bot.clone(),
            pack: self.pack_number,
        }
    }
}

/// Transfer lifecycle as reported by the agent. The agent owns this state
/// machine; anything it reports outside the known set decodes as `Unknown`
/// and renders unstyled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Connecting,
    Joining,
    Requesting,
    Downloading,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    /// In transit but not yet moving data: progress is not meaningful here.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            TransferStatus::Pending
                | TransferStatus::Connecting
                | TransferStatus::Joining
                | TransferStatus::Requesting
        )
    }

    /// Counted as an active download for the summary line.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TransferStatus::Downloading
                | TransferStatus::Connecting
                | TransferStatus::Joining
                | TransferStatus::Requesting
        )
    }

    /// Only these states offer the retry control.
    pub fn can_retry(self) -> bool {
        matches!(self, TransferStatus::Failed | TransferStatus::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Connecting => "connecting",
            TransferStatus::Joining => "joining",
            TransferStatus::Requesting => "requesting",
            TransferStatus::Downloading => "downloading",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
            TransferStatus::Cancelled => "cancelled",
            TransferStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransferPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl TransferPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferPriority::Low => "low",
            TransferPriority::Normal => "normal",
            TransferPriority::High => "high",
            TransferPriority::Urgent => "urgent",
        }
    }

    pub fn raised(self) -> Self {
        match self {
            TransferPriority::Low => TransferPriority::Normal,
            TransferPriority::Normal => TransferPriority::High,
            TransferPriority::High | TransferPriority::Urgent => TransferPriority::Urgent,
        }
    }

    pub fn lowered(self) -> Self {
        match self {
            TransferPriority::Urgent => TransferPriority::High,
            TransferPriority::High => TransferPriority::Normal,
            TransferPriority::Normal | TransferPriority::Low => TransferPriority::Low,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

/// Snapshot of one transfer, refreshed every poll cycle. `file_name` and
/// `file_size` stay `None` until the protocol handshake resolves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub url: PackUrl,
    pub status: TransferStatus,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    #[serde(default)]
    pub downloaded: u64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub progress: f64,
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub priority: TransferPriority,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub queue_position: Option<usize>,
}

/// Per-bot aggregate counters, read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotStats {
    pub bot_name: String,
    pub network: String,
    #[serde(default)]
    pub total_downloads: u32,
    #[serde(default)]
    pub successful_downloads: u32,
    #[serde(default)]
    pub failed_downloads: u32,
    #[serde(default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub average_speed: f64,
    #[serde(default)]
    pub reliability_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueueStatus {
    pub queue_size: usize,
    #[serde(default)]
    pub status: String,
}

/// A past search, with an opaque snapshot of the results it returned at the
/// time. The snapshot is decoded lazily, only when a row is expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryItem {
    pub id: i64,
    pub query: String,
    #[serde(default)]
    pub results_count: i64,
    pub results_json: Option<String>,
    #[serde(default)]
    pub searched_at: String,
}

impl SearchHistoryItem {
    /// Decode the stored result snapshot. Malformed or missing JSON yields
    /// `None`; the row then simply does not expand.
    pub fn decode_results(&self) -> Option<Vec<SearchResult>> {
        let raw = self.results_json.as_deref()?;
        serde_json::from_str(raw).ok()
    }
}

/// A completed or failed download. The agent has served this in two layouts
/// over time (flat columns vs. a nested url); the accessors paper over that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadHistoryItem {
    pub id: String,
    pub file_name: Option<String>,
    #[serde(default, alias = "file_size")]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: String,
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub bot: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub url: Option<PackUrl>,
}

impl DownloadHistoryItem {
    pub fn network_name(&self) -> &str {
        self.network
            .as_deref()
            .or_else(|| self.url.as_ref().map(|u| u.server.as_str()))
            .unwrap_or("")
    }

    pub fn bot_name(&self) -> &str {
        self.bot
            .as_deref()
            .or_else(|| self.url.as_ref().map(|u| u.bot.as_str()))
            .unwrap_or("")
    }
}

fn default_page() -> i64 {
    1
}

/// Normalized page of history records.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPage<T> {
    pub items: Vec<T>,
    pub total: i64,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
    pub total_pages: i64,
}

/// The download-history endpoint answers either with the paginated shape or
/// with the legacy flat one. The union never leaks past deserialization.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DownloadHistoryWire {
    Paginated(HistoryPage<DownloadHistoryItem>),
    Legacy {
        history: Vec<DownloadHistoryItem>,
        count: i64,
    },
}

impl DownloadHistoryWire {
    pub fn normalize(self) -> HistoryPage<DownloadHistoryItem> {
        match self {
            DownloadHistoryWire::Paginated(page) => page,
            DownloadHistoryWire::Legacy { history, count } => HistoryPage {
                limit: history.len() as i64,
                items: history,
                total: count,
                page: 1,
                total_pages: 1,
            },
        }
    }
}

/// Per-network connection definition. The map key (network name) is the join
/// key for both the wholesale document save and the per-network calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    pub host: String,
    #[serde(default = "default_network_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub ssl: bool,
    #[serde(default)]
    pub autojoin_channels: Vec<String>,
    #[serde(default = "default_join_delay_secs")]
    pub join_delay_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 6697,
            ssl: true,
            autojoin_channels: Vec::new(),
            join_delay_secs: 6,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_network_port() -> u16 {
    6697
}
fn default_join_delay_secs() -> u64 {
    6
}
fn default_connect_timeout() -> u64 {
    15
}
fn default_general_timeout() -> u64 {
    120
}
fn default_nickname() -> String {
    "packdeck".to_string()
}
fn default_max_retries_cfg() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    30
}
fn default_queue_limit() -> u32 {
    2
}
fn default_dcc_port_min() -> u16 {
    49152
}
fn default_dcc_port_max() -> u16 {
    65535
}
fn default_results_per_page() -> u32 {
    50
}
fn default_search_timeout() -> u64 {
    30
}
fn default_postprocess_timeout() -> u64 {
    300
}

/// The agent's whole configuration document. Loaded on each Settings visit,
/// edited in place, and written back wholesale on save; only `networks` is
/// additionally persisted eagerly per entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    // Connection
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_general_timeout")]
    pub general_timeout: u64,
    #[serde(default)]
    pub proxy_enabled: bool,
    #[serde(default)]
    pub proxy_url: String,

    // Identity
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default = "default_nickname")]
    pub username: String,
    #[serde(default)]
    pub realname: String,

    // Behavior
    #[serde(default = "default_max_retries_cfg")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,
    #[serde(default = "default_queue_limit")]
    pub queue_limit: u32,

    // DCC
    #[serde(default)]
    pub passive_dcc: bool,
    #[serde(default = "default_dcc_port_min")]
    pub dcc_port_min: u16,
    #[serde(default = "default_dcc_port_max")]
    pub dcc_port_max: u16,
    #[serde(default = "default_true")]
    pub resume_enabled: bool,

    // Search
    #[serde(default)]
    pub enabled_providers: Vec<String>,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    #[serde(default = "default_search_timeout")]
    pub search_timeout: u64,

    // Post-processing
    #[serde(default)]
    pub move_completed: bool,
    #[serde(default)]
    pub move_completed_dir: String,
    #[serde(default)]
    pub postprocess_script_enabled: bool,
    #[serde(default)]
    pub postprocess_script: String,
    #[serde(default = "default_postprocess_timeout")]
    pub postprocess_timeout: u64,

    #[serde(default)]
    pub networks: HashMap<String, NetworkConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            use_ssl: true,
            connect_timeout: 15,
            general_timeout: 120,
            proxy_enabled: false,
            proxy_url: String::new(),
            nickname: "packdeck".to_string(),
            username: "packdeck".to_string(),
            realname: String::new(),
            max_retries: 3,
            retry_delay: 30,
            queue_limit: 2,
            passive_dcc: false,
            dcc_port_min: 49152,
            dcc_port_max: 65535,
            resume_enabled: true,
            enabled_providers: Vec::new(),
            results_per_page: 50,
            search_timeout: 30,
            move_completed: false,
            move_completed_dir: String::new(),
            postprocess_script_enabled: false,
            postprocess_script: String::new(),
            postprocess_timeout: 300,
            networks: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pack_url() {
        let url = PackUrl::parse("irc://irc.rizon.net/some-channel/TestBot/123").unwrap();
        assert_eq!(url.server, "irc.rizon.net");
        assert_eq!(url.channel, "#some-channel");
        assert_eq!(url.bot, "TestBot");
        assert_eq!(url.pack, 123);
    }

    #[test]
    fn test_parse_pack_url_with_hash() {
        let url = PackUrl::parse("irc://irc.rizon.net/#test/Bot/#42").unwrap();
        assert_eq!(url.channel, "#test");
        assert_eq!(url.pack, 42);
    }

    #[test]
    fn test_invalid_pack_url() {
        assert!(PackUrl::parse("http://example.com").is_err());
        assert!(PackUrl::parse("irc://server/channel").is_err());
        assert!(PackUrl::parse("irc://server/channel/bot/many").is_err());
    }

    #[test]
    fn test_pack_url_roundtrip() {
        let url = PackUrl::parse("irc://irc.rizon.net/test/Bot/1").unwrap();
        let url2 = PackUrl::parse(&url.to_url()).unwrap();
        assert_eq!(url, url2);
    }

    #[test]
    fn test_unknown_status_decodes() {
        let status: TransferStatus = serde_json::from_str("\"resuming\"").unwrap();
        assert_eq!(status, TransferStatus::Unknown);
        assert!(!status.is_active());
        assert!(!status.can_retry());
    }

    #[test]
    fn test_status_classification() {
        assert!(TransferStatus::Connecting.is_in_flight());
        assert!(TransferStatus::Connecting.is_active());
        assert!(TransferStatus::Downloading.is_active());
        assert!(!TransferStatus::Downloading.is_in_flight());
        assert!(!TransferStatus::Pending.is_active());
        assert!(TransferStatus::Failed.can_retry());
        assert!(TransferStatus::Cancelled.can_retry());
        assert!(!TransferStatus::Completed.can_retry());
    }

    #[test]
    fn test_transfer_decodes_without_optionals() {
        let json = r##"{
            "id": "abc",
            "url": {"server": "irc.foo.net", "channel": "#x", "bot": "B", "pack": 4},
            "status": "connecting",
            "created_at": 1700000000,
            "updated_at": 1700000001
        }"##;
        let t: Transfer = serde_json::from_str(json).unwrap();
        assert_eq!(t.file_name, None);
        assert_eq!(t.file_size, None);
        assert_eq!(t.downloaded, 0);
        assert_eq!(t.priority, TransferPriority::Normal);
        assert_eq!(t.max_retries, 3);
        assert_eq!(t.queue_position, None);
    }

    #[test]
    fn test_priority_cycling_saturates() {
        assert_eq!(TransferPriority::Urgent.raised(), TransferPriority::Urgent);
        assert_eq!(TransferPriority::Low.lowered(), TransferPriority::Low);
        assert_eq!(TransferPriority::Normal.raised(), TransferPriority::High);
        assert_eq!(TransferPriority::Normal.lowered(), TransferPriority::Low);
    }

    #[test]
    fn test_download_history_paginated_shape() {
        let json = r##"{
            "items": [{"id": "a1", "file_name": "x.iso", "size": 12, "status": "completed",
                       "network": "Rizon", "bot": "B", "channel": "#c",
                       "error": null, "created_at": "2026-01-01T00:00:00Z"}],
            "total": 41,
            "total_pages": 5
        }"##;
        let wire: DownloadHistoryWire = serde_json::from_str(json).unwrap();
        let page = wire.normalize();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 41);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.items[0].network_name(), "Rizon");
    }

    #[test]
    fn test_download_history_legacy_shape() {
        let json = r##"{
            "history": [{"id": "a1", "file_name": null, "status": "failed",
                         "error": "no DCC offer",
                         "url": {"server": "irc.foo.net", "channel": "#c", "bot": "B", "pack": 2},
                         "created_at": "2026-01-01T00:00:00Z"}],
            "count": 1
        }"##;
        let wire: DownloadHistoryWire = serde_json::from_str(json).unwrap();
        let page = wire.normalize();
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items[0].network_name(), "irc.foo.net");
        assert_eq!(page.items[0].bot_name(), "B");
    }

    #[test]
    fn test_search_history_snapshot_decode() {
        let item = SearchHistoryItem {
            id: 1,
            query: "ubuntu".to_string(),
            results_count: 1,
            results_json: Some(
                r##"[{"server":"irc.foo.net","bot":"B","channel":"#c","pack_number":9,
                     "file_name":"ubuntu.iso","file_size":1000,"downloads":3}]"##
                    .to_string(),
            ),
            searched_at: String::new(),
        };
        let results = item.decode_results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pack_url().pack, 9);
    }

    #[test]
    fn test_search_history_snapshot_tolerates_garbage() {
        let mut item = SearchHistoryItem {
            id: 1,
            query: "q".to_string(),
            results_count: 0,
            results_json: Some("not json at all".to_string()),
            searched_at: String::new(),
        };
        assert!(item.decode_results().is_none());
        item.results_json = None;
        assert!(item.decode_results().is_none());
    }

    #[test]
    fn test_agent_config_roundtrip() {
        let mut config = AgentConfig::default();
        config.networks.insert(
            "Rizon".to_string(),
            NetworkConfig {
                host: "irc.rizon.net".to_string(),
                port: 6667,
                ssl: false,
                autojoin_channels: vec!["#news".to_string()],
                join_delay_secs: 6,
            },
        );
        let json = serde_json::to_string(&config).unwrap();
        let loaded: AgentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_agent_config_fills_missing_fields() {
        let config: AgentConfig = serde_json::from_str("{}").unwrap();
        assert!(config.use_ssl);
        assert_eq!(config.connect_timeout, 15);
        assert_eq!(config.dcc_port_min, 49152);
        assert!(config.networks.is_empty());
    }
}
