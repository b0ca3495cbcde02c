use serde::Deserialize;

use crate::models::ViewMode;

/// Type labels dropped from search results unless moderation is disabled
pub const DEFAULT_MODERATION_TERMS: &[&str] = &[
    "伦理片",
    "福利",
    "里番动漫",
    "门事件",
    "萝莉少女",
    "制服诱惑",
    "国产传媒",
    "黑丝诱惑",
    "无码",
    "有码",
    "网红主播",
    "色情片",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the upstream search API (`/api/search` is appended)
    #[serde(default = "default_search_api_url")]
    pub search_api_url: String,

    /// Timeout for a single upstream search call
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether new sessions start in aggregated view
    #[serde(default = "default_aggregate")]
    pub default_aggregate: bool,

    /// Turns off the moderation blocklist entirely
    #[serde(default)]
    pub disable_moderation_filter: bool,

    /// Comma-separated blocklist override
    #[serde(default)]
    pub moderation_terms: Option<Vec<String>>,

    /// Maximum number of search history entries kept
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Sessions untouched for this long are dropped
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Upper bound on live sessions; the least recently used one is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_search_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_aggregate() -> bool {
    true
}

fn default_history_limit() -> usize {
    20
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_api_url: default_search_api_url(),
            search_timeout_secs: default_search_timeout_secs(),
            host: default_host(),
            port: default_port(),
            default_aggregate: default_aggregate(),
            disable_moderation_filter: false,
            moderation_terms: None,
            history_limit: default_history_limit(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// View mode injected into every new search session
    pub fn default_view_mode(&self) -> ViewMode {
        if self.default_aggregate {
            ViewMode::Aggregated
        } else {
            ViewMode::Flat
        }
    }

    /// Blocklist terms, falling back to the built-in list
    pub fn moderation_terms(&self) -> Vec<String> {
        match &self.moderation_terms {
            Some(terms) => terms
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            None => DEFAULT_MODERATION_TERMS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}
