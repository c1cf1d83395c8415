use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Media catalog (TMDB) API key
    pub catalog_api_key: String,

    /// Media catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Language tag sent with every catalog request
    #[serde(default = "default_catalog_language")]
    pub catalog_language: String,

    /// TTL for catalog queries, in seconds
    #[serde(default = "default_catalog_cache_ttl_secs")]
    pub catalog_cache_ttl_secs: u64,

    /// TTL for rarely-changing reference data (genre lists), in seconds
    #[serde(default = "default_reference_cache_ttl_secs")]
    pub reference_cache_ttl_secs: u64,

    /// User-profile store base URL. The in-memory tracked lists are used when unset.
    #[serde(default)]
    pub profile_store_url: Option<String>,

    /// Bearer token for the user-profile store
    #[serde(default)]
    pub profile_store_token: Option<String>,

    /// Default number of recommendations returned per request
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_catalog_language() -> String {
    "en-US".to_string()
}

fn default_catalog_cache_ttl_secs() -> u64 {
    300
}

fn default_reference_cache_ttl_secs() -> u64 {
    3600
}

fn default_recommendation_limit() -> usize {
    20
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn catalog_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_cache_ttl_secs)
    }

    pub fn reference_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.reference_cache_ttl_secs)
    }

    /// Socket address the HTTP surface binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
