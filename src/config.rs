use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the monitoring API (no trailing slash).
    pub base_url: String,
    /// Base URL of the vendor UI, used for deep links back to the source data.
    pub ui_base_url: String,
    /// Optional bearer token forwarded on upstream requests.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long a computed series stays cached. The cache backend counts TTL
    /// in milliseconds; conversion happens where the store is called.
    pub ttl_seconds: u64,
}

/// Entity reference -> app groups. Stands in for the catalog service lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub entities: HashMap<String, Vec<String>>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.upstream.base_url.is_empty(),
            "upstream.base_url must be non-empty"
        );
        anyhow::ensure!(
            !self.upstream.ui_base_url.is_empty(),
            "upstream.ui_base_url must be non-empty"
        );
        anyhow::ensure!(
            self.upstream.page_size > 0,
            "upstream.page_size must be > 0, got {}",
            self.upstream.page_size
        );
        anyhow::ensure!(
            self.cache.ttl_seconds > 0,
            "cache.ttl_seconds must be > 0, got {}",
            self.cache.ttl_seconds
        );
        Ok(())
    }
}
