use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use product_scout_core::extract::Selectors;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub storefront: StorefrontConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorefrontConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_path")]
    pub search_path: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.amazon.com".to_string()
}
fn default_search_path() -> String {
    "/s?k={keyword}".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_requests_per_minute() -> u32 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// When set, each search's filtered listings are written here as JSON.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Configuration used by tests and embedders that have no TOML file.
    pub fn minimal(db_path: PathBuf) -> Self {
        Self {
            db: DbConfig { path: db_path },
            server: ServerConfig {
                bind: "127.0.0.1:8000".to_string(),
            },
            storefront: StorefrontConfig::default(),
            fetch: FetchConfig::default(),
            selectors: Selectors::default(),
            export: ExportConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    let base = url::Url::parse(&config.storefront.base_url).with_context(|| {
        format!(
            "storefront.base_url is not an absolute URL: '{}'",
            config.storefront.base_url
        )
    })?;
    if base.cannot_be_a_base() {
        anyhow::bail!("storefront.base_url must be an http(s) origin");
    }

    if !config.storefront.search_path.contains("{keyword}") {
        anyhow::bail!("storefront.search_path must contain the '{{keyword}}' placeholder");
    }

    if config.fetch.requests_per_minute == 0 {
        anyhow::bail!("fetch.requests_per_minute must be > 0");
    }
    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }

    Ok(())
}
