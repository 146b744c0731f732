use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::pokeapi::DEFAULT_API_BASE;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub page_size: u32,
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            page_size: 20,
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Rows past the bottom of the viewport at which the next page is requested
    pub prefetch_rows: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { prefetch_rows: 2 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub details: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { details: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub list: ListConfig,
    pub cache: CacheConfig,
    pub log_file: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("pokedex").join("config.toml"))
}

/// Default log location: ~/.cache/pokedex/pokedex.log (Linux) or ~/Library/Caches/pokedex/ (macOS)
pub fn default_log_path() -> Option<PathBuf> {
    Some(dirs::cache_dir()?.join("pokedex").join("pokedex.log"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        Self::parse(&content).unwrap_or_default()
    }

    fn parse(content: &str) -> Option<Self> {
        let config = toml::from_str::<Config>(content).ok()?;
        if config.api.page_size == 0 || config.api.base_url.is_empty() {
            return None;
        }
        Some(config)
    }
}
