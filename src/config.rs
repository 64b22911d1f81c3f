//! Configuration management for apod-explorer using the prefer crate.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Default hero cache freshness in seconds (one day).
pub const DEFAULT_HERO_CACHE_TTL_SECS: u64 = 60 * 60 * 24;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the APOD backend, e.g. `http://localhost:8080/api/v1`.
    pub base_url: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Minimum delay between backend requests in milliseconds.
    pub request_delay_ms: u64,
    /// How long a hero entry stays fresh, in seconds.
    pub hero_cache_ttl_secs: u64,
    /// Where downloaded images are written.
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to the user's pictures directory
        let download_dir = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("apod-explorer/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: 30,
            request_delay_ms: 0,
            hero_cache_ttl_secs: DEFAULT_HERO_CACHE_TTL_SECS,
            download_dir,
        }
    }
}

impl Settings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn hero_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.hero_cache_ttl_secs)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// Delay between requests in milliseconds.
    #[serde(default)]
    pub request_delay_ms: Option<u64>,
    /// Hero cache freshness in seconds.
    #[serde(default)]
    pub hero_cache_ttl_secs: Option<u64>,
    /// Download directory; `~` is expanded.
    #[serde(default)]
    pub download_dir: Option<String>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers apod-explorer config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("apod-explorer").await {
            Ok(pref_config) => Config {
                base_url: pref_config.get("base_url").ok(),
                user_agent: pref_config.get("user_agent").ok(),
                request_timeout: pref_config.get("request_timeout").ok(),
                request_delay_ms: pref_config.get("request_delay_ms").ok(),
                hero_cache_ttl_secs: pref_config.get("hero_cache_ttl_secs").ok(),
                download_dir: pref_config.get("download_dir").ok(),
            },
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(ttl) = self.hero_cache_ttl_secs {
            settings.hero_cache_ttl_secs = ttl;
        }
        if let Some(ref dir) = self.download_dir {
            let path = shellexpand::tilde(dir);
            settings.download_dir = PathBuf::from(path.as_ref());
        }
    }
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
