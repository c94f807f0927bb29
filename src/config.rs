//! Configuration for the board engine.
//!
//! Reads from a TOML file with per-field defaults, so an absent file or
//! a partial file both yield a usable configuration.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://api.example.com"
//!
//! [board]
//! show_weekend = false
//!
//! [sync]
//! poll_interval_secs = 12
//!
//! [enrichment]
//! cooldown_ms = 1500
//! country = "Australia"
//! geocode_url = "https://nominatim.openstreetmap.org/search"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Remote jobs API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the persistence API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Board layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Include the Saturday/Sunday slots before the completed lane.
    #[serde(default)]
    pub show_weekend: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            show_weekend: false,
        }
    }
}

/// Cross-client synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// How often the foreground poll triggers a reload, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    12
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Background enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentSettings {
    /// Cool-down between geocoding attempts, in milliseconds. Respects
    /// the provider's rate limits.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Country qualifier appended to addresses that lack one.
    #[serde(default = "default_country")]
    pub country: String,
    /// Geocoding provider endpoint.
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
}

fn default_cooldown_ms() -> u64 {
    1500
}

fn default_country() -> String {
    "Australia".to_string()
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            country: default_country(),
            geocode_url: default_geocode_url(),
        }
    }
}

/// Top-level configuration, one section per subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub enrichment: EnrichmentSettings,
}

impl BoardConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sync.poll_interval_secs)
    }

    pub fn enrichment_cooldown(&self) -> Duration {
        Duration::from_millis(self.enrichment.cooldown_ms)
    }

    /// Override the weekend toggle.
    pub fn with_show_weekend(mut self, show_weekend: bool) -> Self {
        self.board.show_weekend = show_weekend;
        self
    }

    /// Override the enrichment cool-down.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.enrichment.cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.sync.poll_interval_secs = interval.as_secs();
        self
    }
}
