//! Configuration schema for the agent cache
//!
//! Configuration is stored at `~/.config/infocache/agent.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache behavior
    pub agent: AgentConfig,

    /// Where attach info and fabric topology come from
    pub sources: SourcesConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// System name used when a request does not name one
    pub system_name: String,

    /// Bypass both caches; every request goes to the source
    pub disable_caching: bool,

    /// Attach info refresh interval in minutes (0 = refresh on demand only)
    pub cache_expiration: u64,

    /// Fabric refresh interval in minutes (0 = refresh on demand only)
    pub fabric_cache_expiration: u64,

    /// Upper bound on a single fetch in seconds (0 = unbounded)
    pub refresh_timeout_secs: u64,

    /// Network interfaces never handed to clients
    pub exclude_fabric_ifaces: Vec<String>,

    /// Fabric providers to scan for (empty = all)
    pub providers: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_name: "daos_server".to_string(),
            disable_caching: false,
            cache_expiration: 0,
            fabric_cache_expiration: 0,
            refresh_timeout_secs: 30,
            exclude_fabric_ifaces: vec![],
            providers: vec![],
        }
    }
}

impl AgentConfig {
    pub fn attach_info_refresh(&self) -> Duration {
        Duration::from_secs(self.cache_expiration.saturating_mul(60))
    }

    pub fn fabric_refresh(&self) -> Duration {
        Duration::from_secs(self.fabric_cache_expiration.saturating_mul(60))
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        (self.refresh_timeout_secs > 0).then(|| Duration::from_secs(self.refresh_timeout_secs))
    }
}

/// Data source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// TOML fabric topology file
    pub topology_file: Option<PathBuf>,

    /// JSON GetAttachInfo response file
    pub attach_info_file: Option<PathBuf>,
}
