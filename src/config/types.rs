//! Settings read from the config file and `EDGE_*` environment

use serde::Deserialize;

use crate::edge::cache_control::DEFAULT_CACHE_CONTROL;
use crate::edge::Behavior;

/// Full service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub edge: EdgeConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Object store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Directory holding one subdirectory per container
    pub root: String,
    /// Origin domain; its first label names the container
    pub domain_name: String,
}

/// Edge pipeline configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EdgeConfig {
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
    /// User-agent substrings rejected by the admission filter
    #[serde(default)]
    pub blocked_user_agents: Vec<String>,
    /// Path-pattern behaviors; the standard table when absent
    #[serde(default)]
    pub behaviors: Option<Vec<Behavior>>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_cache_control() -> String {
    DEFAULT_CACHE_CONTROL.to_string()
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            cache_control: default_cache_control(),
            blocked_user_agents: Vec::new(),
            behaviors: None,
        }
    }
}
