//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (KEIGO_*)
//! 2. TOML config file (if KEIGO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::prefs::Experiment;
use crate::prefs::favorites::DEFAULT_FAVORITES_LIMIT;
use crate::search::{DEFAULT_MAX_RESULTS, SearchTuning};

mod validation;

pub use validation::{ConfigError, MAX_RESULTS_CEILING};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (KEIGO_*, nested with `__`)
/// 2. TOML config file (if KEIGO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite file standing in for browser local storage.
    ///
    /// Set via KEIGO_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Key prefix for every value this process stores.
    ///
    /// Must stay stable across runs or stored state is orphaned.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// TTL in seconds applied to writes that don't specify one.
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,

    /// Byte quota for the storage file; unset means unlimited.
    #[serde(default = "default_storage_quota")]
    pub storage_quota_bytes: Option<usize>,

    /// URL of the pre-built JSON document index.
    ///
    /// Set via KEIGO_INDEX_URL environment variable.
    #[serde(default)]
    pub index_url: Option<String>,

    /// Local path of a JSON document index.
    #[serde(default)]
    pub index_path: Option<PathBuf>,

    /// HTML page scraped for articles when the index can't be read.
    #[serde(default)]
    pub fallback_page_url: Option<String>,

    /// How long a loaded index stays cached, in seconds.
    #[serde(default = "default_index_cache_ttl_secs")]
    pub index_cache_ttl_secs: u64,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Result cap when a search request doesn't give one.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum number of favorites per visitor.
    #[serde(default = "default_favorites_limit")]
    pub favorites_limit: usize,

    /// Experiments available for assignment.
    #[serde(default)]
    pub experiments: Vec<Experiment>,

    /// Scoring weights, snippet window, highlight markers.
    #[serde(default)]
    pub search: SearchTuning,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./keigo-storage.sqlite")
}

fn default_namespace() -> String {
    "keigo_".into()
}

fn default_storage_quota() -> Option<usize> {
    Some(5_242_880) // 5MB, the common browser per-origin limit
}

fn default_index_cache_ttl_secs() -> u64 {
    3600
}

fn default_user_agent() -> String {
    "keigo-site/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_favorites_limit() -> usize {
    DEFAULT_FAVORITES_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            namespace: default_namespace(),
            default_ttl_secs: None,
            storage_quota_bytes: default_storage_quota(),
            index_url: None,
            index_path: None,
            fallback_page_url: None,
            index_cache_ttl_secs: default_index_cache_ttl_secs(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_results: default_max_results(),
            favorites_limit: default_favorites_limit(),
            experiments: Vec::new(),
            search: SearchTuning::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }

    pub fn index_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.index_cache_ttl_secs)
    }

    /// Look up a configured experiment by name.
    pub fn experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.name == name)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `KEIGO_`
    /// 2. TOML file from `KEIGO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KEIGO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KEIGO_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::extract(figment)
    }

    /// Load from a TOML string layered over the defaults.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::string(toml)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Require at least one index source (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no index URL, path, or fallback page is set.
    pub fn require_index_source(&self) -> Result<(), ConfigError> {
        if self.index_url.is_none() && self.index_path.is_none() && self.fallback_page_url.is_none() {
            return Err(ConfigError::Missing {
                field: "index_url".into(),
                hint: "Set KEIGO_INDEX_URL, KEIGO_INDEX_PATH, or KEIGO_FALLBACK_PAGE_URL".into(),
            });
        }
        Ok(())
    }
}
