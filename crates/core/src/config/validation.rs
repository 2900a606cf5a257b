//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Upper bound on results a single query may request.
pub const MAX_RESULTS_CEILING: usize = 100;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `namespace` or `user_agent` is empty
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_results` is 0 or above the ceiling
    /// - `favorites_limit` or `index_cache_ttl_secs` is 0
    /// - an experiment has no name or no weighted variant
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(invalid("namespace", "must not be empty"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.max_results == 0 || self.max_results > MAX_RESULTS_CEILING {
            return Err(invalid("max_results", "must be between 1 and 100"));
        }

        if self.favorites_limit == 0 {
            return Err(invalid("favorites_limit", "must be greater than 0"));
        }

        if self.index_cache_ttl_secs == 0 {
            return Err(invalid("index_cache_ttl_secs", "must be greater than 0"));
        }

        for experiment in &self.experiments {
            if experiment.name.is_empty() {
                return Err(invalid("experiments", "experiment name must not be empty"));
            }
            if experiment.variants.iter().all(|v| v.weight == 0) {
                return Err(ConfigError::Invalid {
                    field: "experiments".into(),
                    reason: format!("experiment '{}' has no weighted variant", experiment.name),
                });
            }
        }

        if self.index_url.is_some() && self.index_path.is_some() {
            tracing::warn!("Both index_url and index_path are set; index_url is tried first");
        }
        if self.index_url.is_none() && self.index_path.is_none() && self.fallback_page_url.is_none() {
            tracing::warn!("No index source configured; site search will return no results");
        }

        Ok(())
    }
}
