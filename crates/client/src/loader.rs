//! Index loading with a store-backed cache.
//!
//! Sources are tried in order; the first that yields documents wins and its
//! result is cached in the [`KeyedStore`] under `index:<digest>` with a TTL,
//! where the digest covers the source names. A config change that swaps a
//! source therefore never serves the previous source's cache.

use crate::fetch::{FetchClient, FetchConfig};
use crate::source::{DocumentSource, JsonFileSource, JsonUrlSource, ScrapedPageSource};
use keigo_core::{AppConfig, Error, KeyedStore, RawDocument, Substrate};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Key prefix for cached indexes.
pub const INDEX_CACHE_PREFIX: &str = "index:";

/// Where a loaded collection came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOrigin {
    Cache,
    Source(String),
}

impl fmt::Display for IndexOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => f.write_str("cache"),
            Self::Source(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub documents: Vec<RawDocument>,
    pub origin: IndexOrigin,
}

/// Ordered document sources plus the cache policy for their result.
pub struct IndexLoader {
    sources: Vec<Box<dyn DocumentSource>>,
    cache_ttl: Duration,
}

impl IndexLoader {
    pub fn new(cache_ttl: Duration) -> Self {
        Self { sources: Vec::new(), cache_ttl }
    }

    pub fn with_source(mut self, source: impl DocumentSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Build the configured chain: index URL, then index file, then the
    /// fallback page.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let mut loader = Self::new(config.index_cache_ttl());

        let needs_http = config.index_url.is_some() || config.fallback_page_url.is_some();
        let fetch = if needs_http { Some(Arc::new(FetchClient::new(FetchConfig::from(config))?)) } else { None };

        if let (Some(url), Some(fetch)) = (&config.index_url, &fetch) {
            loader = loader.with_source(JsonUrlSource::new(url.clone(), Arc::clone(fetch)));
        }
        if let Some(path) = &config.index_path {
            loader = loader.with_source(JsonFileSource::new(path.clone()));
        }
        if let (Some(url), Some(fetch)) = (&config.fallback_page_url, &fetch) {
            loader = loader.with_source(ScrapedPageSource::new(url.clone(), Arc::clone(fetch)));
        }

        Ok(loader)
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Store key for this loader's cached index.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        for name in self.source_names() {
            hasher.update(name.as_bytes());
            hasher.update(b"\n");
        }
        format!("{INDEX_CACHE_PREFIX}{}", hex::encode(hasher.finalize()))
    }

    /// Cached collection if fresh, otherwise a fresh load.
    pub async fn load<S: Substrate>(&self, store: &KeyedStore<S>) -> Result<LoadOutcome, Error> {
        if let Some(documents) = store.get::<Vec<RawDocument>>(&self.cache_key()) {
            tracing::debug!(documents = documents.len(), "index served from cache");
            return Ok(LoadOutcome { documents, origin: IndexOrigin::Cache });
        }
        self.refresh(store).await
    }

    /// Read from the sources, ignoring any cached copy, and re-cache.
    ///
    /// # Errors
    ///
    /// `Error::IndexUnavailable` when no source is configured; otherwise the
    /// error of the last source tried.
    pub async fn refresh<S: Substrate>(&self, store: &KeyedStore<S>) -> Result<LoadOutcome, Error> {
        let mut last_error = Error::IndexUnavailable("no document source configured".into());

        for source in &self.sources {
            let name = source.name();
            match source.load().await {
                Ok(documents) => {
                    if !store.set(&self.cache_key(), &documents, Some(self.cache_ttl)) {
                        tracing::warn!(source = %name, "loaded index could not be cached");
                    }
                    tracing::info!(source = %name, documents = documents.len(), "index loaded");
                    return Ok(LoadOutcome { documents, origin: IndexOrigin::Source(name) });
                }
                Err(e) => {
                    tracing::warn!(source = %name, error = %e, "index source failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
