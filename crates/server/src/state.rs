//! Shared server state: configuration, the persistent store, and the live
//! search collection.

use chrono::{DateTime, Utc};
use keigo_client::{IndexLoader, IndexOrigin};
use keigo_core::{AppConfig, Error, KeyedStore, RelevanceSearch, SqliteSubstrate};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

pub struct AppState {
    pub config: AppConfig,
    pub store: KeyedStore<SqliteSubstrate>,
    search: RwLock<RelevanceSearch>,
    loader: IndexLoader,
}

/// Result of swapping in a newly loaded collection.
#[derive(Debug, Clone)]
pub struct ReloadSummary {
    pub documents: usize,
    pub origin: IndexOrigin,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Open the storage file and build the index loader from `config`.
    pub fn open(config: AppConfig) -> Result<Self, Error> {
        let substrate = SqliteSubstrate::open(&config.db_path)?;
        let loader = IndexLoader::from_config(&config)?;
        Self::assemble(config, substrate, loader)
    }

    fn assemble(config: AppConfig, substrate: SqliteSubstrate, loader: IndexLoader) -> Result<Self, Error> {
        let mut store = KeyedStore::new(substrate.with_quota(config.storage_quota_bytes), config.namespace.clone())?;
        if let Some(ttl) = config.default_ttl() {
            store = store.with_default_ttl(ttl);
        }
        let search = RwLock::new(RelevanceSearch::with_tuning(config.search.clone()));
        Ok(Self { config, store, search, loader })
    }

    /// Read access to the current collection.
    pub fn search(&self) -> RwLockReadGuard<'_, RelevanceSearch> {
        self.search.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the index (from cache unless `force`) and replace the collection.
    ///
    /// On failure the previous collection stays in place.
    pub async fn reload(&self, force: bool) -> Result<ReloadSummary, Error> {
        let outcome = if force { self.loader.refresh(&self.store).await? } else { self.loader.load(&self.store).await? };

        let mut search = self.search.write().unwrap_or_else(PoisonError::into_inner);
        search.load(outcome.documents);
        Ok(ReloadSummary { documents: search.len(), origin: outcome.origin, loaded_at: search.loaded_at() })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use keigo_client::DocumentSource;
    use keigo_core::RawDocument;
    use std::time::Duration;

    impl AppState {
        /// State over an in-memory database with an explicit loader.
        pub fn in_memory(config: AppConfig, loader: IndexLoader) -> Result<Self, Error> {
            Self::assemble(config, SqliteSubstrate::open_in_memory()?, loader)
        }
    }

    /// Fixed in-memory collection.
    pub struct StaticSource(pub Vec<RawDocument>);

    #[async_trait::async_trait]
    impl DocumentSource for StaticSource {
        fn name(&self) -> String {
            "static".into()
        }

        async fn load(&self) -> Result<Vec<RawDocument>, Error> {
            Ok(self.0.clone())
        }
    }

    pub fn documents() -> Vec<RawDocument> {
        vec![
            RawDocument {
                title: "尊敬語の使い方".into(),
                body: "尊敬語は相手の動作を高めて表現します。".into(),
                permalink: "/posts/sonkeigo/".into(),
                categories: vec!["基礎".into()],
                tags: vec!["尊敬語".into()],
                date: "2024-04-01".into(),
                ..Default::default()
            },
            RawDocument {
                title: "謙譲語".into(),
                body: "自分の動作を低めて相手を立てます。".into(),
                permalink: "/posts/kenjougo/".into(),
                tags: vec!["謙譲語".into()],
                ..Default::default()
            },
            RawDocument {
                title: "Business Email Keigo".into(),
                body: "Polite phrasing for business email.".into(),
                permalink: "/posts/email/".into(),
                ..Default::default()
            },
        ]
    }

    /// Defaults plus an index path, so source checks pass.
    pub fn with_index_source() -> AppConfig {
        AppConfig { index_path: Some("index.json".into()), ..Default::default() }
    }

    pub fn state_with(config: AppConfig, docs: Vec<RawDocument>) -> AppState {
        let loader = IndexLoader::new(Duration::from_secs(60)).with_source(StaticSource(docs));
        AppState::in_memory(config, loader).unwrap()
    }

    pub async fn loaded_state() -> AppState {
        let state = state_with(with_index_source(), documents());
        state.reload(false).await.unwrap();
        state
    }
}
