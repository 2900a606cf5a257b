//! Bookmarked pages, capped by the caller rather than the store.

use crate::Error;
use crate::store::{KeyedStore, Substrate};
use serde::{Deserialize, Serialize};

/// Key the list is stored under, inside the store's namespace.
pub const FAVORITES_KEY: &str = "favorites";

/// Default maximum number of favorites.
pub const DEFAULT_FAVORITES_LIMIT: usize = 100;

/// One bookmarked page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub permalink: String,
    pub title: String,
    /// Epoch milliseconds.
    pub added_at: i64,
}

/// Outcome of [`Favorites::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Favorites list view over a `KeyedStore`.
pub struct Favorites<'a, S> {
    store: &'a KeyedStore<S>,
    limit: usize,
}

impl<'a, S: Substrate> Favorites<'a, S> {
    pub fn new(store: &'a KeyedStore<S>) -> Self {
        Self { store, limit: DEFAULT_FAVORITES_LIMIT }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Stored favorites, oldest first. Unreadable storage reads as empty.
    pub fn list(&self) -> Vec<Favorite> {
        self.store.get(FAVORITES_KEY).unwrap_or_default()
    }

    pub fn contains(&self, permalink: &str) -> bool {
        self.list().iter().any(|f| f.permalink == permalink)
    }

    /// Append a favorite.
    ///
    /// # Errors
    ///
    /// `Error::FavoritesFull` when the list is at its limit, and
    /// `Error::StorageUnavailable` when the write is rejected.
    pub fn add(&self, permalink: &str, title: &str) -> Result<AddOutcome, Error> {
        let mut list = self.list();
        if list.iter().any(|f| f.permalink == permalink) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if list.len() >= self.limit {
            return Err(Error::FavoritesFull(self.limit));
        }

        list.push(Favorite {
            permalink: permalink.to_string(),
            title: title.to_string(),
            added_at: chrono::Utc::now().timestamp_millis(),
        });
        self.save(&list)?;
        Ok(AddOutcome::Added)
    }

    /// Remove a favorite; `Ok(false)` if it wasn't present.
    pub fn remove(&self, permalink: &str) -> Result<bool, Error> {
        let mut list = self.list();
        let before = list.len();
        list.retain(|f| f.permalink != permalink);
        if list.len() == before {
            return Ok(false);
        }
        self.save(&list)?;
        Ok(true)
    }

    /// Flip a page's favorite state; returns whether it is now a favorite.
    pub fn toggle(&self, permalink: &str, title: &str) -> Result<bool, Error> {
        if self.remove(permalink)? {
            return Ok(false);
        }
        self.add(permalink, title)?;
        Ok(true)
    }

    pub fn clear(&self) -> bool {
        self.store.remove(FAVORITES_KEY)
    }

    fn save(&self, list: &[Favorite]) -> Result<(), Error> {
        if self.store.set(FAVORITES_KEY, list, None) {
            Ok(())
        } else {
            Err(Error::StorageUnavailable("favorites could not be saved".into()))
        }
    }
}
