//! Namespaced, TTL-aware key/value persistence.
//!
//! A `KeyedStore` wraps a shared [`Substrate`] and gives one widget its own
//! slice of the keyspace:
//!
//! - Every key is written under `namespace + key`
//! - Values are wrapped in a [`StoredItem`] envelope carrying expiry metadata
//! - Expired or corrupt entries read as missing and are evicted on read
//! - Substrate failures degrade to `false` / `None`, never to an error
//!
//! Callers that need the degraded state surfaced to users probe with
//! [`KeyedStore::is_available`].

pub mod entry;
pub mod migrations;
pub mod sqlite;
pub mod substrate;

pub use entry::StoredItem;
pub use sqlite::SqliteSubstrate;
pub use substrate::{MemorySubstrate, Substrate};

use crate::Error;
use entry::now_ms;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Key suffix used by [`KeyedStore::is_available`].
const PROBE_KEY: &str = "__storage_probe__";

/// Namespaced key/value store over a synchronous substrate.
#[derive(Debug)]
pub struct KeyedStore<S> {
    substrate: S,
    namespace: String,
    default_ttl: Option<Duration>,
}

impl<S: Substrate> KeyedStore<S> {
    /// Create a store scoped to `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the namespace is empty.
    pub fn new(substrate: S, namespace: impl Into<String>) -> Result<Self, Error> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(Error::InvalidInput("namespace must not be empty".into()));
        }
        Ok(Self { substrate, namespace, default_ttl: None })
    }

    /// TTL applied by `set` when the call itself passes none.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Write `value` under `key`, replacing any previous entry wholesale.
    ///
    /// Returns `false` if the value cannot be serialized or the substrate
    /// rejects the write (quota, disabled storage).
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        let item = StoredItem::new(value, now_ms(), ttl.or(self.default_ttl));
        let raw = match serde_json::to_string(&item) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "value is not serializable");
                return false;
            }
        };

        match self.substrate.set_item(&self.full_key(key), &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "storage write failed");
                false
            }
        }
    }

    /// Read the value under `key`.
    ///
    /// Missing, expired, corrupt, and unreadable entries all read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entry(key).map(|item| item.value)
    }

    /// Read the full envelope under `key`, with the same semantics as [`get`](Self::get).
    pub fn entry<T: DeserializeOwned>(&self, key: &str) -> Option<StoredItem<T>> {
        let full_key = self.full_key(key);
        let raw = match self.substrate.get_item(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "storage read failed");
                return None;
            }
        };

        let item = match decode(&raw) {
            Ok(item) => item,
            Err(e) => {
                tracing::debug!(key, error = %e, "evicting undecodable entry");
                self.evict(&full_key);
                return None;
            }
        };

        if item.is_expired(now_ms()) {
            tracing::debug!(key, "evicting expired entry");
            self.evict(&full_key);
            return None;
        }

        match serde_json::from_value(item.value) {
            Ok(value) => Some(StoredItem { value, created_at: item.created_at, expires_at: item.expires_at }),
            Err(e) => {
                tracing::debug!(key, error = %e, "stored value has an unexpected shape");
                None
            }
        }
    }

    /// Remove `key`. Absent keys count as removed.
    pub fn remove(&self, key: &str) -> bool {
        match self.substrate.remove_item(&self.full_key(key)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, key, error = %e, "storage remove failed");
                false
            }
        }
    }

    /// Whether a live entry exists under `key`.
    pub fn has(&self, key: &str) -> bool {
        self.get::<Value>(key).is_some()
    }

    /// Remove every key under the namespace, or under `namespace + sub_pattern`.
    ///
    /// Returns `false` without removing anything if the keyspace cannot be
    /// enumerated. Individual remove failures are logged and skipped.
    pub fn clear(&self, sub_pattern: Option<&str>) -> bool {
        let keys = match self.scoped_keys(sub_pattern) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, error = %e, "cannot enumerate storage for clear");
                return false;
            }
        };

        for key in &keys {
            if let Err(e) = self.substrate.remove_item(key) {
                tracing::warn!(key = %key, error = %e, "storage remove failed during clear");
            }
        }

        tracing::debug!(namespace = %self.namespace, removed = keys.len(), "cleared namespace");
        true
    }

    /// All live values under the namespace keyed by their unprefixed key.
    ///
    /// Expired and corrupt entries are skipped but left in place.
    pub fn get_all(&self, sub_pattern: Option<&str>) -> BTreeMap<String, Value> {
        let keys = match self.scoped_keys(sub_pattern) {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, error = %e, "cannot enumerate storage");
                return BTreeMap::new();
            }
        };

        let now = now_ms();
        keys.into_iter()
            .filter_map(|key| {
                let raw = self.substrate.get_item(&key).ok().flatten()?;
                let item = decode(&raw).ok()?;
                if item.is_expired(now) {
                    return None;
                }
                let short = key.strip_prefix(self.namespace.as_str())?.to_string();
                Some((short, item.value))
            })
            .collect()
    }

    /// Approximate bytes used by this namespace (key + raw value, UTF-8).
    pub fn estimate_size(&self) -> usize {
        let Ok(keys) = self.scoped_keys(None) else {
            return 0;
        };

        keys.iter()
            .filter_map(|key| {
                let raw = self.substrate.get_item(key).ok().flatten()?;
                Some(key.len() + raw.len())
            })
            .sum()
    }

    /// Probe the substrate with a throwaway write and remove.
    pub fn is_available(&self) -> bool {
        let probe = self.full_key(PROBE_KEY);
        let result = self
            .substrate
            .set_item(&probe, PROBE_KEY)
            .and_then(|()| self.substrate.remove_item(&probe));

        if let Err(e) = &result {
            tracing::debug!(namespace = %self.namespace, error = %e, "storage probe failed");
        }
        result.is_ok()
    }

    /// Remove every expired or undecodable entry under the namespace.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let Ok(keys) = self.scoped_keys(None) else {
            return 0;
        };

        let now = now_ms();
        let mut removed = 0;
        for key in keys {
            let stale = match self.substrate.get_item(&key) {
                Ok(Some(raw)) => decode(&raw).map_or(true, |item| item.is_expired(now)),
                Ok(None) | Err(_) => false,
            };
            if stale && self.substrate.remove_item(&key).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(namespace = %self.namespace, removed, "purged stale storage entries");
        }
        removed
    }

    fn scoped_keys(&self, sub_pattern: Option<&str>) -> Result<Vec<String>, Error> {
        let prefix = self.full_key(sub_pattern.unwrap_or_default());
        Ok(self
            .substrate
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect())
    }

    fn evict(&self, full_key: &str) {
        if let Err(e) = self.substrate.remove_item(full_key) {
            tracing::warn!(key = %full_key, error = %e, "failed to evict stale entry");
        }
    }
}

fn decode(raw: &str) -> Result<StoredItem<Value>, Error> {
    serde_json::from_str(raw).map_err(|e| Error::CorruptEntry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn store(namespace: &str) -> KeyedStore<MemorySubstrate> {
        KeyedStore::new(MemorySubstrate::new(), namespace).unwrap()
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let result = KeyedStore::new(MemorySubstrate::new(), "");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_roundtrip_values() {
        let store = store("keigo_");
        let values = [
            json!(null),
            json!(true),
            json!(42),
            json!("尊敬語"),
            json!([1, "two", {"three": 3}]),
            json!({"score": 8, "answers": ["いらっしゃる", "召し上がる"]}),
        ];

        for (i, value) in values.iter().enumerate() {
            let key = format!("value:{i}");
            assert!(store.set(&key, value, None));
            assert_eq!(store.get::<Value>(&key).as_ref(), Some(value));
        }
    }

    #[test]
    fn test_typed_roundtrip() {
        let store = store("keigo_");
        let progress = vec![("q1".to_string(), true), ("q2".to_string(), false)];
        assert!(store.set("quiz:progress", &progress, None));
        assert_eq!(store.get::<Vec<(String, bool)>>("quiz:progress"), Some(progress));
    }

    #[test]
    fn test_writes_under_namespace() {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        store.set("theme", "dark", None);

        let raw = substrate.get_item("keigo_theme").unwrap().unwrap();
        let item: StoredItem<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(item.value, "dark");
        assert_eq!(item.expires_at, None);
    }

    #[test]
    fn test_overwrite_is_wholesale() {
        let store = store("keigo_");
        store.set("profile", &json!({"name": "山田", "level": 2}), None);
        store.set("profile", &json!({"level": 3}), None);
        assert_eq!(store.get::<Value>("profile"), Some(json!({"level": 3})));
    }

    #[test]
    fn test_expiry_hides_and_evicts() {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        assert!(store.set("flash", "soon gone", Some(Duration::from_millis(1))));

        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(store.get::<String>("flash"), None);
        assert!(!store.has("flash"));
        assert_eq!(substrate.get_item("keigo_flash").unwrap(), None);
    }

    #[test]
    fn test_default_ttl_applies_when_none_given() {
        let store = store("keigo_").with_default_ttl(Duration::from_millis(1));
        store.set("a", &1, None);
        store.set("b", &2, Some(Duration::from_secs(3600)));

        std::thread::sleep(Duration::from_millis(10));

        assert!(!store.has("a"));
        assert_eq!(store.get::<i32>("b"), Some(2));
    }

    #[test]
    fn test_has_tracks_get() {
        let store = store("keigo_");
        assert!(!store.has("missing"));
        store.set("present", &json!(null), None);
        assert!(store.has("present"));
    }

    #[test]
    fn test_corrupt_entry_reads_as_missing() {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        substrate.set_item("keigo_broken", "{not json").unwrap();

        assert_eq!(store.get::<Value>("broken"), None);
        assert_eq!(substrate.get_item("keigo_broken").unwrap(), None);
    }

    #[test]
    fn test_shape_mismatch_reads_as_missing_without_eviction() {
        let store = store("keigo_");
        store.set("count", "not a number", None);
        assert_eq!(store.get::<u32>("count"), None);
        assert_eq!(store.get::<String>("count"), Some("not a number".into()));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = store("keigo_");
        store.set("k", &1, None);
        assert!(store.remove("k"));
        assert!(store.remove("k"));
        assert!(!store.has("k"));
    }

    #[test]
    fn test_namespace_isolation() {
        let substrate = Arc::new(MemorySubstrate::new());
        let favorites = KeyedStore::new(substrate.clone(), "favorites_").unwrap();
        let quiz = KeyedStore::new(substrate.clone(), "quiz_").unwrap();

        favorites.set("state", "fav", None);
        quiz.set("state", "quiz", None);

        assert_eq!(favorites.get::<String>("state"), Some("fav".into()));
        assert_eq!(quiz.get::<String>("state"), Some("quiz".into()));

        assert!(favorites.clear(None));
        assert_eq!(quiz.get::<String>("state"), Some("quiz".into()));
        assert_eq!(favorites.get_all(None).len(), 0);
    }

    #[test]
    fn test_clear_scoped_by_sub_pattern() {
        let store = store("keigo_");
        store.set("a:1", "x", None);
        store.set("a:2", "x2", None);
        store.set("b:1", "y", None);

        assert!(store.clear(Some("a")));
        assert_eq!(store.get::<String>("a:1"), None);
        assert_eq!(store.get::<String>("a:2"), None);
        assert_eq!(store.get::<String>("b:1"), Some("y".into()));
    }

    #[test]
    fn test_clear_leaves_foreign_keys() {
        let substrate = Arc::new(MemorySubstrate::new());
        substrate.set_item("gtag_consent", "granted").unwrap();
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        store.set("x", &1, None);

        assert!(store.clear(None));
        assert_eq!(substrate.keys().unwrap(), vec!["gtag_consent".to_string()]);
    }

    #[test]
    fn test_get_all_skips_stale_without_evicting() {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        store.set("ab:hero", "B", None);
        store.set("ab:cta", "A", None);
        store.set("ab:old", "A", Some(Duration::from_millis(1)));
        store.set("theme", "dark", None);
        substrate.set_item("keigo_ab:bad", "garbage").unwrap();

        std::thread::sleep(Duration::from_millis(10));

        let all = store.get_all(Some("ab:"));
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("ab:hero"), Some(&json!("B")));
        assert_eq!(all.get("ab:cta"), Some(&json!("A")));

        assert!(substrate.get_item("keigo_ab:old").unwrap().is_some());
        assert!(substrate.get_item("keigo_ab:bad").unwrap().is_some());
    }

    #[test]
    fn test_estimate_size_counts_namespace_only() {
        let substrate = Arc::new(MemorySubstrate::new());
        substrate.set_item("other_key", "some value").unwrap();
        let store = KeyedStore::new(substrate.clone(), "ns_").unwrap();
        assert_eq!(store.estimate_size(), 0);

        store.set("k", &1, None);
        let raw = substrate.get_item("ns_k").unwrap().unwrap();
        assert_eq!(store.estimate_size(), "ns_k".len() + raw.len());
    }

    #[test]
    fn test_is_available_leaves_no_trace() {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        assert!(store.is_available());
        assert!(substrate.keys().unwrap().is_empty());
    }

    #[test]
    fn test_quota_failure_degrades_to_false() {
        let store = KeyedStore::new(MemorySubstrate::with_quota(0), "keigo_").unwrap();

        assert!(!store.is_available());
        assert!(!store.set("favorites", &json!([]), None));
        assert!(!store.set("theme", "dark", None));
        assert_eq!(store.get::<String>("theme"), None);
        assert!(store.remove("theme"));
    }

    #[test]
    fn test_disabled_storage_never_panics() {
        let store = KeyedStore::new(MemorySubstrate::disabled(), "keigo_").unwrap();

        assert!(!store.is_available());
        assert!(!store.set("k", &1, None));
        assert_eq!(store.get::<i32>("k"), None);
        assert!(!store.has("k"));
        assert!(!store.remove("k"));
        assert!(!store.clear(None));
        assert!(store.get_all(None).is_empty());
        assert_eq!(store.estimate_size(), 0);
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn test_no_builtin_capacity_limit() {
        let store = store("keigo_");
        let list: Vec<u32> = (0..1_000).collect();
        assert!(store.set("history", &list, None));
        assert_eq!(store.get::<Vec<u32>>("history").map(|l| l.len()), Some(1_000));
    }

    #[test]
    fn test_entry_exposes_timestamps() {
        let store = store("keigo_");
        let before = now_ms();
        store.set("k", "v", Some(Duration::from_secs(60)));

        let item = store.entry::<String>("k").unwrap();
        assert!(item.created_at >= before);
        assert_eq!(item.expires_at, Some(item.created_at + 60_000));
    }

    #[test]
    fn test_purge_expired() {
        let substrate = Arc::new(MemorySubstrate::new());
        let store = KeyedStore::new(substrate.clone(), "keigo_").unwrap();
        store.set("old", &1, Some(Duration::from_millis(1)));
        store.set("fresh", &2, None);
        substrate.set_item("keigo_corrupt", "}").unwrap();
        substrate.set_item("foreign", "}").unwrap();

        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(store.purge_expired(), 2);
        assert_eq!(substrate.keys().unwrap(), vec!["foreign".to_string(), "keigo_fresh".to_string()]);
    }

    #[test]
    fn test_over_sqlite_substrate() {
        let store = KeyedStore::new(SqliteSubstrate::open_in_memory().unwrap(), "keigo_").unwrap();
        assert!(store.is_available());
        assert!(store.set("quiz:score", &json!({"correct": 7, "total": 10}), None));
        assert_eq!(store.get::<Value>("quiz:score"), Some(json!({"correct": 7, "total": 10})));
        assert!(store.clear(Some("quiz:")));
        assert!(!store.has("quiz:score"));
    }
}
