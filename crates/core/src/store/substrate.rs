//! The synchronous string key-value capability a `KeyedStore` writes through.

use crate::Error;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A shared, synchronous string → string keyspace.
///
/// Mirrors the browser's local storage surface. Every `KeyedStore` on a host
/// shares one substrate; namespacing is layered on top, not enforced here.
pub trait Substrate: Send + Sync {
    /// Read a raw value; `Ok(None)` for absent keys.
    fn get_item(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write a raw value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), Error>;

    /// Enumerate every key in the keyspace.
    fn keys(&self) -> Result<Vec<String>, Error>;
}

impl<S: Substrate + ?Sized> Substrate for std::sync::Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        (**self).keys()
    }
}

/// In-memory substrate.
///
/// Supports a byte quota (key + value UTF-8 lengths) and a disabled mode in
/// which every call fails, for exercising the degraded paths.
#[derive(Debug, Default)]
pub struct MemorySubstrate {
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A substrate that rejects writes pushing usage past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota: Some(bytes), ..Self::default() }
    }

    /// A substrate whose every operation fails, like storage in a sandboxed frame.
    pub fn disabled() -> Self {
        Self { disabled: true, ..Self::default() }
    }

    fn items(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, Error> {
        if self.disabled {
            return Err(Error::StorageUnavailable("storage is disabled".into()));
        }
        Ok(self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Substrate for MemorySubstrate {
    fn get_item(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut items = self.items()?;

        if let Some(limit) = self.quota {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = used + key.len() + value.len();
            if requested > limit {
                return Err(Error::QuotaExceeded { requested, limit });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Error> {
        self.items()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.items()?.keys().cloned().collect())
    }
}
