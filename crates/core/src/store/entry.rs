//! The envelope written to the substrate for every stored value.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored value with its write time and optional expiry.
///
/// Timestamps are Unix epoch milliseconds, the same resolution the
/// browser's `Date.now()` uses, so entries written by either side decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem<T> {
    pub value: T,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl<T> StoredItem<T> {
    /// Wrap a value written at `now_ms`, expiring `ttl` later if given.
    pub fn new(value: T, now_ms: i64, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|ttl| {
            let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
            now_ms.saturating_add(ttl_ms)
        });
        Self { value, created_at: now_ms, expires_at }
    }

    /// An entry is expired once the clock reaches its `expires_at`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now_ms >= expires_at)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_ttl_never_expires() {
        let item = StoredItem::new("v", 1_000, None);
        assert_eq!(item.expires_at, None);
        assert!(!item.is_expired(i64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        let item = StoredItem::new(1, 1_000, Some(Duration::from_millis(500)));
        assert_eq!(item.expires_at, Some(1_500));
        assert!(!item.is_expired(1_499));
        assert!(item.is_expired(1_500));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let item = StoredItem::new((), 1_000, Some(Duration::MAX));
        assert_eq!(item.expires_at, Some(i64::MAX));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let item = StoredItem::new(serde_json::json!({"theme": "dark"}), 42, Some(Duration::from_millis(8)));
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"value":{"theme":"dark"},"createdAt":42,"expiresAt":50}"#);

        let plain = serde_json::to_string(&StoredItem::new(1, 42, None)).unwrap();
        assert_eq!(plain, r#"{"value":1,"createdAt":42}"#);
    }

    #[test]
    fn test_decode_without_expiry_field() {
        let item: StoredItem<String> = serde_json::from_str(r#"{"value":"x","createdAt":7}"#).unwrap();
        assert_eq!(item.value, "x");
        assert_eq!(item.expires_at, None);
    }
}
