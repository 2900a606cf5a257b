//! Pre-built JSON index, over HTTP or from disk.

use super::DocumentSource;
use crate::fetch::FetchClient;
use keigo_core::{Error, RawDocument};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Object keys that may carry the document array.
const COLLECTION_KEYS: [&str; 4] = ["documents", "posts", "pages", "items"];

/// Parse an index body into documents.
///
/// Accepts a top-level array, or an object holding the array under one of
/// `documents`, `posts`, `pages`, `items`. Entries that are not objects are
/// skipped; object entries load field by field with defaults.
pub fn parse_index(bytes: &[u8]) -> Result<Vec<RawDocument>, Error> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::IndexParse(e.to_string()))?;

    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(map) => COLLECTION_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .ok_or_else(|| Error::IndexParse(format!("object has none of {}", COLLECTION_KEYS.join(", "))))?,
        _ => return Err(Error::IndexParse("expected an array or object".into())),
    };

    let mut documents = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        if entry.is_object() {
            documents.push(RawDocument::from_value(entry));
        } else {
            tracing::warn!(position, "skipping non-object index entry");
        }
    }
    Ok(documents)
}

/// JSON index served over HTTP.
pub struct JsonUrlSource {
    url: String,
    fetch: Arc<FetchClient>,
}

impl JsonUrlSource {
    pub fn new(url: impl Into<String>, fetch: Arc<FetchClient>) -> Self {
        Self { url: url.into(), fetch }
    }
}

#[async_trait::async_trait]
impl DocumentSource for JsonUrlSource {
    fn name(&self) -> String {
        format!("json-url:{}", self.url)
    }

    async fn load(&self) -> Result<Vec<RawDocument>, Error> {
        let response = self.fetch.fetch(&self.url, "application/json").await?;
        parse_index(&response.bytes)
    }
}

/// JSON index read from a local file.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl DocumentSource for JsonFileSource {
    fn name(&self) -> String {
        format!("json-file:{}", self.path.display())
    }

    async fn load(&self) -> Result<Vec<RawDocument>, Error> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::IndexUnavailable(format!("{}: {}", self.path.display(), e)))?;
        parse_index(&bytes)
    }
}
