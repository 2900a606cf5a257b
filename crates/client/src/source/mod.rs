//! Document sources the index loader can draw from.
//!
//! Each source produces the full document collection or fails; the loader
//! decides what to try next.

pub mod json;
pub mod scrape;

pub use json::{JsonFileSource, JsonUrlSource, parse_index};
pub use scrape::{ScrapedPageSource, scrape_articles};

use keigo_core::{Error, RawDocument};

/// A place the site's documents can be read from.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    /// Stable identifier, used in logs and as part of the index cache key.
    fn name(&self) -> String;

    /// Read the whole collection.
    async fn load(&self) -> Result<Vec<RawDocument>, Error>;
}
