//! Client code for the keigo site.
//!
//! This crate loads the site's document collection: HTTP fetch, JSON index
//! parsing, HTML fallback scraping, and a store-backed index cache.

pub mod fetch;
pub mod loader;
pub mod source;

pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use loader::{IndexLoader, IndexOrigin, LoadOutcome};
pub use source::{DocumentSource, JsonFileSource, JsonUrlSource, ScrapedPageSource, parse_index, scrape_articles};
