//! Core types and shared functionality for the keigo site.
//!
//! This crate provides:
//! - Namespaced, TTL-aware key/value storage over a pluggable substrate
//! - In-memory relevance search with highlighted snippets
//! - Preference widgets (favorites, experiment assignments)
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod prefs;
pub mod search;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use search::{RawDocument, RelevanceSearch, SearchResult, SearchTuning};
pub use store::{KeyedStore, MemorySubstrate, SqliteSubstrate, StoredItem, Substrate};
