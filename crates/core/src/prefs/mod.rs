//! Per-visitor preference widgets persisted through a `KeyedStore`.
//!
//! Limits such as the favorites cap live here, above the store.

pub mod experiments;
pub mod favorites;
pub mod hash;

pub use experiments::{Assignments, Experiment, Variant};
pub use favorites::{AddOutcome, Favorite, Favorites};
