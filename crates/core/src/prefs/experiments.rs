//! Sticky A/B variant assignment.
//!
//! A subject is bucketed deterministically by hashing the experiment name
//! with the subject id, then the chosen variant is persisted so later visits
//! keep it even if weights change.

use super::hash::{bucket_digest, bucket_hash};
use crate::store::{KeyedStore, Substrate};
use serde::{Deserialize, Serialize};

/// Key prefix for stored assignments.
pub const ASSIGNMENT_PREFIX: &str = "ab:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Variant {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Experiment {
    pub name: String,
    pub variants: Vec<Variant>,
}

impl Experiment {
    /// Pick a variant by weight for a hash value; `None` if no variant has weight.
    pub fn pick(&self, hash: u64) -> Option<&Variant> {
        let total: u64 = self.variants.iter().map(|v| u64::from(v.weight)).sum();
        if total == 0 {
            return None;
        }

        let mut point = hash % total;
        for variant in &self.variants {
            let weight = u64::from(variant.weight);
            if point < weight {
                return Some(variant);
            }
            point -= weight;
        }
        None
    }

    fn has_variant(&self, name: &str) -> bool {
        self.variants.iter().any(|v| v.name == name && v.weight > 0)
    }
}

/// Assignment book over a `KeyedStore`.
pub struct Assignments<'a, S> {
    store: &'a KeyedStore<S>,
}

impl<'a, S: Substrate> Assignments<'a, S> {
    pub fn new(store: &'a KeyedStore<S>) -> Self {
        Self { store }
    }

    /// The subject's variant, assigning and persisting one on first call.
    ///
    /// A stored variant that the experiment no longer offers is replaced.
    /// Persistence failures are logged; the computed variant is still returned.
    pub fn assign(&self, experiment: &Experiment, subject: &str) -> Option<String> {
        let key = format!("{ASSIGNMENT_PREFIX}{}", experiment.name);

        if let Some(stored) = self.store.get::<String>(&key)
            && experiment.has_variant(&stored)
        {
            return Some(stored);
        }

        let variant = experiment.pick(bucket_hash(&experiment.name, subject))?.name.clone();
        if !self.store.set(&key, &variant, None) {
            tracing::warn!(experiment = %experiment.name, "assignment not persisted");
        }
        tracing::debug!(
            experiment = %experiment.name,
            bucket = %bucket_digest(&experiment.name, subject),
            variant = %variant,
            "assigned experiment variant"
        );
        Some(variant)
    }

    /// The stored variant without assigning one.
    pub fn current(&self, experiment: &str) -> Option<String> {
        self.store.get(&format!("{ASSIGNMENT_PREFIX}{experiment}"))
    }

    /// Forget an assignment.
    pub fn reset(&self, experiment: &str) -> bool {
        self.store.remove(&format!("{ASSIGNMENT_PREFIX}{experiment}"))
    }
}
