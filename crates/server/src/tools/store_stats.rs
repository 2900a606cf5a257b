//! store_stats tool implementation.
//!
//! Reports on the persistent store and the loaded collection.

use crate::state::AppState;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output structure for the store_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreStatsOutput {
    pub namespace: String,
    /// Whether a probe write succeeded.
    pub available: bool,
    /// Approximate bytes used by the namespace.
    pub estimated_bytes: usize,
    /// Live keys, without the namespace prefix.
    pub keys: Vec<String>,
    /// Documents in the search collection.
    pub documents: usize,
    pub loaded_at: Option<String>,
}

/// Implementation of the store_stats tool.
pub async fn stats_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let store = &state.store;
    let (documents, loaded_at) = {
        let search = state.search();
        (search.len(), search.loaded_at().map(|t| t.to_rfc3339()))
    };

    let output = StoreStatsOutput {
        namespace: store.namespace().to_string(),
        available: store.is_available(),
        estimated_bytes: store.estimate_size(),
        keys: store.get_all(None).into_keys().collect(),
        documents,
        loaded_at,
    };
    super::json_result(&output)
}
