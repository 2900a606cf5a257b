//! site_reload tool implementation.
//!
//! Re-reads the document index from its sources, bypassing the cache.

use crate::state::AppState;
use keigo_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output structure for the site_reload tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteReloadOutput {
    /// Documents now searchable.
    pub documents: usize,
    /// Name of the source that supplied them.
    pub source: String,
    /// RFC3339 time the collection was swapped in.
    pub loaded_at: Option<String>,
}

/// Implementation of the site_reload tool.
pub async fn reload_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    state
        .config
        .require_index_source()
        .map_err(|e| Error::IndexUnavailable(e.to_string()))?;

    let summary = state.reload(true).await?;
    let output = SiteReloadOutput {
        documents: summary.documents,
        source: summary.origin.to_string(),
        loaded_at: summary.loaded_at.map(|t| t.to_rfc3339()),
    };
    super::json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::*;
    use crate::tools::decode_output;
    use keigo_core::AppConfig;

    #[tokio::test]
    async fn test_reload_reads_source() {
        let state = loaded_state().await;
        let output: SiteReloadOutput = decode_output(&reload_impl(&state).await.unwrap());
        assert_eq!(output.documents, 3);
        assert_eq!(output.source, "static");
        assert!(output.loaded_at.is_some());
    }

    #[tokio::test]
    async fn test_reload_empty_collection() {
        let state = state_with(with_index_source(), Vec::new());
        let output: SiteReloadOutput = decode_output(&reload_impl(&state).await.unwrap());
        assert_eq!(output.documents, 0);
    }

    #[tokio::test]
    async fn test_reload_without_index_source() {
        let state = state_with(AppConfig::default(), documents());
        let err = reload_impl(&state).await.unwrap_err();
        assert_eq!(err.code.0, -32009);
        assert!(err.message.contains("KEIGO_INDEX_URL"));
        assert!(state.search().is_empty());
    }
}
