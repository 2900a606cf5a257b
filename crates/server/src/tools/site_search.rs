//! site_search tool implementation.
//!
//! Ranks the loaded document collection against a free-text query.

use crate::state::AppState;
use keigo_core::config::MAX_RESULTS_CEILING;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the site_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteSearchParams {
    /// Free-text query. Case-insensitive; blank queries return no results.
    pub query: String,

    /// Maximum number of results (default from configuration, at most 100).
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// One ranked hit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub title: String,
    pub permalink: String,
    pub date: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub score: u32,
    /// Title with query tokens wrapped in highlight markers.
    pub highlighted_title: String,
    /// Excerpt around the first match, highlighted.
    pub snippet: String,
}

/// Output structure for the site_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteSearchOutput {
    pub query: String,
    /// Number of documents in the searched collection.
    pub searched: usize,
    pub results: Vec<SearchHit>,
}

/// Implementation of the site_search tool.
pub async fn search_impl(state: &AppState, params: SiteSearchParams) -> Result<CallToolResult, McpError> {
    let max_results = params.max_results.unwrap_or(state.config.max_results).min(MAX_RESULTS_CEILING);

    let output = {
        let search = state.search();
        let results = search
            .query(&params.query, max_results)
            .into_iter()
            .map(|hit| SearchHit {
                title: hit.document.title.clone(),
                permalink: hit.document.permalink.clone(),
                date: hit.document.date.clone(),
                categories: hit.document.categories.clone(),
                tags: hit.document.tags.clone(),
                score: hit.score,
                highlighted_title: hit.highlighted_title,
                snippet: hit.snippet,
            })
            .collect::<Vec<_>>();
        SiteSearchOutput { query: params.query, searched: search.len(), results }
    };

    tracing::debug!(query = %output.query, hits = output.results.len(), "site search");
    super::json_result(&output)
}
