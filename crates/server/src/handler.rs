//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use crate::state::AppState;
use crate::tools::{
    experiments::{ExperimentAssignParams, assign_impl},
    favorites::{FavoritesToggleParams, list_impl, toggle_impl},
    site_reload::reload_impl,
    site_search::{SiteSearchParams, search_impl},
    store_stats::stats_impl,
};
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the keigo site.
#[derive(Clone)]
pub struct KeigoServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KeigoServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(description = "Search the site's articles. Returns ranked hits with highlighted titles and snippets.")]
    async fn site_search(&self, params: Parameters<SiteSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.state, params.0).await
    }

    #[tool(description = "Reload the article index from its sources, bypassing the cache.")]
    async fn site_reload(&self) -> Result<CallToolResult, McpError> {
        reload_impl(&self.state).await
    }

    #[tool(description = "Add a page to favorites, or remove it if already present.")]
    async fn favorites_toggle(&self, params: Parameters<FavoritesToggleParams>) -> Result<CallToolResult, McpError> {
        toggle_impl(&self.state, params.0).await
    }

    #[tool(description = "List favorite pages, oldest first.")]
    async fn favorites_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.state).await
    }

    /// Variants stick once assigned, even if weights change later.
    #[tool(description = "Get the visitor's variant for a configured A/B experiment.")]
    async fn experiment_assign(&self, params: Parameters<ExperimentAssignParams>) -> Result<CallToolResult, McpError> {
        assign_impl(&self.state, params.0).await
    }

    #[tool(description = "Report storage namespace, availability, size, keys, and index status.")]
    async fn store_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.state).await
    }
}

impl ServerHandler for KeigoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "keigo-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
