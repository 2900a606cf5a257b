//! favorites_toggle and favorites_list tool implementations.

use crate::state::AppState;
use keigo_core::Error;
use keigo_core::prefs::{Favorite, Favorites};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the favorites_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoritesToggleParams {
    /// Page permalink, e.g. "/posts/sonkeigo/".
    pub permalink: String,

    /// Page title stored alongside the permalink.
    #[serde(default)]
    pub title: String,
}

/// Output structure for the favorites_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoritesToggleOutput {
    pub permalink: String,
    /// Whether the page is a favorite after the toggle.
    pub favorite: bool,
    pub count: usize,
    pub limit: usize,
}

/// Output structure for the favorites_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FavoritesListOutput {
    pub favorites: Vec<Favorite>,
    pub limit: usize,
}

fn favorites(state: &AppState) -> Favorites<'_, keigo_core::SqliteSubstrate> {
    Favorites::new(&state.store).with_limit(state.config.favorites_limit)
}

/// Implementation of the favorites_toggle tool.
pub async fn toggle_impl(state: &AppState, params: FavoritesToggleParams) -> Result<CallToolResult, McpError> {
    let permalink = params.permalink.trim();
    if permalink.is_empty() {
        return Err(Error::InvalidInput("permalink cannot be empty".into()).into());
    }

    let favorites = favorites(state);
    let favorite = favorites.toggle(permalink, params.title.trim())?;
    let output = FavoritesToggleOutput {
        permalink: permalink.to_string(),
        favorite,
        count: favorites.list().len(),
        limit: favorites.limit(),
    };
    super::json_result(&output)
}

/// Implementation of the favorites_list tool.
pub async fn list_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let favorites = favorites(state);
    super::json_result(&FavoritesListOutput { favorites: favorites.list(), limit: favorites.limit() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::*;
    use crate::tools::decode_output;
    use keigo_core::AppConfig;

    fn params(permalink: &str) -> FavoritesToggleParams {
        FavoritesToggleParams { permalink: permalink.to_string(), title: "尊敬語".to_string() }
    }

    #[tokio::test]
    async fn test_toggle_on_and_off() {
        let state = state_with(AppConfig::default(), Vec::new());

        let on: FavoritesToggleOutput = decode_output(&toggle_impl(&state, params("/posts/sonkeigo/")).await.unwrap());
        assert!(on.favorite);
        assert_eq!(on.count, 1);

        let list: FavoritesListOutput = decode_output(&list_impl(&state).await.unwrap());
        assert_eq!(list.favorites[0].title, "尊敬語");
        assert_eq!(list.limit, 100);

        let off: FavoritesToggleOutput = decode_output(&toggle_impl(&state, params("/posts/sonkeigo/")).await.unwrap());
        assert!(!off.favorite);
        assert_eq!(off.count, 0);
    }

    #[tokio::test]
    async fn test_toggle_full_list() {
        let state = state_with(AppConfig { favorites_limit: 1, ..Default::default() }, Vec::new());
        toggle_impl(&state, params("/a/")).await.unwrap();

        let err = toggle_impl(&state, params("/b/")).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }

    #[tokio::test]
    async fn test_toggle_empty_permalink() {
        let state = state_with(AppConfig::default(), Vec::new());
        let err = toggle_impl(&state, params("  ")).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
