//! MCP front end: exposes [`FoodTools`] over the rmcp tool router, on
//! stdio or as a streamable HTTP service.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ErrorData, ServerCapabilities, ServerInfo, Tool},
    tool_handler,
    transport::{
        stdio,
        streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpServerConfig,
            StreamableHttpService,
        },
    },
    ServerHandler, ServiceExt,
};
use serde::Serialize;

use crate::error::{ErrorEnvelope, ToolError};
use crate::tools::args::{CompareArgs, DetailsArgs, MapArgs, RecommendFoodArgs, SearchNearbyArgs};
use crate::tools::FoodTools;

#[derive(Debug, Clone)]
pub struct TasteMapServer {
    tools: Arc<FoodTools>,
    tool_router: ToolRouter<Self>,
}

#[rmcp::tool_router]
impl TasteMapServer {
    pub fn new(tools: Arc<FoodTools>) -> Self {
        Self {
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Name, description and input schema of every tool, as listed to MCP
    /// clients.
    pub fn catalogue() -> Vec<Tool> {
        Self::tool_router().list_all()
    }

    #[rmcp::tool(
        description = "Recommend restaurants near an address. Searches the area, fetches full details for the candidates and returns the best matches ranked by composite score, rating, distance or price."
    )]
    async fn recommend_food(
        &self,
        Parameters(args): Parameters<RecommendFoodArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.tools.recommend_food(args).await)
    }

    #[rmcp::tool(
        description = "Search for restaurants near an address by keyword, with optional price filter, sort order and fuzzy cuisine expansion."
    )]
    async fn search_nearby_restaurants(
        &self,
        Parameters(args): Parameters<SearchNearbyArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.tools.search_nearby_restaurants(args).await)
    }

    #[rmcp::tool(
        description = "Full details for one restaurant: ratings breakdown, price, tags, opening hours, engagement and promotions."
    )]
    async fn get_restaurant_details(
        &self,
        Parameters(args): Parameters<DetailsArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.tools.get_restaurant_details(args).await)
    }

    #[rmcp::tool(
        description = "Compare up to 10 restaurants side by side. Unknown ids are reported as not_found entries."
    )]
    async fn compare_restaurants(
        &self,
        Parameters(args): Parameters<CompareArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.tools.compare_restaurants(args).await)
    }

    #[rmcp::tool(
        description = "Static map image URL with a marker for each of up to 10 restaurants."
    )]
    async fn generate_restaurant_map(
        &self,
        Parameters(args): Parameters<MapArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.tools.generate_restaurant_map(args).await)
    }
}

/// Tool failures become error results the client can read; only a failure
/// to encode the output is a protocol error.
fn into_call_result<T: Serialize>(result: Result<T, ToolError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(output) => {
            let json = serde_json::to_string_pretty(&output).map_err(|e| {
                ErrorData::internal_error(format!("failed to encode tool output: {e}"), None)
            })?;
            Ok(CallToolResult::success(vec![Content::text(json)]))
        }
        Err(err) => {
            tracing::warn!(code = err.code(), error = %err, "tool call failed");
            let json = serde_json::to_string(&ErrorEnvelope::from(&err)).map_err(|e| {
                ErrorData::internal_error(format!("failed to encode tool error: {e}"), None)
            })?;
            Ok(CallToolResult::error(vec![Content::text(json)]))
        }
    }
}

#[tool_handler]
impl ServerHandler for TasteMapServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Restaurant recommendations backed by Baidu Maps. Start with recommend_food or search_nearby_restaurants, then use the returned uids with get_restaurant_details, compare_restaurants or generate_restaurant_map.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Serves MCP over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns an error if the transport fails to initialise or terminates
/// abnormally.
pub async fn serve_stdio(tools: Arc<FoodTools>) -> anyhow::Result<()> {
    tracing::info!("serving MCP over stdio");
    let service = TasteMapServer::new(tools).serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// MCP over streamable HTTP, for mounting on the axum router. Each session
/// gets its own handler; all of them share `tools` and therefore the place
/// cache.
pub fn http_service(
    tools: Arc<FoodTools>,
) -> StreamableHttpService<TasteMapServer, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(TasteMapServer::new(Arc::clone(&tools))),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tastemap_core::ValidationError;

    fn as_json(result: &CallToolResult) -> serde_json::Value {
        serde_json::to_value(result).unwrap()
    }

    #[test]
    fn catalogue_lists_all_five_tools() {
        let names: Vec<String> = TasteMapServer::catalogue()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        for expected in crate::tools::ToolName::ALL {
            assert!(
                names.iter().any(|n| n == expected.as_str()),
                "missing {}",
                expected.as_str()
            );
        }
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn success_is_pretty_json_text() {
        let result = into_call_result::<_>(Ok(serde_json::json!({ "count": 2 }))).unwrap();
        let json = as_json(&result);
        assert_ne!(json["isError"], true);
        let text = json["content"][0]["text"].as_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["count"], 2);
    }

    #[test]
    fn tool_error_becomes_error_result_with_envelope() {
        let result =
            into_call_result::<()>(Err(ToolError::from(ValidationError::ZeroLimit))).unwrap();
        let json = as_json(&result);
        assert_eq!(json["isError"], true);
        let text = json["content"][0]["text"].as_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "result limit must be at least 1");
    }
}
