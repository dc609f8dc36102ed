//! MCP server handler.
//!
//! [`McpServer`] wires the tool registry into rmcp: the registry owns every
//! provider tool and all dispatch logic, the `ToolRouter` built from it
//! exposes each tool over MCP, and this handler only reports server info.
//!
//! Adding a new tool does not require modifying this file; see
//! `domains/tools/definitions/`.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use crate::domains::tools::{ToolRegistry, build_tool_router};

/// Usage summary sent to clients at initialization.
pub(crate) const INSTRUCTIONS: &str = "Gateway to external REST APIs: weather, Twitter, Reddit, \
    YouTube, Slack, Jira, Gmail, Google Calendar, Google Maps, currency, crypto and DeFiLlama. \
    Every tool takes an 'action' parameter selecting the operation, plus that action's own \
    parameters, and returns {\"success\": true, \"data\": ...} or {\"success\": false, \
    \"error\": \"...\"}.";

/// The main MCP server handler.
///
/// Implements `ServerHandler` from rmcp; tool listing and calls are routed
/// through the `ToolRouter`, which dispatches into the shared registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Provider tool registry, shared with every transport.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// The registry is built once here; transports and the rmcp router all
    /// dispatch through the same instance, so per-tool state (such as the
    /// Reddit token cache) is shared.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(ToolRegistry::new(&config));

        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            registry,
            config,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the shared tool registry.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for the HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Execute a `tools/call` by name (for the HTTP transport).
    ///
    /// Dispatch failures come back inside the result envelope, never as a
    /// transport-level error, so the return shape is always a valid MCP
    /// tool-call result.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: rmcp::model::JsonObject,
    ) -> serde_json::Value {
        let outcome = self.registry.execute_call(name, arguments).await;
        let result = crate::domains::tools::router::to_call_result(outcome);
        serde_json::to_value(&result).unwrap_or_else(|_| {
            serde_json::json!({
                "content": [{"type": "text", "text": "failed to serialize response"}],
                "isError": true
            })
        })
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_reports_tool_capability_only() {
        let server = McpServer::new(Config::default());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_list_tools_covers_the_registry() {
        let server = McpServer::new(Config::default());
        let tools = server.list_tools();
        assert_eq!(tools.len(), server.registry().len());
        for tool in &tools {
            assert!(tool["name"].is_string());
            assert!(tool["inputSchema"]["properties"]["action"].is_object());
        }
    }

    #[tokio::test]
    async fn test_call_tool_returns_mcp_shaped_result() {
        let server = McpServer::new(Config::default());
        let result = server
            .call_tool("no_such_tool", rmcp::model::JsonObject::new())
            .await;
        assert_eq!(result["isError"], serde_json::json!(true));
        let text = result["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        assert!(text.contains("unknown tool: no_such_tool"), "{text}");
    }
}
