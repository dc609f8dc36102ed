//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every registered tool becomes one MCP route. The route handler does
//! no work of its own: it hands the raw arguments to the registry and
//! wraps whatever comes back in the response envelope, so MCP clients
//! always receive `{"success": ...}` JSON text, never a protocol error.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content, Tool},
};

use super::envelope::ActionResult;
use super::registry::{ProviderTool, ToolRegistry};
use super::spec::input_schema;

/// Convert a dispatch outcome into the MCP call result, with the
/// envelope serialized as the text content either way.
pub(crate) fn to_call_result(result: ActionResult) -> CallToolResult {
    let success = result.is_success();
    let envelope = result.into_envelope();
    let text = serde_json::to_string(&envelope).unwrap_or_else(|_| {
        r#"{"success":false,"error":"failed to serialize response"}"#.to_string()
    });
    if success {
        CallToolResult::success(vec![Content::text(text)])
    } else {
        CallToolResult::error(vec![Content::text(text)])
    }
}

/// MCP tool model for one provider tool.
fn to_tool(tool: &dyn ProviderTool) -> Tool {
    Tool {
        name: tool.name().into(),
        description: Some(tool.description().into()),
        input_schema: Arc::new(input_schema(tool.actions())),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Build the tool router with one route per registered tool.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let mut router = ToolRouter::new();
    for tool in registry.iter() {
        let name = tool.name();
        let registry = registry.clone();
        router = router.with_route(ToolRoute::new_dyn(
            to_tool(tool.as_ref()),
            move |ctx: ToolCallContext<'_, S>| {
                let registry = registry.clone();
                let arguments = ctx.arguments.clone().unwrap_or_default();
                async move {
                    let outcome = registry.execute_call(name, arguments).await;
                    Ok::<_, McpError>(to_call_result(outcome))
                }
                .boxed()
            },
        ));
    }
    router
}
