//! Tool registry and dispatch core.
//!
//! The registry maps tool names to provider tool instances. It is built
//! once at startup and read-only afterward. Dispatch resolves a
//! `(tool, action, parameters)` triple, validates the parameters against
//! the action's declared table before any network call, invokes the
//! handler, and folds every failure into a uniform [`ActionResult`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::ProviderClient;
use super::definitions::{
    CryptoTool, CurrencyTool, DefiLlamaTool, GmailTool, GoogleCalendarTool, GoogleMapsTool,
    JiraTool, OpenWeatherTool, RedditTool, SlackTool, TwitterTool, YouTubeTool,
};
use super::envelope::ActionResult;
use super::error::ToolError;
use super::spec::{ActionSpec, json_type_name};
use crate::core::config::Config;

// ============================================================================
// Provider tool trait
// ============================================================================

/// A provider-backed tool exposing a fixed set of actions.
///
/// Implementations hold their endpoint templates and credentials; the
/// registry owns validation and error folding, so `call` only runs for
/// actions the tool declares, with parameters that already passed the
/// action's declarative checks.
#[async_trait]
pub trait ProviderTool: Send + Sync {
    /// Tool name as registered in MCP.
    fn name(&self) -> &'static str;

    /// Tool description shown to clients.
    fn description(&self) -> &'static str;

    /// The actions this tool declares, with their parameter specs.
    fn actions(&self) -> &'static [ActionSpec];

    /// Execute one action against the provider.
    async fn call(&self, action: &str, params: &JsonObject) -> Result<Value, ToolError>;
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Registry of every provider tool, keyed by tool name.
///
/// Built once at startup; iteration follows sorted tool-name order, so
/// tool listings are deterministic.
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn ProviderTool>>,
}

impl ToolRegistry {
    /// Build the registry with every provider tool registered.
    ///
    /// All tools share one pooled HTTP client. Credentials are read from
    /// the configuration here, but their absence only surfaces when a
    /// tool that needs them is actually called.
    pub fn new(config: &Config) -> Self {
        let client = ProviderClient::new(&config.http_client);
        let credentials = &config.credentials;

        let mut registry = Self {
            tools: BTreeMap::new(),
        };
        registry.register(Arc::new(OpenWeatherTool::new(client.clone(), credentials)));
        registry.register(Arc::new(TwitterTool::new(client.clone(), credentials)));
        // Reddit builds its own client so its configured User-Agent applies.
        registry.register(Arc::new(RedditTool::new(&config.http_client, credentials)));
        registry.register(Arc::new(YouTubeTool::new(client.clone(), credentials)));
        registry.register(Arc::new(JiraTool::new(client.clone(), credentials)));
        registry.register(Arc::new(SlackTool::new(client.clone(), credentials)));
        registry.register(Arc::new(GmailTool::new(client.clone(), credentials)));
        registry.register(Arc::new(GoogleCalendarTool::new(client.clone(), credentials)));
        registry.register(Arc::new(GoogleMapsTool::new(client.clone(), credentials)));
        registry.register(Arc::new(CurrencyTool::new(client.clone())));
        registry.register(Arc::new(CryptoTool::new(client.clone())));
        registry.register(Arc::new(DefiLlamaTool::new(client)));

        info!(tools = registry.tools.len(), "tool registry initialized");
        registry
    }

    fn register(&mut self, tool: Arc<dyn ProviderTool>) {
        debug!(
            tool = tool.name(),
            actions = tool.actions().len(),
            "registering tool"
        );
        self.tools.insert(tool.name(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ProviderTool>> {
        self.tools.get(name)
    }

    /// Iterate over registered tools in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ProviderTool>> {
        self.tools.values()
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch one action: resolve the tool, validate the parameters,
    /// invoke the handler, and fold the outcome into an [`ActionResult`].
    ///
    /// Every failure (unknown tool or action, validation, missing
    /// credential, transport, provider status, decode) comes back as a
    /// `Failure` with its canonical message; nothing propagates as an
    /// error to the transport layer.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        action: &str,
        params: &JsonObject,
    ) -> ActionResult {
        match self.run(tool_name, action, params).await {
            Ok(payload) => ActionResult::success(payload),
            Err(e) => {
                warn!(tool = tool_name, action, error = %e, "action failed");
                ActionResult::failure(e.to_string())
            }
        }
    }

    async fn run(
        &self,
        tool_name: &str,
        action: &str,
        params: &JsonObject,
    ) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::unknown_tool(tool_name))?;
        let spec = tool
            .actions()
            .iter()
            .find(|a| a.name == action)
            .ok_or_else(|| ToolError::unknown_action(tool_name, action))?;

        spec.validate(params)?;
        debug!(tool = tool_name, action, "dispatching action");
        tool.call(action, params).await
    }

    /// Execute an MCP `tools/call`: the `action` member of the arguments
    /// object selects the action and the remaining members are its
    /// parameters.
    pub async fn execute_call(&self, tool_name: &str, mut arguments: JsonObject) -> ActionResult {
        let action = match arguments.remove("action") {
            Some(Value::String(action)) => action,
            None | Some(Value::Null) => {
                return ActionResult::failure(ToolError::MissingParameter("action").to_string());
            }
            Some(other) => {
                let err = ToolError::InvalidParameterType {
                    name: "action",
                    expected: "string",
                    actual: json_type_name(&other),
                };
                return ActionResult::failure(err.to_string());
            }
        };
        self.dispatch(tool_name, &action, &arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{StubServer, args};
    use serde_json::json;

    fn stub_registry(tool: Arc<dyn ProviderTool>) -> ToolRegistry {
        let mut registry = ToolRegistry {
            tools: BTreeMap::new(),
        };
        registry.register(tool);
        registry
    }

    #[test]
    fn test_registry_lists_all_tools_sorted() {
        let registry = ToolRegistry::new(&Config::default());
        assert_eq!(
            registry.names(),
            vec![
                "crypto",
                "currency",
                "defillama",
                "gmail",
                "google_calendar",
                "googlemaps",
                "jira",
                "openweather",
                "reddit",
                "slack",
                "twitter",
                "youtube",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_failure() {
        let registry = ToolRegistry::new(&Config::default());
        let result = registry
            .dispatch("definitely_not_a_tool", "anything", &args(json!({})))
            .await;
        assert_eq!(
            result,
            ActionResult::failure("unknown tool: definitely_not_a_tool")
        );
    }

    #[tokio::test]
    async fn test_unknown_action_fails_for_every_tool() {
        let registry = ToolRegistry::new(&Config::default());
        for tool in registry.iter() {
            let result = registry
                .dispatch(tool.name(), "does_not_exist", &args(json!({})))
                .await;
            match result {
                ActionResult::Failure { message } => {
                    assert!(message.contains("unknown action"), "{message}");
                    assert!(message.contains(tool.name()), "{message}");
                }
                ActionResult::Success { .. } => panic!("unknown action must fail"),
            }
        }
    }

    #[tokio::test]
    async fn test_successful_fetch_returns_provider_payload() {
        let stub = StubServer::start(200, r#"{"temp": 15.2}"#).await;
        let registry = stub_registry(Arc::new(OpenWeatherTool::stubbed(&stub.base_url())));

        let result = registry
            .dispatch(
                "openweather",
                "get_current_weather",
                &args(json!({"location": "London", "units": "metric"})),
            )
            .await;

        assert_eq!(result, ActionResult::success(json!({"temp": 15.2})));
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_missing_required_parameter_makes_no_network_call() {
        let stub = StubServer::start(200, r#"{"id": "10001"}"#).await;
        let registry = stub_registry(Arc::new(JiraTool::stubbed(&stub.base_url())));

        let result = registry
            .dispatch("jira", "create_issue", &args(json!({"summary": "x"})))
            .await;

        assert_eq!(
            result,
            ActionResult::failure("missing required parameter: project_key")
        );
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_parameter_makes_no_network_call() {
        let stub = StubServer::start(200, r#"{"data": {"children": []}}"#).await;
        let registry = stub_registry(Arc::new(RedditTool::stubbed(&stub.base_url())));

        let result = registry
            .dispatch(
                "reddit",
                "search_posts",
                &args(json!({"query": "btc", "limit": 500})),
            )
            .await;

        assert_eq!(
            result,
            ActionResult::failure("invalid value for parameter 'limit': must be between 1 and 100")
        );
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_wrong_parameter_type_makes_no_network_call() {
        let stub = StubServer::start(200, r#"{}"#).await;
        let registry = stub_registry(Arc::new(OpenWeatherTool::stubbed(&stub.base_url())));

        let result = registry
            .dispatch(
                "openweather",
                "get_forecast",
                &args(json!({"location": "Paris", "days": "5"})),
            )
            .await;

        assert_eq!(
            result,
            ActionResult::failure(
                "invalid type for parameter 'days': expected integer, got string"
            )
        );
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_identical_calls_produce_identical_results() {
        let stub = StubServer::start(200, r#"{"weather": [{"main": "Rain"}]}"#).await;
        let registry = stub_registry(Arc::new(OpenWeatherTool::stubbed(&stub.base_url())));
        let params = args(json!({"location": "Oslo"}));

        let first = registry
            .dispatch("openweather", "get_current_weather", &params)
            .await;
        let second = registry
            .dispatch("openweather", "get_current_weather", &params)
            .await;

        assert_eq!(first, second);
        assert_eq!(stub.hits(), 2);
    }

    #[tokio::test]
    async fn test_execute_call_splits_the_action_member() {
        let stub = StubServer::start(200, r#"{"temp": -3.0}"#).await;
        let registry = stub_registry(Arc::new(OpenWeatherTool::stubbed(&stub.base_url())));

        let result = registry
            .execute_call(
                "openweather",
                args(json!({"action": "get_current_weather", "location": "Tromso"})),
            )
            .await;

        assert_eq!(result, ActionResult::success(json!({"temp": -3.0})));
    }

    #[tokio::test]
    async fn test_execute_call_requires_an_action_member() {
        let registry = ToolRegistry::new(&Config::default());

        let result = registry
            .execute_call("openweather", args(json!({"location": "London"})))
            .await;
        assert_eq!(
            result,
            ActionResult::failure("missing required parameter: action")
        );

        let result = registry
            .execute_call("openweather", args(json!({"action": 7})))
            .await;
        assert_eq!(
            result,
            ActionResult::failure(
                "invalid type for parameter 'action': expected string, got integer"
            )
        );
    }
}
