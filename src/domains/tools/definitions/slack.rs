//! Slack tool.
//!
//! Wraps the Slack Web API with a bot token. Slack reports most failures
//! as HTTP 200 with `"ok": false` in the body, so every response passes
//! through an ok-check before it becomes a success payload.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::common::{bool_or, int_or, opt_str, required_str};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://slack.com/api";

const LIMIT: ParamSpec =
    ParamSpec::integer("limit", "Number of items to return (default: 100)").range(1.0, 1000.0);

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "send_message",
        description: "Post a message to a channel, optionally in a thread",
        params: &[
            ParamSpec::string("channel", "Channel id or name").required(),
            ParamSpec::string("text", "Message text").required(),
            ParamSpec::string("thread_ts", "Timestamp of the parent message to reply to"),
        ],
    },
    ActionSpec {
        name: "get_channel_history",
        description: "Fetch recent messages from a channel",
        params: &[
            ParamSpec::string("channel", "Channel id").required(),
            LIMIT,
            ParamSpec::string("oldest", "Only messages after this timestamp"),
            ParamSpec::string("latest", "Only messages before this timestamp"),
        ],
    },
    ActionSpec {
        name: "list_channels",
        description: "List channels visible to the bot",
        params: &[
            LIMIT,
            ParamSpec::boolean("exclude_archived", "Skip archived channels (default: true)"),
        ],
    },
    ActionSpec {
        name: "get_channel_info",
        description: "Get metadata about a channel",
        params: &[ParamSpec::string("channel", "Channel id").required()],
    },
    ActionSpec {
        name: "list_users",
        description: "List workspace members",
        params: &[LIMIT],
    },
    ActionSpec {
        name: "get_user_info",
        description: "Get a user's profile",
        params: &[ParamSpec::string("user", "User id, e.g. 'U0123456'").required()],
    },
    ActionSpec {
        name: "search_messages",
        description: "Search messages across the workspace",
        params: &[
            ParamSpec::string("query", "Search query").required(),
            ParamSpec::integer("count", "Results per page (default: 20)").range(1.0, 100.0),
            ParamSpec::integer("page", "Page number (default: 1)"),
        ],
    },
];

/// Map Slack's in-body `ok` flag onto the result.
fn check_ok(body: Value) -> Result<Value, ToolError> {
    if body.get("ok").and_then(Value::as_bool) == Some(false) {
        let reason = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(ToolError::rejected(format!("Slack API error: {reason}")));
    }
    Ok(body)
}

/// Slack Web API tool implementation.
#[derive(Debug)]
pub struct SlackTool {
    client: ProviderClient,
    bot_token: Option<String>,
    base: String,
}

impl SlackTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "slack";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Send messages and read channels, users and search results in a Slack workspace.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            bot_token: credentials.slack_bot_token.clone(),
            base: BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "SLACK_BOT_TOKEN",
            })?;
        Ok(Auth::Bearer(token))
    }

    async fn get(
        &self,
        operation: &'static str,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let body = self
            .client
            .get_json(operation, &format!("{}/{}", self.base, method), query, auth)
            .await?;
        check_ok(body)
    }

    async fn send_message(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let mut body = json!({
            "channel": required_str(params, "channel")?,
            "text": required_str(params, "text")?,
        });
        if let Some(thread_ts) = opt_str(params, "thread_ts") {
            body["thread_ts"] = json!(thread_ts);
        }
        let response = self
            .client
            .post_json(
                "send message",
                &format!("{}/chat.postMessage", self.base),
                &body,
                auth,
            )
            .await?;
        check_ok(response)
    }

    async fn get_channel_history(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let mut query = vec![
            ("channel", required_str(params, "channel")?.to_string()),
            ("limit", int_or(params, "limit", 100).to_string()),
        ];
        for name in ["oldest", "latest"] {
            if let Some(value) = opt_str(params, name) {
                query.push((name, value.to_string()));
            }
        }
        self.get("fetch channel history", "conversations.history", &query)
            .await
    }

    async fn list_channels(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("limit", int_or(params, "limit", 100).to_string()),
            (
                "exclude_archived",
                bool_or(params, "exclude_archived", true).to_string(),
            ),
        ];
        self.get("list channels", "conversations.list", &query).await
    }

    async fn get_channel_info(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [("channel", required_str(params, "channel")?.to_string())];
        self.get("get channel info", "conversations.info", &query)
            .await
    }

    async fn list_users(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [("limit", int_or(params, "limit", 100).to_string())];
        self.get("list users", "users.list", &query).await
    }

    async fn get_user_info(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [("user", required_str(params, "user")?.to_string())];
        self.get("get user info", "users.info", &query).await
    }

    async fn search_messages(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("query", required_str(params, "query")?.to_string()),
            ("count", int_or(params, "count", 20).to_string()),
            ("page", int_or(params, "page", 1).to_string()),
        ];
        self.get("search messages", "search.messages", &query).await
    }
}

#[async_trait]
impl ProviderTool for SlackTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn actions(&self) -> &'static [ActionSpec] {
        ACTIONS
    }

    async fn call(&self, action: &str, params: &JsonObject) -> Result<Value, ToolError> {
        match action {
            "send_message" => self.send_message(params).await,
            "get_channel_history" => self.get_channel_history(params).await,
            "list_channels" => self.list_channels(params).await,
            "get_channel_info" => self.get_channel_info(params).await,
            "list_users" => self.list_users(params).await,
            "get_user_info" => self.get_user_info(params).await,
            "search_messages" => self.search_messages(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl SlackTool {
    /// Tool pointed at a stub server, with a dummy bot token.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            bot_token: Some("xoxb-test".to_string()),
            base: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{StubServer, args};

    #[tokio::test]
    async fn test_send_message_posts_channel_and_text() {
        let stub =
            StubServer::start(200, r#"{"ok": true, "channel": "C1", "ts": "1.2"}"#).await;
        let tool = SlackTool::stubbed(&stub.base_url());

        let payload = tool
            .call(
                "send_message",
                &args(json!({"channel": "C1", "text": "deploy done"})),
            )
            .await
            .unwrap();
        assert_eq!(payload["ts"], "1.2");

        let requests = stub.requests();
        assert_eq!(requests[0].0, "/chat.postMessage");
        let body: Value = serde_json::from_str(&requests[0].1).unwrap();
        assert_eq!(body, json!({"channel": "C1", "text": "deploy done"}));
    }

    #[tokio::test]
    async fn test_ok_false_maps_to_failure() {
        let stub = StubServer::start(200, r#"{"ok": false, "error": "channel_not_found"}"#).await;
        let tool = SlackTool::stubbed(&stub.base_url());

        let err = tool
            .call("get_channel_info", &args(json!({"channel": "C404"})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Slack API error: channel_not_found");
    }

    #[tokio::test]
    async fn test_ok_false_without_reason_uses_fallback() {
        let stub = StubServer::start(200, r#"{"ok": false}"#).await;
        let tool = SlackTool::stubbed(&stub.base_url());

        let err = tool.call("list_users", &args(json!({}))).await.unwrap_err();

        assert_eq!(err.to_string(), "Slack API error: Unknown error");
    }

    #[tokio::test]
    async fn test_missing_token_makes_no_call() {
        let stub = StubServer::start(200, r#"{"ok": true}"#).await;
        let mut tool = SlackTool::stubbed(&stub.base_url());
        tool.bot_token = None;

        let err = tool
            .call("list_channels", &args(json!({})))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing credential for slack: set SLACK_BOT_TOKEN"
        );
        assert_eq!(stub.hits(), 0);
    }
}
