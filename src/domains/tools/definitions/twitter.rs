//! Twitter (X) tool.
//!
//! Wraps the Twitter v2 API: recent-tweet search, user timelines, user
//! profiles and single-tweet lookups, authenticated with an app bearer
//! token.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::common::{int_or, opt_str, required_str};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://api.twitter.com/2";

const TWEET_FIELDS: &str = "created_at,author_id,public_metrics,entities,context_annotations,lang";
const USER_FIELDS: &str = "created_at,description,entities,id,location,name,pinned_tweet_id,\
                           profile_image_url,protected,public_metrics,url,username,verified,withheld";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "search_tweets",
        description: "Search recent tweets matching a query",
        params: &[
            ParamSpec::string("query", "Search query, supports Twitter search operators")
                .required(),
            ParamSpec::integer("max_results", "Number of tweets to return (default: 10)")
                .range(10.0, 100.0),
            ParamSpec::string("since_id", "Only return tweets newer than this tweet id"),
            ParamSpec::string("until_id", "Only return tweets older than this tweet id"),
            ParamSpec::string("start_time", "Oldest timestamp to include (RFC 3339)"),
            ParamSpec::string("end_time", "Newest timestamp to include (RFC 3339)"),
        ],
    },
    ActionSpec {
        name: "get_user_tweets",
        description: "Get the most recent tweets posted by a user",
        params: &[
            ParamSpec::string("user_id", "Numeric user id").required(),
            ParamSpec::integer("max_results", "Number of tweets to return (default: 10)")
                .range(5.0, 100.0),
        ],
    },
    ActionSpec {
        name: "get_user_profile",
        description: "Get a user profile by username or user id (one of the two is required)",
        params: &[
            ParamSpec::string("username", "Handle without the @ prefix"),
            ParamSpec::string("user_id", "Numeric user id"),
        ],
    },
    ActionSpec {
        name: "get_tweet_details",
        description: "Get a single tweet with its author and referenced tweets",
        params: &[ParamSpec::string("tweet_id", "Tweet id").required()],
    },
];

/// Twitter v2 tool implementation.
#[derive(Debug)]
pub struct TwitterTool {
    client: ProviderClient,
    bearer_token: Option<String>,
    base: String,
}

impl TwitterTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "twitter";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search tweets and look up users and tweets on Twitter (X).";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            bearer_token: credentials.twitter_bearer_token.clone(),
            base: BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "TWITTER_BEARER_TOKEN",
            })?;
        Ok(Auth::Bearer(token))
    }

    async fn search_tweets(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let mut query = vec![
            ("query", required_str(params, "query")?.to_string()),
            ("max_results", int_or(params, "max_results", 10).to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
        ];
        for name in ["since_id", "until_id", "start_time", "end_time"] {
            if let Some(value) = opt_str(params, name) {
                query.push((name, value.to_string()));
            }
        }
        self.client
            .get_json(
                "search tweets",
                &format!("{}/tweets/search/recent", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn get_user_tweets(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let user_id = required_str(params, "user_id")?;
        let query = [
            ("max_results", int_or(params, "max_results", 10).to_string()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
        ];
        self.client
            .get_json(
                "get user tweets",
                &format!("{}/users/{}/tweets", self.base, user_id),
                &query,
                auth,
            )
            .await
    }

    async fn get_user_profile(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        // One of username/user_id selects the endpoint; username wins.
        let url = if let Some(username) = opt_str(params, "username") {
            format!("{}/users/by/username/{}", self.base, username)
        } else if let Some(user_id) = opt_str(params, "user_id") {
            format!("{}/users/{}", self.base, user_id)
        } else {
            return Err(ToolError::MissingParameter("username"));
        };
        let query = [("user.fields", USER_FIELDS.to_string())];
        self.client
            .get_json("get user profile", &url, &query, auth)
            .await
    }

    async fn get_tweet_details(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let tweet_id = required_str(params, "tweet_id")?;
        let query = [
            (
                "tweet.fields",
                format!("{TWEET_FIELDS},referenced_tweets"),
            ),
            ("expansions", "author_id,referenced_tweets.id".to_string()),
            ("user.fields", USER_FIELDS.to_string()),
        ];
        self.client
            .get_json(
                "get tweet details",
                &format!("{}/tweets/{}", self.base, tweet_id),
                &query,
                auth,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for TwitterTool {
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
            "search_tweets" => self.search_tweets(params).await,
            "get_user_tweets" => self.get_user_tweets(params).await,
            "get_user_profile" => self.get_user_profile(params).await,
            "get_tweet_details" => self.get_tweet_details(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl TwitterTool {
    /// Tool pointed at a stub server, with a dummy bearer token.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            bearer_token: Some("test-token".to_string()),
            base: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{StubServer, args};
    use serde_json::json;

    #[tokio::test]
    async fn test_search_returns_payload_verbatim() {
        let stub = StubServer::start(
            200,
            r#"{"data": [{"id": "1", "text": "hello"}], "meta": {"result_count": 1}}"#,
        )
        .await;
        let tool = TwitterTool::stubbed(&stub.base_url());

        let payload = tool
            .call("search_tweets", &args(json!({"query": "rust lang"})))
            .await
            .unwrap();

        assert_eq!(payload["meta"]["result_count"], 1);
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_profile_requires_username_or_user_id() {
        let stub = StubServer::start(200, r#"{"data": {"id": "2"}}"#).await;
        let tool = TwitterTool::stubbed(&stub.base_url());

        let err = tool
            .call("get_user_profile", &args(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter: username");
        assert_eq!(stub.hits(), 0);

        let by_id = tool
            .call("get_user_profile", &args(json!({"user_id": "2"})))
            .await
            .unwrap();
        assert_eq!(by_id["data"]["id"], "2");
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_search_carries_status() {
        let stub = StubServer::start(429, r#"{"title": "Too Many Requests"}"#).await;
        let tool = TwitterTool::stubbed(&stub.base_url());

        let err = tool
            .call("search_tweets", &args(json!({"query": "btc"})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to search tweets: 429");
    }
}
