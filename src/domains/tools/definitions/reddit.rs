//! Reddit tool.
//!
//! Uses Reddit's application-only OAuth: a client-credentials token is
//! fetched from `www.reddit.com` with HTTP Basic auth and cached until
//! shortly before expiry; data calls go to `oauth.reddit.com` with the
//! bearer token. Reddit requires a descriptive User-Agent, so this tool
//! builds its own HTTP client instead of sharing the pooled one.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::common::{int_or, required_str, str_or};
use crate::core::config::{CredentialsConfig, HttpClientConfig};
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const AUTH_BASE: &str = "https://www.reddit.com";
const DATA_BASE: &str = "https://oauth.reddit.com";
const DEFAULT_USER_AGENT: &str = "mcp-gateway/0.1";

/// Tokens are refreshed this long before the provider-reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const LIMIT: ParamSpec =
    ParamSpec::integer("limit", "Number of items to return (default: 25)").range(1.0, 100.0);
const TIME_FILTER: ParamSpec = ParamSpec::options(
    "time_filter",
    &["hour", "day", "week", "month", "year", "all"],
    "Time window for results (default: day)",
);

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "search_posts",
        description: "Search posts across all of Reddit",
        params: &[
            ParamSpec::string("query", "Search query").required(),
            LIMIT,
            TIME_FILTER,
            ParamSpec::options(
                "sort",
                &["relevance", "hot", "top", "new", "comments"],
                "Result ordering (default: relevance)",
            ),
        ],
    },
    ActionSpec {
        name: "get_subreddit_posts",
        description: "Get posts from a subreddit",
        params: &[
            ParamSpec::string("subreddit", "Subreddit name without the r/ prefix").required(),
            ParamSpec::options(
                "sort",
                &["hot", "new", "top", "rising"],
                "Listing to fetch (default: hot)",
            ),
            LIMIT,
            TIME_FILTER,
        ],
    },
    ActionSpec {
        name: "get_post_comments",
        description: "Get top-level comments for a post",
        params: &[
            ParamSpec::string("post_id", "Post id, e.g. 'abc123'").required(),
            LIMIT,
        ],
    },
    ActionSpec {
        name: "get_user_posts",
        description: "Get posts submitted by a user",
        params: &[
            ParamSpec::string("username", "Reddit username without the u/ prefix").required(),
            LIMIT,
        ],
    },
    ActionSpec {
        name: "get_subreddit_info",
        description: "Get metadata about a subreddit",
        params: &[ParamSpec::string("subreddit", "Subreddit name without the r/ prefix").required()],
    },
    ActionSpec {
        name: "get_popular_subreddits",
        description: "List currently popular subreddits",
        params: &[LIMIT],
    },
];

/// App-only OAuth token with its refresh deadline.
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Reddit tool implementation.
#[derive(Debug)]
pub struct RedditTool {
    client: ProviderClient,
    client_id: Option<String>,
    client_secret: Option<String>,
    auth_base: String,
    data_base: String,
    token: RwLock<Option<CachedToken>>,
}

impl RedditTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "reddit";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search Reddit and fetch posts, comments, subreddits and user activity.";

    pub fn new(http: &HttpClientConfig, credentials: &CredentialsConfig) -> Self {
        let user_agent = credentials
            .reddit_user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let client = ProviderClient::new(&HttpClientConfig {
            user_agent,
            ..http.clone()
        });
        Self {
            client,
            client_id: credentials.reddit_client_id.clone(),
            client_secret: credentials.reddit_client_secret.clone(),
            auth_base: AUTH_BASE.to_string(),
            data_base: DATA_BASE.to_string(),
            token: RwLock::new(None),
        }
    }

    /// Return a valid app token, fetching a fresh one when the cache is
    /// empty or within the expiry margin.
    async fn token(&self) -> Result<String, ToolError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.token.clone());
                }
            }
        }

        let client_id = self
            .client_id
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "REDDIT_CLIENT_ID",
            })?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "REDDIT_CLIENT_SECRET",
            })?;

        debug!("fetching reddit app token");
        let body = self
            .client
            .post_form(
                "authenticate with reddit",
                &format!("{}/api/v1/access_token", self.auth_base),
                &[("grant_type", "client_credentials")],
                Auth::Basic {
                    user: client_id,
                    password: client_secret,
                },
            )
            .await?;

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ToolError::rejected("Failed to authenticate with reddit: no access token in response")
            })?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_u64)
            .unwrap_or(3600);
        let expires_at = Instant::now()
            + Duration::from_secs(expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);

        let mut cached = self.token.write().await;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });
        Ok(token)
    }

    async fn fetch(
        &self,
        operation: &'static str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ToolError> {
        let token = self.token().await?;
        self.client
            .get_json(
                operation,
                &format!("{}{}", self.data_base, endpoint),
                query,
                Auth::Bearer(&token),
            )
            .await
    }

    async fn search_posts(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("q", required_str(params, "query")?.to_string()),
            ("limit", int_or(params, "limit", 25).to_string()),
            ("t", str_or(params, "time_filter", "day").to_string()),
            ("sort", str_or(params, "sort", "relevance").to_string()),
            ("type", "link".to_string()),
        ];
        self.fetch("search reddit posts", "/search", &query).await
    }

    async fn get_subreddit_posts(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let subreddit = required_str(params, "subreddit")?;
        let sort = str_or(params, "sort", "hot");
        let query = [
            ("limit", int_or(params, "limit", 25).to_string()),
            ("t", str_or(params, "time_filter", "day").to_string()),
        ];
        self.fetch(
            "fetch subreddit posts",
            &format!("/r/{subreddit}/{sort}"),
            &query,
        )
        .await
    }

    async fn get_post_comments(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let post_id = required_str(params, "post_id")?;
        let query = [
            ("limit", int_or(params, "limit", 25).to_string()),
            ("depth", "1".to_string()),
        ];
        self.fetch(
            "fetch post comments",
            &format!("/comments/{post_id}"),
            &query,
        )
        .await
    }

    async fn get_user_posts(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let username = required_str(params, "username")?;
        let query = [("limit", int_or(params, "limit", 25).to_string())];
        self.fetch(
            "fetch user posts",
            &format!("/user/{username}/submitted"),
            &query,
        )
        .await
    }

    async fn get_subreddit_info(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let subreddit = required_str(params, "subreddit")?;
        self.fetch(
            "fetch subreddit info",
            &format!("/r/{subreddit}/about"),
            &[],
        )
        .await
    }

    async fn get_popular_subreddits(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [("limit", int_or(params, "limit", 25).to_string())];
        self.fetch("fetch popular subreddits", "/subreddits/popular", &query)
            .await
    }
}

#[async_trait]
impl ProviderTool for RedditTool {
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
            "search_posts" => self.search_posts(params).await,
            "get_subreddit_posts" => self.get_subreddit_posts(params).await,
            "get_post_comments" => self.get_post_comments(params).await,
            "get_user_posts" => self.get_user_posts(params).await,
            "get_subreddit_info" => self.get_subreddit_info(params).await,
            "get_popular_subreddits" => self.get_popular_subreddits(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl RedditTool {
    /// Tool pointed at a stub server for both auth and data calls.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            client_id: Some("test-id".to_string()),
            client_secret: Some("test-secret".to_string()),
            auth_base: base.to_string(),
            data_base: base.to_string(),
            token: RwLock::new(None),
        }
    }
}
