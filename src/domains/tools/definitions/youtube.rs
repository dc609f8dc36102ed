//! YouTube Data API tool.
//!
//! Wraps video search, video/channel lookups and the trending chart.
//! The API key travels as the `key` query parameter.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::common::{int_or, required_str, str_or};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://www.googleapis.com/youtube/v3";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "search_videos",
        description: "Search YouTube videos",
        params: &[
            ParamSpec::string("query", "Search query").required(),
            ParamSpec::integer("max_results", "Number of videos to return (default: 10)")
                .range(1.0, 50.0),
            ParamSpec::options(
                "order",
                &["relevance", "date", "rating", "viewCount", "title"],
                "Result ordering (default: relevance)",
            ),
            ParamSpec::string("region_code", "ISO 3166-1 alpha-2 region (default: US)"),
        ],
    },
    ActionSpec {
        name: "get_video_details",
        description: "Get snippet, statistics and status for a video",
        params: &[ParamSpec::string("video_id", "Video id").required()],
    },
    ActionSpec {
        name: "get_channel_info",
        description: "Get snippet, statistics and branding for a channel",
        params: &[ParamSpec::string("channel_id", "Channel id").required()],
    },
    ActionSpec {
        name: "get_trending_videos",
        description: "Get the most popular videos for a region",
        params: &[
            ParamSpec::string("region_code", "ISO 3166-1 alpha-2 region (default: US)"),
            ParamSpec::integer("max_results", "Number of videos to return (default: 10)")
                .range(1.0, 50.0),
        ],
    },
];

/// YouTube Data API tool implementation.
#[derive(Debug)]
pub struct YouTubeTool {
    client: ProviderClient,
    api_key: Option<String>,
    base: String,
}

impl YouTubeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "youtube";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search YouTube videos and fetch video, channel and trending data.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            api_key: credentials.youtube_api_key.clone(),
            base: BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "YOUTUBE_API_KEY",
            })?;
        Ok(Auth::QueryKey { param: "key", key })
    }

    async fn search_videos(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            ("part", "snippet".to_string()),
            ("q", required_str(params, "query")?.to_string()),
            ("type", "video".to_string()),
            ("maxResults", int_or(params, "max_results", 10).to_string()),
            ("order", str_or(params, "order", "relevance").to_string()),
            ("regionCode", str_or(params, "region_code", "US").to_string()),
        ];
        self.client
            .get_json(
                "search videos",
                &format!("{}/search", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn get_video_details(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            ("part", "snippet,statistics,contentDetails,status".to_string()),
            ("id", required_str(params, "video_id")?.to_string()),
        ];
        self.client
            .get_json(
                "get video details",
                &format!("{}/videos", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn get_channel_info(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            (
                "part",
                "snippet,statistics,brandingSettings,contentDetails".to_string(),
            ),
            ("id", required_str(params, "channel_id")?.to_string()),
        ];
        self.client
            .get_json(
                "get channel info",
                &format!("{}/channels", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn get_trending_videos(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", str_or(params, "region_code", "US").to_string()),
            ("maxResults", int_or(params, "max_results", 10).to_string()),
        ];
        self.client
            .get_json(
                "fetch trending videos",
                &format!("{}/videos", self.base),
                &query,
                auth,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for YouTubeTool {
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
            "search_videos" => self.search_videos(params).await,
            "get_video_details" => self.get_video_details(params).await,
            "get_channel_info" => self.get_channel_info(params).await,
            "get_trending_videos" => self.get_trending_videos(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl YouTubeTool {
    /// Tool pointed at a stub server, with a dummy API key.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            api_key: Some("test-key".to_string()),
            base: base.to_string(),
        }
    }
}
