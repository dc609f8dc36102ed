//! DefiLlama tool.
//!
//! TVL and yield aggregates from the keyless DefiLlama APIs. Protocol
//! and chain data live on `api.llama.fi`, pool yields on the separate
//! `yields.llama.fi` host.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::common::required_str;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const TVL_BASE: &str = "https://api.llama.fi";
const YIELDS_BASE: &str = "https://yields.llama.fi";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "get_protocols",
        description: "List all tracked protocols with their TVL",
        params: &[],
    },
    ActionSpec {
        name: "get_protocol_tvl",
        description: "TVL history and breakdown for one protocol",
        params: &[ParamSpec::string("protocol", "Protocol slug, e.g. 'aave'").required()],
    },
    ActionSpec {
        name: "get_chains",
        description: "Current TVL per chain",
        params: &[],
    },
    ActionSpec {
        name: "get_yield_pools",
        description: "Yield pools with APY and TVL",
        params: &[],
    },
];

/// DefiLlama aggregate data tool implementation. Keyless.
#[derive(Debug)]
pub struct DefiLlamaTool {
    client: ProviderClient,
    tvl_base: String,
    yields_base: String,
}

impl DefiLlamaTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "defillama";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "DeFi protocol TVL, per-chain totals and yield pool data from DefiLlama.";

    pub fn new(client: ProviderClient) -> Self {
        Self {
            client,
            tvl_base: TVL_BASE.to_string(),
            yields_base: YIELDS_BASE.to_string(),
        }
    }

    async fn get_protocols(&self) -> Result<Value, ToolError> {
        self.client
            .get_json(
                "fetch protocols",
                &format!("{}/protocols", self.tvl_base),
                &[],
                Auth::None,
            )
            .await
    }

    async fn get_protocol_tvl(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let protocol = required_str(params, "protocol")?;
        self.client
            .get_json(
                "fetch protocol TVL",
                &format!("{}/protocol/{protocol}", self.tvl_base),
                &[],
                Auth::None,
            )
            .await
    }

    async fn get_chains(&self) -> Result<Value, ToolError> {
        self.client
            .get_json(
                "fetch chains",
                &format!("{}/chains", self.tvl_base),
                &[],
                Auth::None,
            )
            .await
    }

    async fn get_yield_pools(&self) -> Result<Value, ToolError> {
        self.client
            .get_json(
                "fetch yield pools",
                &format!("{}/pools", self.yields_base),
                &[],
                Auth::None,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for DefiLlamaTool {
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
            "get_protocols" => self.get_protocols().await,
            "get_protocol_tvl" => self.get_protocol_tvl(params).await,
            "get_chains" => self.get_chains().await,
            "get_yield_pools" => self.get_yield_pools().await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl DefiLlamaTool {
    /// Tool with both hosts pointed at a stub server.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            tvl_base: base.to_string(),
            yields_base: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{StubServer, args};
    use serde_json::json;

    #[tokio::test]
    async fn test_protocol_tvl_uses_slug_path() {
        let body = r#"{"name": "AAVE", "tvl": [{"date": 1717200000, "totalLiquidityUSD": 1.1e10}]}"#;
        let stub = StubServer::start(200, body).await;
        let tool = DefiLlamaTool::stubbed(&stub.base_url());

        let payload = tool
            .call("get_protocol_tvl", &args(json!({"protocol": "aave"})))
            .await
            .unwrap();

        let expected: Value = serde_json::from_str(body).unwrap();
        assert_eq!(payload, expected);
        assert_eq!(stub.requests()[0].0, "/protocol/aave");
    }

    #[tokio::test]
    async fn test_missing_protocol_makes_no_call() {
        let stub = StubServer::start(200, "{}").await;
        let tool = DefiLlamaTool::stubbed(&stub.base_url());

        let err = tool
            .call("get_protocol_tvl", &args(json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required parameter: protocol");
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_yield_pools_hits_pools_endpoint() {
        let stub = StubServer::start(200, r#"{"status": "success", "data": []}"#).await;
        let tool = DefiLlamaTool::stubbed(&stub.base_url());

        tool.call("get_yield_pools", &args(json!({}))).await.unwrap();

        assert_eq!(stub.requests()[0].0, "/pools");
    }

    #[tokio::test]
    async fn test_provider_error_carries_status() {
        let stub = StubServer::start(502, "bad gateway").await;
        let tool = DefiLlamaTool::stubbed(&stub.base_url());

        let err = tool.call("get_chains", &args(json!({}))).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch chains: 502");
    }

    // Integration tests (require network, run with: cargo test -- --ignored)
    #[ignore]
    #[tokio::test]
    async fn test_live_chains_returns_tvl_entries() {
        use crate::core::config::HttpClientConfig;

        let tool = DefiLlamaTool::new(ProviderClient::new(&HttpClientConfig::default()));
        let payload = tool.call("get_chains", &args(json!({}))).await.unwrap();

        let chains = payload.as_array().expect("chains payload is a list");
        assert!(!chains.is_empty(), "expected at least one chain");
        assert!(chains[0].get("tvl").is_some(), "chain entries carry tvl");
    }
}
