//! Cryptocurrency market data tool, backed by the keyless CoinGecko API.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::common::{bool_or, int_or, required_str, str_or};
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://api.coingecko.com/api/v3";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "get_price",
        description: "Spot price for a coin, optionally with market cap and 24h stats",
        params: &[
            ParamSpec::string("coin_id", "CoinGecko coin id, e.g. 'bitcoin'").required(),
            ParamSpec::string("currency", "Quote currency (default: usd)"),
            ParamSpec::boolean(
                "include_market_data",
                "Include market cap, 24h volume and 24h change (default: true)",
            ),
        ],
    },
    ActionSpec {
        name: "get_market_data",
        description: "Market overview for the top coins by market cap",
        params: &[
            ParamSpec::string("vs_currency", "Quote currency (default: usd)"),
            ParamSpec::integer("per_page", "Coins per page (default: 100)").range(1.0, 250.0),
            ParamSpec::integer("page", "Page number (default: 1)"),
        ],
    },
    ActionSpec {
        name: "get_coin_info",
        description: "Full metadata and market data for one coin",
        params: &[ParamSpec::string("coin_id", "CoinGecko coin id").required()],
    },
    ActionSpec {
        name: "get_trending",
        description: "Coins trending on CoinGecko in the last 24h",
        params: &[],
    },
];

/// CoinGecko market data tool implementation. Keyless.
#[derive(Debug)]
pub struct CryptoTool {
    client: ProviderClient,
    base: String,
}

impl CryptoTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "crypto";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Cryptocurrency prices, market rankings, coin metadata and trending coins from CoinGecko.";

    pub fn new(client: ProviderClient) -> Self {
        Self {
            client,
            base: BASE.to_string(),
        }
    }

    async fn fetch(
        &self,
        operation: &'static str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ToolError> {
        self.client
            .get_json(
                operation,
                &format!("{}/{endpoint}", self.base),
                query,
                Auth::None,
            )
            .await
    }

    async fn get_price(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let include_market_data = bool_or(params, "include_market_data", true);
        let query = [
            ("ids", required_str(params, "coin_id")?.to_string()),
            (
                "vs_currencies",
                str_or(params, "currency", "usd").to_string(),
            ),
            ("include_market_cap", include_market_data.to_string()),
            ("include_24hr_vol", include_market_data.to_string()),
            ("include_24hr_change", include_market_data.to_string()),
            ("include_last_updated_at", true.to_string()),
        ];
        self.fetch("fetch coin price", "simple/price", &query).await
    }

    async fn get_market_data(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            (
                "vs_currency",
                str_or(params, "vs_currency", "usd").to_string(),
            ),
            ("order", "market_cap_desc".to_string()),
            ("per_page", int_or(params, "per_page", 100).to_string()),
            ("page", int_or(params, "page", 1).to_string()),
            ("sparkline", false.to_string()),
        ];
        self.fetch("fetch market data", "coins/markets", &query).await
    }

    async fn get_coin_info(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let coin_id = required_str(params, "coin_id")?;
        let query = [
            ("localization", false.to_string()),
            ("tickers", false.to_string()),
            ("market_data", true.to_string()),
        ];
        self.fetch("fetch coin info", &format!("coins/{coin_id}"), &query)
            .await
    }

    async fn get_trending(&self) -> Result<Value, ToolError> {
        self.fetch("fetch trending coins", "search/trending", &[])
            .await
    }
}

#[async_trait]
impl ProviderTool for CryptoTool {
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
            "get_price" => self.get_price(params).await,
            "get_market_data" => self.get_market_data(params).await,
            "get_coin_info" => self.get_coin_info(params).await,
            "get_trending" => self.get_trending().await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl CryptoTool {
    /// Tool pointed at a stub server.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
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
    async fn test_get_price_passes_body_through() {
        let body = r#"{"bitcoin": {"usd": 64250.0, "usd_market_cap": 1.2e12}}"#;
        let stub = StubServer::start(200, body).await;
        let tool = CryptoTool::stubbed(&stub.base_url());

        let payload = tool
            .call("get_price", &args(json!({"coin_id": "bitcoin"})))
            .await
            .unwrap();

        let expected: Value = serde_json::from_str(body).unwrap();
        assert_eq!(payload, expected);

        let (path, _) = stub.requests().remove(0);
        assert!(path.contains("ids=bitcoin"));
        assert!(path.contains("include_market_cap=true"));
        assert!(path.contains("include_last_updated_at=true"));
    }

    #[tokio::test]
    async fn test_get_price_can_skip_market_data() {
        let stub = StubServer::start(200, r#"{"bitcoin": {"usd": 64250.0}}"#).await;
        let tool = CryptoTool::stubbed(&stub.base_url());

        tool.call(
            "get_price",
            &args(json!({"coin_id": "bitcoin", "include_market_data": false})),
        )
        .await
        .unwrap();

        assert!(stub.requests()[0].0.contains("include_market_cap=false"));
    }

    #[tokio::test]
    async fn test_market_data_orders_by_market_cap() {
        let stub = StubServer::start(200, "[]").await;
        let tool = CryptoTool::stubbed(&stub.base_url());

        tool.call("get_market_data", &args(json!({"per_page": 50})))
            .await
            .unwrap();

        let (path, _) = stub.requests().remove(0);
        assert!(path.starts_with("/coins/markets?"));
        assert!(path.contains("order=market_cap_desc"));
        assert!(path.contains("per_page=50"));
        assert!(path.contains("sparkline=false"));
    }

    #[tokio::test]
    async fn test_coin_info_trims_localization_and_tickers() {
        let stub = StubServer::start(200, r#"{"id": "solana"}"#).await;
        let tool = CryptoTool::stubbed(&stub.base_url());

        tool.call("get_coin_info", &args(json!({"coin_id": "solana"})))
            .await
            .unwrap();

        let (path, _) = stub.requests().remove(0);
        assert!(path.starts_with("/coins/solana?"));
        assert!(path.contains("localization=false"));
        assert!(path.contains("tickers=false"));
        assert!(path.contains("market_data=true"));
    }

    #[tokio::test]
    async fn test_per_page_out_of_range_rejected() {
        let spec = ACTIONS
            .iter()
            .find(|action| action.name == "get_market_data")
            .unwrap();

        let err = spec.validate(&args(json!({"per_page": 500}))).unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid value for parameter 'per_page': must be between 1 and 250"
        );
    }
}
