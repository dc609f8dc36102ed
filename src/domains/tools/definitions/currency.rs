//! Currency conversion tool.
//!
//! Fiat rates come from the keyless exchangerate-api.com endpoint,
//! crypto spot rates from CoinGecko. `convert` is the one action in
//! the gateway that computes its payload instead of passing the
//! provider body through: it resolves the rate for the target
//! currency and reports the converted amount alongside it.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::common::{float_or, required_str, str_or};
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const RATES_BASE: &str = "https://api.exchangerate-api.com/v4/latest";
const COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "convert",
        description: "Convert an amount between two fiat currencies",
        params: &[
            ParamSpec::string("from_currency", "Source currency code, e.g. 'USD'").required(),
            ParamSpec::string("to_currency", "Target currency code, e.g. 'EUR'").required(),
            ParamSpec::float("amount", "Amount to convert (default: 1.0)"),
        ],
    },
    ActionSpec {
        name: "get_exchange_rates",
        description: "Fetch the full rate table for a base currency",
        params: &[ParamSpec::string(
            "base_currency",
            "Base currency code (default: USD)",
        )],
    },
    ActionSpec {
        name: "get_crypto_rates",
        description: "Fetch spot prices for a list of CoinGecko coin ids",
        params: &[
            ParamSpec::string("coin_ids", "Comma-separated CoinGecko ids, e.g. 'bitcoin,solana'")
                .required(),
            ParamSpec::string(
                "vs_currencies",
                "Comma-separated quote currencies (default: usd)",
            ),
        ],
    },
];

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Currency and crypto rate tool implementation. Keyless.
#[derive(Debug)]
pub struct CurrencyTool {
    client: ProviderClient,
    rates_base: String,
    coingecko_base: String,
}

impl CurrencyTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "currency";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Convert between currencies and fetch fiat or crypto exchange rates.";

    pub fn new(client: ProviderClient) -> Self {
        Self {
            client,
            rates_base: RATES_BASE.to_string(),
            coingecko_base: COINGECKO_BASE.to_string(),
        }
    }

    async fn rates_for(&self, base_currency: &str) -> Result<Value, ToolError> {
        self.client
            .get_json(
                "fetch exchange rates",
                &format!("{}/{base_currency}", self.rates_base),
                &[],
                Auth::None,
            )
            .await
    }

    async fn convert(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let from_currency = required_str(params, "from_currency")?.to_uppercase();
        let to_currency = required_str(params, "to_currency")?.to_uppercase();
        let amount = float_or(params, "amount", 1.0);
        if amount <= 0.0 {
            return Err(ToolError::invalid_value("amount", "must be greater than 0"));
        }

        let table = self.rates_for(&from_currency).await?;
        let rate = table
            .get("rates")
            .and_then(|rates| rates.get(&to_currency))
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                ToolError::rejected(format!(
                    "Currency {to_currency} not found in exchange rates"
                ))
            })?;

        Ok(json!({
            "from_currency": from_currency,
            "to_currency": to_currency,
            "amount": amount,
            "converted_amount": round6(amount * rate),
            "exchange_rate": rate,
            "last_updated": table.get("date").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn get_exchange_rates(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let base_currency = str_or(params, "base_currency", "USD").to_uppercase();
        self.rates_for(&base_currency).await
    }

    async fn get_crypto_rates(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("ids", required_str(params, "coin_ids")?.to_string()),
            (
                "vs_currencies",
                str_or(params, "vs_currencies", "usd").to_string(),
            ),
        ];
        self.client
            .get_json(
                "fetch crypto rates",
                &format!("{}/simple/price", self.coingecko_base),
                &query,
                Auth::None,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for CurrencyTool {
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
            "convert" => self.convert(params).await,
            "get_exchange_rates" => self.get_exchange_rates(params).await,
            "get_crypto_rates" => self.get_crypto_rates(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl CurrencyTool {
    /// Tool with both providers pointed at a stub server.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            rates_base: base.to_string(),
            coingecko_base: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{StubServer, args};

    const RATES_BODY: &str =
        r#"{"base": "USD", "date": "2025-06-02", "rates": {"EUR": 0.9, "GBP": 0.78}}"#;

    #[tokio::test]
    async fn test_convert_computes_amount_and_rate() {
        let stub = StubServer::start(200, RATES_BODY).await;
        let tool = CurrencyTool::stubbed(&stub.base_url());

        let payload = tool
            .call(
                "convert",
                &args(json!({"from_currency": "usd", "to_currency": "eur", "amount": 250.0})),
            )
            .await
            .unwrap();

        assert_eq!(
            payload,
            json!({
                "from_currency": "USD",
                "to_currency": "EUR",
                "amount": 250.0,
                "converted_amount": 225.0,
                "exchange_rate": 0.9,
                "last_updated": "2025-06-02",
            })
        );
        assert_eq!(stub.requests()[0].0, "/USD");
    }

    #[tokio::test]
    async fn test_convert_unknown_target_names_currency() {
        let stub = StubServer::start(200, RATES_BODY).await;
        let tool = CurrencyTool::stubbed(&stub.base_url());

        let err = tool
            .call(
                "convert",
                &args(json!({"from_currency": "USD", "to_currency": "XYZ"})),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Currency XYZ not found in exchange rates");
    }

    #[tokio::test]
    async fn test_convert_zero_amount_makes_no_call() {
        let stub = StubServer::start(200, RATES_BODY).await;
        let tool = CurrencyTool::stubbed(&stub.base_url());

        let err = tool
            .call(
                "convert",
                &args(json!({"from_currency": "USD", "to_currency": "EUR", "amount": 0.0})),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid value for parameter 'amount': must be greater than 0"
        );
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn test_exchange_rates_payload_passes_through() {
        let stub = StubServer::start(200, RATES_BODY).await;
        let tool = CurrencyTool::stubbed(&stub.base_url());

        let payload = tool
            .call("get_exchange_rates", &args(json!({})))
            .await
            .unwrap();

        let expected: Value = serde_json::from_str(RATES_BODY).unwrap();
        assert_eq!(payload, expected);
        assert_eq!(stub.requests()[0].0, "/USD");
    }

    #[tokio::test]
    async fn test_crypto_rates_query_params() {
        let stub = StubServer::start(200, r#"{"bitcoin": {"usd": 64250.0}}"#).await;
        let tool = CurrencyTool::stubbed(&stub.base_url());

        tool.call(
            "get_crypto_rates",
            &args(json!({"coin_ids": "bitcoin,solana"})),
        )
        .await
        .unwrap();

        let (path, _) = stub.requests().remove(0);
        assert!(path.starts_with("/simple/price?"));
        assert!(path.contains("ids=bitcoin%2Csolana"));
        assert!(path.contains("vs_currencies=usd"));
    }

    // Integration tests (require network, run with: cargo test -- --ignored)
    #[ignore]
    #[tokio::test]
    async fn test_live_usd_rate_table_includes_eur() {
        use crate::core::config::HttpClientConfig;

        let tool = CurrencyTool::new(ProviderClient::new(&HttpClientConfig::default()));
        let payload = tool
            .call("get_exchange_rates", &args(json!({})))
            .await
            .unwrap();

        assert!(
            payload["rates"]["EUR"].as_f64().is_some(),
            "expected an EUR rate in the USD table"
        );
    }
}
