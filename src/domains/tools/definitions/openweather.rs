//! OpenWeatherMap tool.
//!
//! Wraps the OpenWeatherMap current-weather, forecast, air-pollution and
//! geocoding endpoints. The API key travels as the `appid` query
//! parameter on every request.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::common::{int_or, required_f64, required_str, str_or};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const DATA_BASE: &str = "https://api.openweathermap.org/data/2.5";
const GEO_BASE: &str = "https://api.openweathermap.org/geo/1.0";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "get_current_weather",
        description: "Get current weather conditions for a location",
        params: &[
            ParamSpec::string("location", "City name, e.g. 'London' or 'London,UK'").required(),
            ParamSpec::options(
                "units",
                &["metric", "imperial", "standard"],
                "Units for temperature and measurements (default: metric)",
            ),
            ParamSpec::string("lang", "Language for weather descriptions (default: en)"),
        ],
    },
    ActionSpec {
        name: "get_forecast",
        description: "Get a multi-day weather forecast for a location",
        params: &[
            ParamSpec::string("location", "City name, e.g. 'London' or 'London,UK'").required(),
            ParamSpec::integer("days", "Number of days to forecast (default: 5, max: 16)")
                .range(1.0, 16.0),
            ParamSpec::options(
                "units",
                &["metric", "imperial", "standard"],
                "Units for temperature and measurements (default: metric)",
            ),
            ParamSpec::string("lang", "Language for weather descriptions (default: en)"),
        ],
    },
    ActionSpec {
        name: "get_air_pollution",
        description: "Get the air quality index and pollutant levels at coordinates",
        params: &[
            ParamSpec::float("lat", "Latitude coordinate").required(),
            ParamSpec::float("lon", "Longitude coordinate").required(),
        ],
    },
    ActionSpec {
        name: "geocode_location",
        description: "Resolve a location name to geographic coordinates",
        params: &[
            ParamSpec::string("location", "Location query, e.g. 'Paris,FR'").required(),
            ParamSpec::integer("limit", "Maximum number of matches (default: 5)").range(1.0, 5.0),
        ],
    },
    ActionSpec {
        name: "reverse_geocode",
        description: "Resolve coordinates to the nearest named locations",
        params: &[
            ParamSpec::float("lat", "Latitude coordinate").required(),
            ParamSpec::float("lon", "Longitude coordinate").required(),
            ParamSpec::integer("limit", "Maximum number of matches (default: 5)").range(1.0, 5.0),
        ],
    },
];

/// OpenWeatherMap tool implementation.
#[derive(Debug)]
pub struct OpenWeatherTool {
    client: ProviderClient,
    api_key: Option<String>,
    data_base: String,
    geo_base: String,
}

impl OpenWeatherTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "openweather";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Current weather, forecasts, air quality and geocoding from OpenWeatherMap.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            api_key: credentials.openweather_api_key.clone(),
            data_base: DATA_BASE.to_string(),
            geo_base: GEO_BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "OPENWEATHER_API_KEY",
            })?;
        Ok(Auth::QueryKey {
            param: "appid",
            key,
        })
    }

    async fn get_current_weather(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let location = required_str(params, "location")?;
        let query = [
            ("q", location.to_string()),
            ("units", str_or(params, "units", "metric").to_string()),
            ("lang", str_or(params, "lang", "en").to_string()),
        ];
        self.client
            .get_json(
                "fetch current weather",
                &format!("{}/weather", self.data_base),
                &query,
                auth,
            )
            .await
    }

    async fn get_forecast(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let location = required_str(params, "location")?;
        let query = [
            ("q", location.to_string()),
            ("cnt", int_or(params, "days", 5).to_string()),
            ("units", str_or(params, "units", "metric").to_string()),
            ("lang", str_or(params, "lang", "en").to_string()),
        ];
        self.client
            .get_json(
                "fetch weather forecast",
                &format!("{}/forecast", self.data_base),
                &query,
                auth,
            )
            .await
    }

    async fn get_air_pollution(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            ("lat", required_f64(params, "lat")?.to_string()),
            ("lon", required_f64(params, "lon")?.to_string()),
        ];
        self.client
            .get_json(
                "fetch air pollution data",
                &format!("{}/air_pollution", self.data_base),
                &query,
                auth,
            )
            .await
    }

    async fn geocode_location(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let location = required_str(params, "location")?;
        let query = [
            ("q", location.to_string()),
            ("limit", int_or(params, "limit", 5).to_string()),
        ];
        self.client
            .get_json(
                "geocode location",
                &format!("{}/direct", self.geo_base),
                &query,
                auth,
            )
            .await
    }

    async fn reverse_geocode(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            ("lat", required_f64(params, "lat")?.to_string()),
            ("lon", required_f64(params, "lon")?.to_string()),
            ("limit", int_or(params, "limit", 5).to_string()),
        ];
        self.client
            .get_json(
                "reverse geocode coordinates",
                &format!("{}/reverse", self.geo_base),
                &query,
                auth,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for OpenWeatherTool {
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
            "get_current_weather" => self.get_current_weather(params).await,
            "get_forecast" => self.get_forecast(params).await,
            "get_air_pollution" => self.get_air_pollution(params).await,
            "geocode_location" => self.geocode_location(params).await,
            "reverse_geocode" => self.reverse_geocode(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl OpenWeatherTool {
    /// Tool pointed at a stub server, with a dummy API key.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            api_key: Some("test-key".to_string()),
            data_base: base.to_string(),
            geo_base: base.to_string(),
        }
    }
}
