//! Google Maps tool.
//!
//! Geocoding, directions, place search and distance matrices from the
//! Google Maps Platform web services. The API key travels as the `key`
//! query parameter on every request.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::common::{int_or, required_f64, required_str, str_or};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://maps.googleapis.com/maps/api";

const TRAVEL_MODE: ParamSpec = ParamSpec::options(
    "mode",
    &["driving", "walking", "bicycling", "transit"],
    "Travel mode (default: driving)",
);

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "geocode",
        description: "Convert a street address into coordinates",
        params: &[
            ParamSpec::string("address", "Address to geocode").required(),
            ParamSpec::string("language", "Language code for results (default: en)"),
        ],
    },
    ActionSpec {
        name: "reverse_geocode",
        description: "Convert coordinates into the nearest address",
        params: &[
            ParamSpec::float("lat", "Latitude").required(),
            ParamSpec::float("lon", "Longitude").required(),
            ParamSpec::string("language", "Language code for results (default: en)"),
        ],
    },
    ActionSpec {
        name: "get_directions",
        description: "Route between two locations",
        params: &[
            ParamSpec::string("origin", "Start address or 'lat,lon'").required(),
            ParamSpec::string("destination", "End address or 'lat,lon'").required(),
            TRAVEL_MODE,
        ],
    },
    ActionSpec {
        name: "search_places",
        description: "Free-text place search",
        params: &[
            ParamSpec::string("query", "Search text, e.g. 'pizza near Alexanderplatz'")
                .required(),
            ParamSpec::integer("radius", "Search radius in meters (default: 5000)")
                .range(1.0, 50000.0),
        ],
    },
    ActionSpec {
        name: "get_place_details",
        description: "Full details for one place",
        params: &[ParamSpec::string("place_id", "Google place id").required()],
    },
    ActionSpec {
        name: "get_distance_matrix",
        description: "Travel distance and time between origin and destination sets",
        params: &[
            ParamSpec::string("origins", "Origins, pipe- or comma-separated").required(),
            ParamSpec::string("destinations", "Destinations, pipe- or comma-separated")
                .required(),
            TRAVEL_MODE,
            ParamSpec::options(
                "units",
                &["metric", "imperial"],
                "Distance units (default: metric)",
            ),
        ],
    },
];

/// Google Maps Platform tool implementation.
#[derive(Debug)]
pub struct GoogleMapsTool {
    client: ProviderClient,
    api_key: Option<String>,
    base: String,
}

impl GoogleMapsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "googlemaps";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Geocode addresses, plan routes and search places with the Google Maps web services.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            api_key: credentials.googlemaps_api_key.clone(),
            base: BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let key = self.api_key.as_deref().ok_or(ToolError::MissingCredential {
            tool: Self::NAME,
            variable: "GOOGLEMAPS_API_KEY",
        })?;
        Ok(Auth::QueryKey { param: "key", key })
    }

    async fn fetch(
        &self,
        operation: &'static str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        self.client
            .get_json(operation, &format!("{}/{endpoint}", self.base), query, auth)
            .await
    }

    async fn geocode(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("address", required_str(params, "address")?.to_string()),
            ("language", str_or(params, "language", "en").to_string()),
        ];
        self.fetch("geocode address", "geocode/json", &query).await
    }

    async fn reverse_geocode(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let lat = required_f64(params, "lat")?;
        let lon = required_f64(params, "lon")?;
        let query = [
            ("latlng", format!("{lat},{lon}")),
            ("language", str_or(params, "language", "en").to_string()),
        ];
        self.fetch("reverse geocode coordinates", "geocode/json", &query)
            .await
    }

    async fn get_directions(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("origin", required_str(params, "origin")?.to_string()),
            (
                "destination",
                required_str(params, "destination")?.to_string(),
            ),
            ("mode", str_or(params, "mode", "driving").to_string()),
        ];
        self.fetch("fetch directions", "directions/json", &query).await
    }

    async fn search_places(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("query", required_str(params, "query")?.to_string()),
            ("radius", int_or(params, "radius", 5000).to_string()),
        ];
        self.fetch("search places", "place/textsearch/json", &query)
            .await
    }

    async fn get_place_details(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [("place_id", required_str(params, "place_id")?.to_string())];
        self.fetch("fetch place details", "place/details/json", &query)
            .await
    }

    async fn get_distance_matrix(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let query = [
            ("origins", required_str(params, "origins")?.to_string()),
            (
                "destinations",
                required_str(params, "destinations")?.to_string(),
            ),
            ("mode", str_or(params, "mode", "driving").to_string()),
            ("units", str_or(params, "units", "metric").to_string()),
        ];
        self.fetch("fetch distance matrix", "distancematrix/json", &query)
            .await
    }
}

#[async_trait]
impl ProviderTool for GoogleMapsTool {
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
            "geocode" => self.geocode(params).await,
            "reverse_geocode" => self.reverse_geocode(params).await,
            "get_directions" => self.get_directions(params).await,
            "search_places" => self.search_places(params).await,
            "get_place_details" => self.get_place_details(params).await,
            "get_distance_matrix" => self.get_distance_matrix(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl GoogleMapsTool {
    /// Tool pointed at a stub server, with a dummy API key.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            api_key: Some("maps-test-key".to_string()),
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
    async fn test_reverse_geocode_formats_latlng_pair() {
        let stub = StubServer::start(200, r#"{"results": [], "status": "ZERO_RESULTS"}"#).await;
        let tool = GoogleMapsTool::stubbed(&stub.base_url());

        tool.call("reverse_geocode", &args(json!({"lat": 52.52, "lon": 13.405})))
            .await
            .unwrap();

        let (path, _) = stub.requests().remove(0);
        assert!(path.starts_with("/geocode/json?"));
        assert!(path.contains("latlng=52.52%2C13.405"));
        assert!(path.contains("key=maps-test-key"));
    }

    #[tokio::test]
    async fn test_integer_lat_accepted_as_float() {
        let stub = StubServer::start(200, r#"{"results": [], "status": "OK"}"#).await;
        let tool = GoogleMapsTool::stubbed(&stub.base_url());

        tool.call("reverse_geocode", &args(json!({"lat": 52, "lon": 13})))
            .await
            .unwrap();

        assert!(stub.requests()[0].0.contains("latlng=52%2C13"));
    }

    #[tokio::test]
    async fn test_directions_defaults_to_driving() {
        let stub = StubServer::start(200, r#"{"routes": [], "status": "OK"}"#).await;
        let tool = GoogleMapsTool::stubbed(&stub.base_url());

        tool.call(
            "get_directions",
            &args(json!({"origin": "Berlin", "destination": "Hamburg"})),
        )
        .await
        .unwrap();

        let (path, _) = stub.requests().remove(0);
        assert!(path.starts_with("/directions/json?"));
        assert!(path.contains("mode=driving"));
    }

    #[tokio::test]
    async fn test_invalid_mode_rejected_before_any_call() {
        let spec = ACTIONS
            .iter()
            .find(|action| action.name == "get_directions")
            .unwrap();

        let err = spec
            .validate(&args(json!({
                "origin": "Berlin",
                "destination": "Hamburg",
                "mode": "teleport"
            })))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid value for parameter 'mode': must be one of: driving, walking, bicycling, transit"
        );
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let stub = StubServer::start(200, "{}").await;
        let mut tool = GoogleMapsTool::stubbed(&stub.base_url());
        tool.api_key = None;

        let err = tool
            .call("geocode", &args(json!({"address": "Invalidenstr. 117"})))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing credential for googlemaps: set GOOGLEMAPS_API_KEY"
        );
        assert_eq!(stub.hits(), 0);
    }
}
