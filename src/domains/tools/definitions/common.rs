//! Common utilities shared across provider tools.
//!
//! Handlers run after declarative validation, so these helpers mostly
//! read already-checked values; the `required_*` variants still return a
//! proper error so handlers stay total when exercised directly.

use rmcp::model::JsonObject;
use serde_json::Value;

use crate::domains::tools::error::ToolError;

/// Get a required string parameter.
pub fn required_str<'a>(params: &'a JsonObject, name: &'static str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(Value::as_str)
        .ok_or(ToolError::MissingParameter(name))
}

/// Get a required float parameter (integral numbers accepted).
pub fn required_f64(params: &JsonObject, name: &'static str) -> Result<f64, ToolError> {
    params
        .get(name)
        .and_then(Value::as_f64)
        .ok_or(ToolError::MissingParameter(name))
}

/// Get an optional string parameter.
pub fn opt_str<'a>(params: &'a JsonObject, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

/// Get an optional string parameter with a default.
pub fn str_or<'a>(params: &'a JsonObject, name: &str, default: &'a str) -> &'a str {
    params.get(name).and_then(Value::as_str).unwrap_or(default)
}

/// Get an optional integer parameter with a default.
pub fn int_or(params: &JsonObject, name: &str, default: i64) -> i64 {
    params.get(name).and_then(Value::as_i64).unwrap_or(default)
}

/// Get an optional float parameter with a default.
pub fn float_or(params: &JsonObject, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Get an optional boolean parameter with a default.
pub fn bool_or(params: &JsonObject, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::args;
    use serde_json::json;

    #[test]
    fn test_required_str_present_and_missing() {
        let params = args(json!({"query": "rust"}));
        assert_eq!(required_str(&params, "query").unwrap(), "rust");

        let err = required_str(&params, "channel").unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter: channel");
    }

    #[test]
    fn test_defaults_apply_when_absent() {
        let params = args(json!({"limit": 50}));
        assert_eq!(int_or(&params, "limit", 25), 50);
        assert_eq!(int_or(&params, "count", 25), 25);
        assert_eq!(str_or(&params, "sort", "hot"), "hot");
        assert!(bool_or(&params, "verbose", true));
    }

    #[test]
    fn test_required_f64_accepts_integral_numbers() {
        let params = args(json!({"lat": 51, "lon": -0.12}));
        assert_eq!(required_f64(&params, "lat").unwrap(), 51.0);
        assert_eq!(required_f64(&params, "lon").unwrap(), -0.12);
    }
}
