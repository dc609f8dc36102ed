//! Action results and the response envelope.
//!
//! Every dispatched action produces exactly one [`ActionResult`], which is
//! serialized for callers as the uniform envelope
//! `{"success": bool, "data"?: ..., "error"?: "..."}`. The envelope is a
//! single object, never a list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ToolError;

/// Outcome of dispatching one action.
///
/// Exactly one of the variants applies; there is no partial success.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// The provider call succeeded; `payload` is the decoded response body.
    Success { payload: Value },
    /// Validation, transport, or the provider failed; `message` is the
    /// human-readable reason.
    Failure { message: String },
}

impl ActionResult {
    /// Create a success result.
    pub fn success(payload: Value) -> Self {
        Self::Success { payload }
    }

    /// Create a failure result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Whether this result is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Convert into the wire envelope.
    pub fn into_envelope(self) -> Envelope {
        match self {
            Self::Success { payload } => Envelope {
                success: true,
                data: Some(payload),
                error: None,
            },
            Self::Failure { message } => Envelope {
                success: false,
                data: None,
                error: Some(message),
            },
        }
    }
}

impl From<Result<Value, ToolError>> for ActionResult {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self::Success { payload },
            Err(e) => Self::Failure {
                message: e.to_string(),
            },
        }
    }
}

/// Wire form of an [`ActionResult`].
///
/// `data` is present (possibly `null`) on success; `error` is present on
/// failure. The absent field is omitted from the serialized object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the action succeeded.
    pub success: bool,

    /// The provider payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// The failure message on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ActionResult::success(json!({"temp": 15.2})).into_envelope();
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire, json!({"success": true, "data": {"temp": 15.2}}));
    }

    #[test]
    fn test_failure_envelope_shape() {
        let envelope = ActionResult::failure("missing required parameter: project_key")
            .into_envelope();
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            wire,
            json!({"success": false, "error": "missing required parameter: project_key"})
        );
    }

    #[test]
    fn test_null_payload_keeps_data_field() {
        // 204 No Content responses surface as a null payload, not an
        // absent data field.
        let envelope = ActionResult::success(Value::Null).into_envelope();
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire, json!({"success": true, "data": null}));
    }

    #[test]
    fn test_error_result_collapses_to_failure() {
        let result: Result<Value, ToolError> = Err(ToolError::provider("list channels", 500));
        let action_result = ActionResult::from(result);
        assert!(!action_result.is_success());
        match action_result {
            ActionResult::Failure { message } => {
                assert_eq!(message, "Failed to list channels: 500");
            }
            ActionResult::Success { .. } => panic!("expected failure"),
        }
    }
}
