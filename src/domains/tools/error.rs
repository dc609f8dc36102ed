//! Tool-specific error types.
//!
//! Every failure a tool call can produce collapses into one of these
//! variants. The `Display` string of a `ToolError` is exactly what ends
//! up in the `error` field of the response envelope, so the formats here
//! are part of the tool contract.

use thiserror::Error;

/// Errors that can occur while dispatching or executing a tool action.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The tool exists but does not declare the requested action.
    #[error("unknown action '{action}' for tool '{tool}'")]
    UnknownAction { tool: String, action: String },

    /// A required parameter was absent or null.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter carried the wrong JSON type. No coercion is attempted.
    #[error("invalid type for parameter '{name}': expected {expected}, got {actual}")]
    InvalidParameterType {
        name: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// A parameter value violated its declared range or enum constraint.
    #[error("invalid value for parameter '{name}': {constraint}")]
    InvalidParameterValue {
        name: &'static str,
        constraint: String,
    },

    /// A credential the provider requires is not configured.
    #[error("missing credential for {tool}: set {variable}")]
    MissingCredential {
        tool: &'static str,
        variable: &'static str,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("Failed to {operation}: {status}")]
    Provider {
        operation: &'static str,
        status: u16,
    },

    /// The outbound request exceeded the configured timeout.
    #[error("Failed to {operation}: request timed out")]
    Timeout { operation: &'static str },

    /// The response body was not valid JSON.
    #[error("Failed to {operation}: invalid JSON in response")]
    Decode { operation: &'static str },

    /// Connection-level failure: DNS, refused connection, TLS.
    #[error("Failed to {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Provider-level rejection carried in an otherwise successful
    /// response (e.g. Slack's `ok: false`). The message is preformatted.
    #[error("{0}")]
    Rejected(String),
}

impl ToolError {
    /// Create an "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create an "unknown action" error.
    pub fn unknown_action(tool: impl Into<String>, action: impl Into<String>) -> Self {
        Self::UnknownAction {
            tool: tool.into(),
            action: action.into(),
        }
    }

    /// Create an "invalid value" error with the given constraint text.
    pub fn invalid_value(name: &'static str, constraint: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            name,
            constraint: constraint.into(),
        }
    }

    /// Create a "missing credential" error naming the environment variable.
    pub fn missing_credential(tool: &'static str, variable: &'static str) -> Self {
        Self::MissingCredential { tool, variable }
    }

    /// Create a provider-status error.
    pub fn provider(operation: &'static str, status: u16) -> Self {
        Self::Provider { operation, status }
    }

    /// Create a provider-level rejection with a preformatted message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Classify a reqwest failure for the given operation.
    pub fn from_reqwest(operation: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { operation }
        } else if source.is_decode() {
            Self::Decode { operation }
        } else {
            Self::Network { operation, source }
        }
    }
}
