//! Shared outbound HTTP plumbing for provider tools.
//!
//! All tools issue their calls through [`ProviderClient`], which owns one
//! pooled `reqwest::Client` and maps every transport-level outcome onto
//! [`ToolError`]: non-2xx statuses become provider errors carrying the
//! numeric status code, timeouts and connection failures keep their
//! underlying text, and undecodable bodies become decode errors.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ToolError;
use crate::core::config::HttpClientConfig;

/// Authentication applied to a single outbound request.
#[derive(Debug, Clone, Copy)]
pub enum Auth<'a> {
    /// No authentication (keyless public APIs).
    None,
    /// `Authorization: Bearer <token>` header.
    Bearer(&'a str),
    /// HTTP Basic authentication.
    Basic { user: &'a str, password: &'a str },
    /// API key passed as a query parameter.
    QueryKey { param: &'static str, key: &'a str },
}

/// Pooled HTTP client shared by every registered tool.
///
/// Safe for concurrent use; `reqwest::Client` is internally reference
/// counted and pools connections across in-flight requests.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
}

impl ProviderClient {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &HttpClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }

    /// Issue a GET request and decode the JSON response.
    pub async fn get_json(
        &self,
        operation: &'static str,
        url: &str,
        query: &[(&str, String)],
        auth: Auth<'_>,
    ) -> Result<Value, ToolError> {
        let request = apply_auth(self.http.get(url).query(query), auth);
        self.execute(operation, request).await
    }

    /// Issue a POST request with a JSON body and decode the response.
    pub async fn post_json(
        &self,
        operation: &'static str,
        url: &str,
        body: &Value,
        auth: Auth<'_>,
    ) -> Result<Value, ToolError> {
        let request = apply_auth(self.http.post(url).json(body), auth);
        self.execute(operation, request).await
    }

    /// Issue a PUT request with a JSON body and decode the response.
    pub async fn put_json(
        &self,
        operation: &'static str,
        url: &str,
        body: &Value,
        auth: Auth<'_>,
    ) -> Result<Value, ToolError> {
        let request = apply_auth(self.http.put(url).json(body), auth);
        self.execute(operation, request).await
    }

    /// Issue a DELETE request and decode the response (204 yields null).
    pub async fn delete_json(
        &self,
        operation: &'static str,
        url: &str,
        auth: Auth<'_>,
    ) -> Result<Value, ToolError> {
        let request = apply_auth(self.http.delete(url), auth);
        self.execute(operation, request).await
    }

    /// Issue a POST request with a form-encoded body (OAuth token grants).
    pub async fn post_form(
        &self,
        operation: &'static str,
        url: &str,
        form: &[(&str, &str)],
        auth: Auth<'_>,
    ) -> Result<Value, ToolError> {
        let request = apply_auth(self.http.post(url).form(form), auth);
        self.execute(operation, request).await
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, ToolError> {
        debug!(operation, "sending provider request");

        let response = request
            .send()
            .await
            .map_err(|e| ToolError::from_reqwest(operation, e))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "provider returned error status");
            return Err(ToolError::provider(operation, status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::from_reqwest(operation, e))
    }
}

fn apply_auth(request: RequestBuilder, auth: Auth<'_>) -> RequestBuilder {
    match auth {
        Auth::None => request,
        Auth::Bearer(token) => request.bearer_auth(token),
        Auth::Basic { user, password } => request.basic_auth(user, Some(password)),
        Auth::QueryKey { param, key } => request.query(&[(param, key)]),
    }
}
