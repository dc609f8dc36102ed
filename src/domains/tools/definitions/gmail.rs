//! Gmail tool.
//!
//! Reads and sends mail through the Gmail REST API on behalf of the
//! authenticated user (`users/me`). Outgoing mail is assembled as a
//! minimal RFC 2822 message and submitted URL-safe base64 encoded,
//! which is the wire format `messages/send` expects.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::common::{bool_or, int_or, required_str, str_or};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "search_emails",
        description: "Search the mailbox with Gmail query syntax",
        params: &[
            ParamSpec::string("query", "Gmail search query, e.g. 'from:alice is:unread'"),
            ParamSpec::integer("max_results", "Number of messages to return (default: 10)")
                .range(1.0, 500.0),
            ParamSpec::boolean(
                "include_spam_trash",
                "Include spam and trash in results (default: false)",
            ),
        ],
    },
    ActionSpec {
        name: "get_email",
        description: "Fetch a single message in full",
        params: &[ParamSpec::string("email_id", "Gmail message id").required()],
    },
    ActionSpec {
        name: "send_email",
        description: "Send a plain-text email",
        params: &[
            ParamSpec::string("to", "Recipient address").required(),
            ParamSpec::string("subject", "Subject line").required(),
            ParamSpec::string("body", "Message body").required(),
        ],
    },
    ActionSpec {
        name: "get_labels",
        description: "List the mailbox labels",
        params: &[],
    },
    ActionSpec {
        name: "get_profile",
        description: "Get the mailbox profile (address, message counts)",
        params: &[],
    },
];

/// Assemble a one-part RFC 2822 message and encode it the way the
/// `messages/send` endpoint expects.
fn encode_message(to: &str, subject: &str, body: &str) -> String {
    let message = format!("To: {to}\r\nSubject: {subject}\r\n\r\n{body}");
    URL_SAFE.encode(message.as_bytes())
}

/// Gmail REST API tool implementation.
#[derive(Debug)]
pub struct GmailTool {
    client: ProviderClient,
    access_token: Option<String>,
    base: String,
}

impl GmailTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "gmail";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Search, read and send Gmail messages and inspect labels and the mailbox profile.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            access_token: credentials.gmail_access_token.clone(),
            base: BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "GMAIL_ACCESS_TOKEN",
            })?;
        Ok(Auth::Bearer(token))
    }

    async fn search_emails(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let query = [
            ("q", str_or(params, "query", "").to_string()),
            (
                "maxResults",
                int_or(params, "max_results", 10).to_string(),
            ),
            (
                "includeSpamTrash",
                bool_or(params, "include_spam_trash", false).to_string(),
            ),
        ];
        self.client
            .get_json(
                "search emails",
                &format!("{}/messages", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn get_email(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let email_id = required_str(params, "email_id")?;
        let auth = self.auth()?;
        let query = [("format", "full".to_string())];
        self.client
            .get_json(
                "get email",
                &format!("{}/messages/{email_id}", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn send_email(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let to = required_str(params, "to")?;
        let subject = required_str(params, "subject")?;
        let body = required_str(params, "body")?;
        let auth = self.auth()?;
        let message = json!({ "raw": encode_message(to, subject, body) });
        self.client
            .post_json(
                "send email",
                &format!("{}/messages/send", self.base),
                &message,
                auth,
            )
            .await
    }

    async fn get_labels(&self) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        self.client
            .get_json("get labels", &format!("{}/labels", self.base), &[], auth)
            .await
    }

    async fn get_profile(&self) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        self.client
            .get_json("get profile", &format!("{}/profile", self.base), &[], auth)
            .await
    }
}

#[async_trait]
impl ProviderTool for GmailTool {
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
            "search_emails" => self.search_emails(params).await,
            "get_email" => self.get_email(params).await,
            "send_email" => self.send_email(params).await,
            "get_labels" => self.get_labels().await,
            "get_profile" => self.get_profile().await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl GmailTool {
    /// Tool pointed at a stub server, with a dummy access token.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            access_token: Some("ya29.test".to_string()),
            base: base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::{StubServer, args};

    #[test]
    fn test_encode_message_round_trips() {
        let raw = encode_message("bob@example.com", "standup", "moved to 10am");
        let decoded = URL_SAFE.decode(raw).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "To: bob@example.com\r\nSubject: standup\r\n\r\nmoved to 10am"
        );
    }

    #[tokio::test]
    async fn test_send_email_posts_encoded_raw() {
        let stub = StubServer::start(200, r#"{"id": "m1", "threadId": "t1"}"#).await;
        let tool = GmailTool::stubbed(&stub.base_url());

        let payload = tool
            .call(
                "send_email",
                &args(json!({
                    "to": "bob@example.com",
                    "subject": "standup",
                    "body": "moved to 10am"
                })),
            )
            .await
            .unwrap();
        assert_eq!(payload["id"], "m1");

        let requests = stub.requests();
        assert_eq!(requests[0].0, "/messages/send");
        let sent: Value = serde_json::from_str(&requests[0].1).unwrap();
        let decoded = URL_SAFE
            .decode(sent["raw"].as_str().unwrap())
            .unwrap();
        assert!(
            String::from_utf8(decoded)
                .unwrap()
                .starts_with("To: bob@example.com\r\n")
        );
    }

    #[tokio::test]
    async fn test_search_emails_sends_gmail_query_params() {
        let stub = StubServer::start(200, r#"{"messages": [], "resultSizeEstimate": 0}"#).await;
        let tool = GmailTool::stubbed(&stub.base_url());

        tool.call(
            "search_emails",
            &args(json!({"query": "is:unread", "max_results": 25})),
        )
        .await
        .unwrap();

        let (path, _) = stub.requests().remove(0);
        assert!(path.starts_with("/messages?"));
        assert!(path.contains("q=is%3Aunread"));
        assert!(path.contains("maxResults=25"));
        assert!(path.contains("includeSpamTrash=false"));
    }

    #[tokio::test]
    async fn test_missing_token_makes_no_call() {
        let stub = StubServer::start(200, "{}").await;
        let mut tool = GmailTool::stubbed(&stub.base_url());
        tool.access_token = None;

        let err = tool.call("get_labels", &args(json!({}))).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "missing credential for gmail: set GMAIL_ACCESS_TOKEN"
        );
        assert_eq!(stub.hits(), 0);
    }
}
