//! Jira Cloud tool.
//!
//! Wraps the Jira REST API v3: issue CRUD, JQL search, projects and
//! comments. Authentication is HTTP Basic with the account email and an
//! API token; free-text bodies (descriptions, comments) are wrapped in
//! the Atlassian Document Format v3 requires.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::common::{int_or, opt_str, required_str, str_or};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const MAX_RESULTS: ParamSpec =
    ParamSpec::integer("max_results", "Page size (default: 50)").range(1.0, 100.0);
const START_AT: ParamSpec = ParamSpec::integer("start_at", "Pagination offset (default: 0)");

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "get_issue",
        description: "Get a single issue by key",
        params: &[
            ParamSpec::string("issue_key", "Issue key, e.g. 'PROJ-123'").required(),
            ParamSpec::string("expand", "Entities to expand (default: names,schema)"),
        ],
    },
    ActionSpec {
        name: "create_issue",
        description: "Create an issue in a project",
        params: &[
            ParamSpec::string("project_key", "Project key, e.g. 'PROJ'").required(),
            ParamSpec::string("summary", "Issue summary").required(),
            ParamSpec::string("description", "Issue description (plain text)"),
            ParamSpec::string("issue_type", "Issue type name (default: Task)"),
            ParamSpec::string("priority", "Priority name, e.g. 'High'"),
            ParamSpec::list("labels", "Labels to apply"),
        ],
    },
    ActionSpec {
        name: "update_issue",
        description: "Update issue fields",
        params: &[
            ParamSpec::string("issue_key", "Issue key, e.g. 'PROJ-123'").required(),
            ParamSpec::object("fields", "Field values to set, in Jira field format").required(),
        ],
    },
    ActionSpec {
        name: "delete_issue",
        description: "Delete an issue",
        params: &[ParamSpec::string("issue_key", "Issue key, e.g. 'PROJ-123'").required()],
    },
    ActionSpec {
        name: "search_issues",
        description: "Search issues with a JQL query",
        params: &[
            ParamSpec::string("jql", "JQL query, e.g. 'project = PROJ ORDER BY created'")
                .required(),
            MAX_RESULTS,
            START_AT,
        ],
    },
    ActionSpec {
        name: "get_projects",
        description: "List all visible projects",
        params: &[ParamSpec::string(
            "expand",
            "Entities to expand (default: lead,issueTypes)",
        )],
    },
    ActionSpec {
        name: "get_issue_comments",
        description: "List comments on an issue",
        params: &[
            ParamSpec::string("issue_key", "Issue key, e.g. 'PROJ-123'").required(),
            MAX_RESULTS,
            START_AT,
        ],
    },
    ActionSpec {
        name: "add_comment",
        description: "Add a comment to an issue",
        params: &[
            ParamSpec::string("issue_key", "Issue key, e.g. 'PROJ-123'").required(),
            ParamSpec::string("comment_body", "Comment text").required(),
        ],
    },
];

/// Wrap plain text in an Atlassian Document Format paragraph.
fn adf_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [{"type": "text", "text": text}]
            }
        ]
    })
}

/// Jira Cloud tool implementation.
#[derive(Debug)]
pub struct JiraTool {
    client: ProviderClient,
    base: Option<String>,
    email: Option<String>,
    api_token: Option<String>,
}

impl JiraTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "jira";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Create, update, search and comment on Jira issues.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        let base = credentials
            .jira_domain
            .as_deref()
            .map(|domain| format!("https://{domain}.atlassian.net/rest/api/3"));
        Self {
            client,
            base,
            email: credentials.jira_email.clone(),
            api_token: credentials.jira_api_token.clone(),
        }
    }

    fn base(&self) -> Result<&str, ToolError> {
        self.base.as_deref().ok_or(ToolError::MissingCredential {
            tool: Self::NAME,
            variable: "JIRA_DOMAIN",
        })
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let user = self.email.as_deref().ok_or(ToolError::MissingCredential {
            tool: Self::NAME,
            variable: "JIRA_EMAIL",
        })?;
        let password = self
            .api_token
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "JIRA_API_TOKEN",
            })?;
        Ok(Auth::Basic { user, password })
    }

    async fn get_issue(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let issue_key = required_str(params, "issue_key")?;
        let query = [(
            "expand",
            str_or(params, "expand", "names,schema").to_string(),
        )];
        self.client
            .get_json(
                "get issue",
                &format!("{base}/issue/{issue_key}"),
                &query,
                auth,
            )
            .await
    }

    async fn create_issue(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let project_key = required_str(params, "project_key")?;
        let summary = required_str(params, "summary")?;

        let mut fields = json!({
            "project": {"key": project_key},
            "summary": summary,
            "issuetype": {"name": str_or(params, "issue_type", "Task")},
        });
        if let Some(description) = opt_str(params, "description") {
            fields["description"] = adf_document(description);
        }
        if let Some(priority) = opt_str(params, "priority") {
            fields["priority"] = json!({"name": priority});
        }
        if let Some(labels) = params.get("labels").and_then(Value::as_array) {
            fields["labels"] = Value::Array(labels.clone());
        }

        self.client
            .post_json(
                "create issue",
                &format!("{base}/issue"),
                &json!({"fields": fields}),
                auth,
            )
            .await
    }

    async fn update_issue(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let issue_key = required_str(params, "issue_key")?;
        let fields = params
            .get("fields")
            .filter(|v| v.is_object())
            .ok_or(ToolError::MissingParameter("fields"))?;
        self.client
            .put_json(
                "update issue",
                &format!("{base}/issue/{issue_key}"),
                &json!({"fields": fields}),
                auth,
            )
            .await
    }

    async fn delete_issue(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let issue_key = required_str(params, "issue_key")?;
        self.client
            .delete_json("delete issue", &format!("{base}/issue/{issue_key}"), auth)
            .await
    }

    async fn search_issues(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let query = [
            ("jql", required_str(params, "jql")?.to_string()),
            ("maxResults", int_or(params, "max_results", 50).to_string()),
            ("startAt", int_or(params, "start_at", 0).to_string()),
            ("expand", "names,schema".to_string()),
        ];
        self.client
            .get_json("search issues", &format!("{base}/search"), &query, auth)
            .await
    }

    async fn get_projects(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let query = [(
            "expand",
            str_or(params, "expand", "lead,issueTypes").to_string(),
        )];
        self.client
            .get_json("fetch projects", &format!("{base}/project"), &query, auth)
            .await
    }

    async fn get_issue_comments(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let issue_key = required_str(params, "issue_key")?;
        let query = [
            ("maxResults", int_or(params, "max_results", 50).to_string()),
            ("startAt", int_or(params, "start_at", 0).to_string()),
        ];
        self.client
            .get_json(
                "fetch issue comments",
                &format!("{base}/issue/{issue_key}/comment"),
                &query,
                auth,
            )
            .await
    }

    async fn add_comment(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let (base, auth) = (self.base()?, self.auth()?);
        let issue_key = required_str(params, "issue_key")?;
        let comment_body = required_str(params, "comment_body")?;
        self.client
            .post_json(
                "add comment",
                &format!("{base}/issue/{issue_key}/comment"),
                &json!({"body": adf_document(comment_body)}),
                auth,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for JiraTool {
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
            "get_issue" => self.get_issue(params).await,
            "create_issue" => self.create_issue(params).await,
            "update_issue" => self.update_issue(params).await,
            "delete_issue" => self.delete_issue(params).await,
            "search_issues" => self.search_issues(params).await,
            "get_projects" => self.get_projects(params).await,
            "get_issue_comments" => self.get_issue_comments(params).await,
            "add_comment" => self.add_comment(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl JiraTool {
    /// Tool pointed at a stub server, with dummy credentials.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            base: Some(base.to_string()),
            email: Some("bot@example.com".to_string()),
            api_token: Some("test-token".to_string()),
        }
    }
}
