//! Google Calendar tool.
//!
//! Wraps the Calendar v3 REST API. Most actions take an optional
//! `calendar_id` and fall back to the caller's primary calendar.
//! Event times are passed through as RFC 3339 strings and pinned to
//! UTC in the request body.

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::common::{bool_or, int_or, opt_str, required_str, str_or};
use crate::core::config::CredentialsConfig;
use crate::domains::tools::client::{Auth, ProviderClient};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ProviderTool;
use crate::domains::tools::spec::{ActionSpec, ParamSpec};

const BASE: &str = "https://www.googleapis.com/calendar/v3";

const CALENDAR_ID: ParamSpec =
    ParamSpec::string("calendar_id", "Calendar id (default: 'primary')");

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "list_calendars",
        description: "List the calendars on the user's calendar list",
        params: &[],
    },
    ActionSpec {
        name: "list_events",
        description: "List events from a calendar, soonest first",
        params: &[
            CALENDAR_ID,
            ParamSpec::string("time_min", "Lower bound as RFC 3339, e.g. '2025-06-01T00:00:00Z'"),
            ParamSpec::string("time_max", "Upper bound as RFC 3339"),
            ParamSpec::integer("max_results", "Number of events to return (default: 10)")
                .range(1.0, 2500.0),
            ParamSpec::boolean(
                "single_events",
                "Expand recurring events into instances (default: true)",
            ),
            ParamSpec::options(
                "order_by",
                &["startTime", "updated"],
                "Sort order (default: startTime)",
            ),
        ],
    },
    ActionSpec {
        name: "get_event",
        description: "Fetch a single event",
        params: &[ParamSpec::string("event_id", "Event id").required(), CALENDAR_ID],
    },
    ActionSpec {
        name: "create_event",
        description: "Create an event with UTC start and end times",
        params: &[
            ParamSpec::string("summary", "Event title").required(),
            ParamSpec::string("start_time", "Start as RFC 3339, e.g. '2025-06-01T09:00:00Z'")
                .required(),
            ParamSpec::string("end_time", "End as RFC 3339").required(),
            ParamSpec::string("description", "Event description"),
            ParamSpec::string("location", "Event location"),
            ParamSpec::list("attendees", "Attendee email addresses"),
            CALENDAR_ID,
        ],
    },
    ActionSpec {
        name: "delete_event",
        description: "Delete an event",
        params: &[ParamSpec::string("event_id", "Event id").required(), CALENDAR_ID],
    },
];

/// Google Calendar REST API tool implementation.
#[derive(Debug)]
pub struct GoogleCalendarTool {
    client: ProviderClient,
    access_token: Option<String>,
    base: String,
}

impl GoogleCalendarTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "google_calendar";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "List, read, create and delete Google Calendar events across the user's calendars.";

    pub fn new(client: ProviderClient, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            access_token: credentials.google_calendar_access_token.clone(),
            base: BASE.to_string(),
        }
    }

    fn auth(&self) -> Result<Auth<'_>, ToolError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(ToolError::MissingCredential {
                tool: Self::NAME,
                variable: "GOOGLE_CALENDAR_ACCESS_TOKEN",
            })?;
        Ok(Auth::Bearer(token))
    }

    async fn list_calendars(&self) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        self.client
            .get_json(
                "list calendars",
                &format!("{}/users/me/calendarList", self.base),
                &[],
                auth,
            )
            .await
    }

    async fn list_events(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let auth = self.auth()?;
        let calendar_id = str_or(params, "calendar_id", "primary");
        let mut query = vec![
            ("maxResults", int_or(params, "max_results", 10).to_string()),
            (
                "singleEvents",
                bool_or(params, "single_events", true).to_string(),
            ),
            (
                "orderBy",
                str_or(params, "order_by", "startTime").to_string(),
            ),
        ];
        if let Some(time_min) = opt_str(params, "time_min") {
            query.push(("timeMin", time_min.to_string()));
        }
        if let Some(time_max) = opt_str(params, "time_max") {
            query.push(("timeMax", time_max.to_string()));
        }
        self.client
            .get_json(
                "list events",
                &format!("{}/calendars/{calendar_id}/events", self.base),
                &query,
                auth,
            )
            .await
    }

    async fn get_event(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let event_id = required_str(params, "event_id")?;
        let calendar_id = str_or(params, "calendar_id", "primary");
        let auth = self.auth()?;
        self.client
            .get_json(
                "get event",
                &format!("{}/calendars/{calendar_id}/events/{event_id}", self.base),
                &[],
                auth,
            )
            .await
    }

    async fn create_event(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let summary = required_str(params, "summary")?;
        let start_time = required_str(params, "start_time")?;
        let end_time = required_str(params, "end_time")?;
        let calendar_id = str_or(params, "calendar_id", "primary");
        let auth = self.auth()?;

        let mut event = json!({
            "summary": summary,
            "start": { "dateTime": start_time, "timeZone": "UTC" },
            "end": { "dateTime": end_time, "timeZone": "UTC" },
        });
        if let Some(description) = opt_str(params, "description") {
            event["description"] = json!(description);
        }
        if let Some(location) = opt_str(params, "location") {
            event["location"] = json!(location);
        }
        if let Some(attendees) = params.get("attendees").and_then(Value::as_array) {
            let attendees: Vec<Value> = attendees
                .iter()
                .filter_map(Value::as_str)
                .map(|email| json!({ "email": email }))
                .collect();
            if !attendees.is_empty() {
                event["attendees"] = Value::Array(attendees);
            }
        }

        self.client
            .post_json(
                "create event",
                &format!("{}/calendars/{calendar_id}/events", self.base),
                &event,
                auth,
            )
            .await
    }

    async fn delete_event(&self, params: &JsonObject) -> Result<Value, ToolError> {
        let event_id = required_str(params, "event_id")?;
        let calendar_id = str_or(params, "calendar_id", "primary");
        let auth = self.auth()?;
        self.client
            .delete_json(
                "delete event",
                &format!("{}/calendars/{calendar_id}/events/{event_id}", self.base),
                auth,
            )
            .await
    }
}

#[async_trait]
impl ProviderTool for GoogleCalendarTool {
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
            "list_calendars" => self.list_calendars().await,
            "list_events" => self.list_events(params).await,
            "get_event" => self.get_event(params).await,
            "create_event" => self.create_event(params).await,
            "delete_event" => self.delete_event(params).await,
            _ => Err(ToolError::unknown_action(Self::NAME, action)),
        }
    }
}

#[cfg(test)]
impl GoogleCalendarTool {
    /// Tool pointed at a stub server, with a dummy access token.
    pub(crate) fn stubbed(base: &str) -> Self {
        Self {
            client: crate::domains::tools::testing::test_client(),
            access_token: Some("ya29.test".to_string()),
            base: base.to_string(),
        }
    }
}
