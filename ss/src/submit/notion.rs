//! Notion API client
//!
//! Creates one page per work item in the task database, and one page per
//! course in the course database. Task pages link back to their course
//! through the `Course` relation property.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use eyre::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{SubmitError, Submitter};
use crate::config::NotionConfig;
use crate::domain::{Course, ExternalId, WorkItem};

/// Successful page-creation response (only the id is used)
#[derive(Debug, Deserialize)]
struct PageResponse {
    id: String,
}

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Notion page-creation client
pub struct NotionClient {
    api_key: String,
    base_url: String,
    notion_version: String,
    task_database: String,
    course_database: String,
    time_zone: Option<String>,
    http: Client,
}

impl NotionClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &NotionConfig) -> Result<Self> {
        debug!(base_url = %config.base_url, "from_config: called");
        let api_key = config.get_api_key()?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            notion_version: config.notion_version.clone(),
            task_database: config.task_database.clone(),
            course_database: config.course_database.clone(),
            time_zone: config.time_zone.clone(),
            http,
        })
    }

    /// Build the page-creation body for a work item
    pub fn page_body(&self, item: &WorkItem) -> Value {
        debug!(title = %item.title(), "page_body: called");
        let mut date = json!({ "start": format_timestamp(item.start()) });
        if let Some(end) = item.end() {
            date["end"] = json!(format_timestamp(end));
        }
        if let Some(tz) = &self.time_zone {
            date["time_zone"] = json!(tz);
        }

        let mut properties = json!({
            "Name": { "title": [{ "text": { "content": item.title() } }] },
            "Date": { "date": date },
            "Course": { "relation": [{ "id": item.parent().as_str() }] },
            "Type": { "select": { "name": item.kind().display_name() } },
        });

        if let WorkItem::Meeting(meeting) = item {
            properties["Mandatory"] = json!({
                "status": { "name": if meeting.mandatory { "Yes" } else { "No" } }
            });
        }

        json!({
            "parent": { "database_id": self.task_database },
            "properties": properties,
        })
    }

    /// Build the page-creation body for a course
    pub fn course_body(&self, course: &Course) -> Value {
        debug!(name = %course.name, "course_body: called");
        json!({
            "parent": { "database_id": self.course_database },
            "properties": {
                "Course": { "title": [{ "text": { "content": course.name } }] },
                "Department": { "select": { "name": course.department() } },
                "Quarter": { "select": { "name": course.quarter } },
                "Status": { "status": { "name": course.status.to_string() } },
            }
        })
    }

    /// Create the course page, returning the id work items link to
    pub async fn create_course(&self, course: &Course) -> Result<ExternalId, SubmitError> {
        debug!(name = %course.name, "create_course: called");
        let body = self.course_body(course);
        self.create_page(&body).await
    }

    async fn create_page(&self, body: &Value) -> Result<ExternalId, SubmitError> {
        let url = format!("{}/v1/pages", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.notion_version)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "create_page: network error");
                SubmitError::rejected(format!("network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "create_page: API error");
            let reason = match serde_json::from_str::<ErrorResponse>(&text) {
                Ok(err) if !err.message.is_empty() => format!("HTTP {} {}: {}", status.as_u16(), err.code, err.message),
                _ => format!("HTTP {}: {}", status.as_u16(), text),
            };
            return Err(SubmitError::rejected(reason));
        }

        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| SubmitError::rejected(format!("invalid response: {}", e)))?;
        debug!(id = %page.id, "create_page: success");
        Ok(ExternalId::new(page.id))
    }
}

#[async_trait]
impl Submitter for NotionClient {
    async fn submit(&self, item: &WorkItem) -> Result<ExternalId, SubmitError> {
        debug!(title = %item.title(), "submit: called");
        let body = self.page_body(item);
        self.create_page(&body).await
    }
}

/// ISO-8601 local timestamp without offset
fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
