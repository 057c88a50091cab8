//! Lightweight HTTP client for CLI commands.
//!
//! CLI subcommands (`taskd create`, `taskd list`, etc.) use this to call the
//! task server's REST API. Server-side errors keep their wire message and
//! status code so the CLI can report them verbatim.

use anyhow::{Context as _, Result};
use reqwest::{Method, Url};
use serde_json::{json, Value};

use crate::store::Task;

/// A short-lived HTTP client for CLI-to-server calls.
pub struct TaskClient {
    http: reqwest::Client,
    base: Url,
}

impl TaskClient {
    /// Create a client targeting `server`, e.g. `http://localhost:8080`.
    pub fn new(server: &str) -> Result<Self> {
        let base = Url::parse(server).with_context(|| format!("invalid server URL: {server}"))?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { http, base })
    }

    pub async fn create_task(
        &self,
        name: &str,
        description: &str,
        priority: Option<&str>,
        due_date: Option<&str>,
    ) -> Result<Task> {
        let mut body = json!({
            "taskName": name,
            "description": description,
        });
        if let Some(priority) = priority {
            body["priority"] = json!(priority);
        }
        if let Some(due_date) = due_date {
            body["dueDate"] = json!(due_date);
        }
        let value = self.request(Method::POST, &["tasks"], Some(body)).await?;
        parse_task(value)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut value = self.request(Method::GET, &["tasks"], None).await?;
        serde_json::from_value(value["tasks"].take()).context("unexpected task list payload")
    }

    pub async fn get_task(&self, name: &str) -> Result<Task> {
        let value = self.request(Method::GET, &["tasks", name], None).await?;
        parse_task(value)
    }

    pub async fn update_status(&self, name: &str, status: &str) -> Result<Task> {
        let body = json!({ "status": status });
        let value = self
            .request(Method::PATCH, &["tasks", name], Some(body))
            .await?;
        parse_task(value)
    }

    pub async fn assign_task(&self, name: &str, assignee: &str) -> Result<Task> {
        let body = json!({ "assignee": assignee });
        let value = self
            .request(Method::POST, &["tasks", name, "assign"], Some(body))
            .await?;
        parse_task(value)
    }

    pub async fn add_comment(&self, name: &str, comment: &str) -> Result<Task> {
        let body = json!({ "comment": comment });
        let value = self
            .request(Method::POST, &["tasks", name, "comments"], Some(body))
            .await?;
        parse_task(value)
    }

    pub async fn comments(&self, name: &str) -> Result<Vec<String>> {
        let mut value = self
            .request(Method::GET, &["tasks", name, "comments"], None)
            .await?;
        serde_json::from_value(value["comments"].take()).context("unexpected comments payload")
    }

    pub async fn delete_task(&self, name: &str) -> Result<Task> {
        let value = self.request(Method::DELETE, &["tasks", name], None).await?;
        parse_task(value)
    }

    pub async fn delete_all(&self) -> Result<Vec<Task>> {
        let mut value = self.request(Method::DELETE, &["tasks"], None).await?;
        serde_json::from_value(value["tasks"].take()).context("unexpected task list payload")
    }

    /// Send one request and parse the JSON response.
    ///
    /// Non-2xx responses become errors carrying the server's wire message and
    /// the status code, e.g. `Task 'x' not found (Status code: 404)`.
    async fn request(&self, method: Method, path: &[&str], body: Option<Value>) -> Result<Value> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("server URL cannot be a base: {}", self.base))?
            .pop_if_empty()
            .extend(path);

        let mut request = self.http.request(method, url);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("failed to connect to {}", self.base))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("failed to read server response")?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            anyhow::bail!("{message} (Status code: {})", status.as_u16());
        }
        serde_json::from_str(&text).context("server returned invalid JSON")
    }
}

fn parse_task(value: Value) -> Result<Task> {
    serde_json::from_value(value).context("unexpected task payload")
}
