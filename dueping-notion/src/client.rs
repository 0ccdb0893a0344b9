//! Notion database query client.
//!
//! One `POST /v1/databases/{id}/query` per run with an empty filter. Only the
//! first page of results is used.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use dueping_core::{DueError, DueResult, Task, TaskSource};

use crate::types::QueryResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub secret: String,
    pub database_id: String,
    pub version: String,
    pub base_url: String,
    /// Drop pages missing a name or due date instead of failing the run.
    pub skip_malformed: bool,
}

impl NotionConfig {
    pub fn new(secret: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            database_id: database_id.into(),
            version: DEFAULT_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            skip_malformed: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    fn query_url(&self) -> String {
        format!(
            "{}/v1/databases/{}/query",
            self.base_url.trim_end_matches('/'),
            self.database_id
        )
    }

    /// Accept the secret with or without its `Bearer ` prefix.
    fn authorization(&self) -> String {
        if self.secret.starts_with("Bearer ") {
            self.secret.clone()
        } else {
            format!("Bearer {}", self.secret)
        }
    }
}

pub struct NotionClient {
    config: NotionConfig,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn query(&self) -> DueResult<QueryResponse> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.config.authorization())
                .map_err(|e| DueError::Fetch(format!("invalid notion secret: {e}")))?,
        );
        headers.insert(
            "notion-version",
            HeaderValue::from_str(&self.config.version)
                .map_err(|e| DueError::Fetch(format!("invalid notion version: {e}")))?,
        );

        let resp = self
            .client
            .post(self.config.query_url())
            .headers(headers)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DueError::Fetch(format!("notion request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(DueError::Fetch(format!("notion error: {status} {txt}")));
        }

        resp.json()
            .await
            .map_err(|e| DueError::Fetch(format!("parse notion response: {e}")))
    }

    /// Turn a query response into tasks, in the order Notion returned them.
    pub fn tasks_from(&self, resp: &QueryResponse) -> DueResult<Vec<Task>> {
        if resp.has_more {
            tracing::warn!(
                returned = resp.results.len(),
                "notion reported more results; only the first page is used"
            );
        }

        let mut tasks = Vec::with_capacity(resp.results.len());
        for (i, page) in resp.results.iter().enumerate() {
            match page.to_task(i) {
                Ok(t) => tasks.push(t),
                Err(e) if self.config.skip_malformed => {
                    tracing::warn!(error = %e, "skipping task record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(tasks)
    }
}

#[async_trait]
impl TaskSource for NotionClient {
    async fn fetch_tasks(&self) -> DueResult<Vec<Task>> {
        let resp = self.query().await?;
        let tasks = self.tasks_from(&resp)?;
        tracing::info!(count = tasks.len(), "fetched tasks from notion");
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_tolerates_trailing_slash() {
        let cfg = NotionConfig::new("s", "db1").with_base_url("http://localhost:9/");
        assert_eq!(cfg.query_url(), "http://localhost:9/v1/databases/db1/query");
    }

    #[test]
    fn bearer_prefix_added_once() {
        assert_eq!(NotionConfig::new("secret_x", "db").authorization(), "Bearer secret_x");
        assert_eq!(
            NotionConfig::new("Bearer secret_x", "db").authorization(),
            "Bearer secret_x"
        );
    }
}
