//! Client for the external routing collaborator.
//!
//! Task creation hands each new task to a routing endpoint on another
//! service. The collaborator's response is opaque; any failure collapses to
//! `UpstreamUnavailable`, which the create path logs and degrades on
//! instead of failing. This service never blocks task creation on the
//! collaborator's availability.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::task::Task;

/// Seam for the routing collaborator so tests can stub it out.
#[async_trait]
pub trait TaskRouter: Send + Sync {
    /// Hand a freshly created task to the downstream router.
    async fn route(&self, task: &Task) -> Result<(), Error>;
}

pub type RouterRef = Arc<dyn TaskRouter>;

#[derive(Serialize)]
struct RouteRequest<'a> {
    task: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    model: &'a str,
    priority: &'a str,
}

/// Production router client.
pub struct HttpTaskRouter {
    client: Client,
    base_url: String,
}

impl HttpTaskRouter {
    pub fn new(base_url: String) -> Self {
        // Capped so a hung collaborator cannot hold up task creation.
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[async_trait]
impl TaskRouter for HttpTaskRouter {
    async fn route(&self, task: &Task) -> Result<(), Error> {
        let url = format!("{}/route-task", self.base_url.trim_end_matches('/'));
        let request = RouteRequest {
            task: &task.prompt,
            context: task.context.as_deref(),
            model: &task.model,
            priority: task.priority.as_str(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::UpstreamUnavailable(format!("request timeout: {}", e))
                } else if e.is_connect() {
                    Error::UpstreamUnavailable(format!("connection failed: {}", e))
                } else {
                    Error::UpstreamUnavailable(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "route-task returned {}",
                status
            )));
        }
        // Response body is opaque and intentionally discarded.
        Ok(())
    }
}
