//! Website email extraction backend

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_client::{ClientError, LeadClient};
use leadflow_core::domain::task::ScrapeTaskStatus;
use leadflow_core::dto::TaskCreated;
use leadflow_core::dto::scrape::ScrapeRequest;
use leadflow_core::input::normalize_urls;
use tracing::info;

use crate::error::WorkflowError;
use crate::scheduler::StatusSource;
use crate::service::TaskBackend;

/// Submits website URLs to `POST /scrape` and polls `GET /status/{id}`
pub struct ScrapeBackend {
    client: Arc<LeadClient>,
}

impl ScrapeBackend {
    pub fn new(client: Arc<LeadClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for ScrapeBackend {
    type Snapshot = ScrapeTaskStatus;

    async fn fetch_status(&self, task_id: &str) -> Result<ScrapeTaskStatus, ClientError> {
        self.client.get_scrape_status(task_id).await
    }
}

#[async_trait]
impl TaskBackend for ScrapeBackend {
    /// Raw URL entries: typed, pasted or read from a file
    type Input = Vec<String>;

    async fn submit(&self, input: Vec<String>) -> Result<TaskCreated, WorkflowError> {
        let urls = normalize_urls(&input);
        if urls.is_empty() {
            return Err(WorkflowError::Validation("no valid URLs found".to_string()));
        }

        info!(
            "Submitting {} URL(s) for email extraction ({} dropped)",
            urls.len(),
            input.len() - urls.len()
        );

        self.client
            .start_scrape(&ScrapeRequest { urls })
            .await
            .map_err(|e| WorkflowError::Initiation(e.to_string()))
    }
}
