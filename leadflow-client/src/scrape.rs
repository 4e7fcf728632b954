//! Website scraping endpoints

use crate::LeadClient;
use crate::error::Result;
use leadflow_core::domain::task::ScrapeTaskStatus;
use leadflow_core::dto::TaskCreated;
use leadflow_core::dto::scrape::ScrapeRequest;
use tracing::debug;

impl LeadClient {
    // =============================================================================
    // Website Scraping
    // =============================================================================

    /// Start extracting emails from a list of websites
    ///
    /// # Arguments
    /// * `req` - The URLs to scrape, already normalized
    ///
    /// # Returns
    /// The creation response; its `task_id` may be missing if the service
    /// refused the task without an error status
    ///
    /// # Example
    /// ```no_run
    /// # use leadflow_client::LeadClient;
    /// # use leadflow_core::dto::scrape::ScrapeRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = LeadClient::new("http://127.0.0.1:8000");
    /// let created = client.start_scrape(&ScrapeRequest {
    ///     urls: vec!["https://example.com".to_string()],
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start_scrape(&self, req: &ScrapeRequest) -> Result<TaskCreated> {
        let url = format!("{}/scrape", self.base_url);
        debug!("Submitting {} URL(s) for scraping", req.urls.len());
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the status of a scraping task
    ///
    /// # Arguments
    /// * `task_id` - The task id returned by [`LeadClient::start_scrape`]
    ///
    /// # Returns
    /// The latest status snapshot, or [`crate::ClientError::NotFound`] if the
    /// task is unknown or expired
    pub async fn get_scrape_status(&self, task_id: &str) -> Result<ScrapeTaskStatus> {
        let url = format!("{}/status/{}", self.base_url, task_id);
        let response = self.client.get(&url).send().await?;

        self.handle_status_response(task_id, response).await
    }
}
