//! Leadflow HTTP Client
//!
//! A simple, type-safe HTTP client for the lead automation API.
//!
//! The API runs long jobs (website scraping, email verification) as background
//! tasks: a creation endpoint returns a task id, and a status endpoint reports
//! progress for that id until the task completes or fails. This crate only
//! wraps the endpoints; polling lives in `leadflow-workflow`.
//!
//! # Example
//!
//! ```no_run
//! use leadflow_client::LeadClient;
//! use leadflow_core::dto::scrape::ScrapeRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = LeadClient::new("http://127.0.0.1:8000");
//!
//!     let created = client.start_scrape(&ScrapeRequest {
//!         urls: vec!["https://example.com".to_string()],
//!     }).await?;
//!
//!     println!("Started task: {:?}", created.task_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod scrape;
mod sheet;
mod verify;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use leadflow_core::dto::TaskCreated;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client for the lead automation API
///
/// This client provides methods for all API endpoints, organized
/// into logical groups:
/// - Website scraping (start, status)
/// - Email verification (array, upload, status)
/// - Google Sheet extraction
#[derive(Debug, Clone)]
pub struct LeadClient {
    /// Base URL of the API (e.g., "http://127.0.0.1:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl LeadClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the API (e.g., "http://127.0.0.1:8000")
    ///
    /// # Example
    /// ```
    /// use leadflow_client::LeadClient;
    ///
    /// let client = LeadClient::new("http://127.0.0.1:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle a task status response
    ///
    /// A 404 means the task id is unknown to the service (never created or
    /// already expired) and is reported as [`ClientError::NotFound`].
    async fn handle_status_response<T: DeserializeOwned>(
        &self,
        task_id: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("task {}", task_id)));
        }

        self.handle_response(response).await
    }
}
