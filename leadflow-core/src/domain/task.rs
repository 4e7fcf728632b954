//! Task domain model
//!
//! A task is one unit of background work on the remote service, identified by
//! an opaque string id. The service reports its state through status
//! snapshots; each workflow has its own snapshot shape, unified here by the
//! [`TaskSnapshot`] trait.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::status::TaskStatus;

/// Common view over the status snapshots returned by the service
///
/// Snapshots are complete: each one replaces the previous one verbatim.
pub trait TaskSnapshot: Clone + Send + Sync + 'static {
    /// Status label of the task
    fn status(&self) -> &TaskStatus;

    /// Progress percentage as reported by the service, if any
    fn reported_progress(&self) -> Option<f64>;

    /// Number of items processed so far
    fn items_processed(&self) -> u64;

    /// Total number of items in the task
    fn total_items(&self) -> u64;

    /// Seconds since the task started
    fn elapsed_seconds(&self) -> f64;

    /// Result payload, present once the task completed
    fn result(&self) -> Option<&Value>;

    /// Error message, present once the task failed
    fn error(&self) -> Option<&str>;

    /// Progress as a percentage in `[0, 100]`
    ///
    /// A completed task is always at 100. Otherwise the reported progress wins,
    /// then the processed/total ratio, then 0.
    fn progress_percent(&self) -> f64 {
        if *self.status() == TaskStatus::Completed {
            return 100.0;
        }

        let percent = match self.reported_progress() {
            Some(progress) => progress,
            None if self.total_items() > 0 => {
                self.items_processed() as f64 / self.total_items() as f64 * 100.0
            }
            None => 0.0,
        };

        percent.clamp(0.0, 100.0)
    }
}

/// Snapshot returned by `GET /status/{task_id}` for website scraping tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeTaskStatus {
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub total_urls: u64,
    #[serde(default)]
    pub urls_processed: u64,
    #[serde(default)]
    pub time_elapsed_seconds: f64,
    /// Extracted data, present on completion
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskSnapshot for ScrapeTaskStatus {
    fn status(&self) -> &TaskStatus {
        &self.status
    }

    fn reported_progress(&self) -> Option<f64> {
        self.progress
    }

    fn items_processed(&self) -> u64 {
        self.urls_processed
    }

    fn total_items(&self) -> u64 {
        self.total_urls
    }

    fn elapsed_seconds(&self) -> f64 {
        self.time_elapsed_seconds
    }

    fn result(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Snapshot returned by `GET /email/verify/status/{task_id}` for email
/// verification tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyTaskStatus {
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub time_elapsed_seconds: f64,
    /// Per-email verification results, present on completion
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub authentic_email_count: Option<u64>,
    /// Name of the file the service wrote results to, if requested
    #[serde(default)]
    pub output_file_name: Option<String>,
}

impl TaskSnapshot for VerifyTaskStatus {
    fn status(&self) -> &TaskStatus {
        &self.status
    }

    fn reported_progress(&self) -> Option<f64> {
        self.progress
    }

    fn items_processed(&self) -> u64 {
        self.items_processed
    }

    fn total_items(&self) -> u64 {
        self.total_items
    }

    fn elapsed_seconds(&self) -> f64 {
        self.time_elapsed_seconds
    }

    fn result(&self) -> Option<&Value> {
        self.results.as_ref()
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// A task tracked locally
///
/// Created when submission returns an id. The snapshot is only ever replaced
/// as a whole by a poll response, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Task<S> {
    pub id: String,
    snapshot: Option<S>,
}

impl<S: TaskSnapshot> Task<S> {
    /// Start tracking a task that has not been polled yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            snapshot: None,
        }
    }

    /// Replace the observed state with a fresh snapshot
    pub fn observe(&mut self, snapshot: S) {
        self.snapshot = Some(snapshot);
    }

    /// Latest snapshot, if any poll succeeded yet
    pub fn snapshot(&self) -> Option<&S> {
        self.snapshot.as_ref()
    }

    /// Current status; a task never polled is pending
    pub fn status(&self) -> TaskStatus {
        self.snapshot
            .as_ref()
            .map(|s| s.status().clone())
            .unwrap_or_default()
    }

    pub fn progress_percent(&self) -> f64 {
        self.snapshot
            .as_ref()
            .map(TaskSnapshot::progress_percent)
            .unwrap_or(0.0)
    }

    /// Result payload, only when the task completed
    pub fn result(&self) -> Option<&Value> {
        self.snapshot
            .as_ref()
            .filter(|s| *s.status() == TaskStatus::Completed)
            .and_then(|s| s.result())
    }

    /// Error message, only when the task failed
    pub fn error(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .filter(|s| *s.status() == TaskStatus::Failed)
            .and_then(|s| s.error())
    }
}

/// Format elapsed seconds as `HH:MM:SS`
pub fn format_elapsed(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
