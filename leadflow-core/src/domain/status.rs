//! Task status labels

use serde::{Deserialize, Serialize};

/// Status label reported by the remote service for a task
///
/// Intermediate labels form an open-ended class: any label the service sends
/// that is not listed here is kept verbatim in [`TaskStatus::Other`] and
/// treated as "still in progress". Only `COMPLETED` and `FAILED` are terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    ResolvingUrls,
    Scraping,
    VerifyingEmails,
    Completed,
    Failed,
    /// Intermediate label unknown to this client
    Other(String),
}

impl TaskStatus {
    /// Wire label of this status
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::ResolvingUrls => "RESOLVING_URLS",
            TaskStatus::Scraping => "SCRAPING",
            TaskStatus::VerifyingEmails => "VERIFYING_EMAILS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Other(label) => label,
        }
    }

    /// Whether no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl From<String> for TaskStatus {
    fn from(label: String) -> Self {
        match label.as_str() {
            "PENDING" => TaskStatus::Pending,
            "PROCESSING" => TaskStatus::Processing,
            "RESOLVING_URLS" => TaskStatus::ResolvingUrls,
            "SCRAPING" => TaskStatus::Scraping,
            "VERIFYING_EMAILS" => TaskStatus::VerifyingEmails,
            "COMPLETED" => TaskStatus::Completed,
            "FAILED" => TaskStatus::Failed,
            _ => TaskStatus::Other(label),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(label: &str) -> Self {
        TaskStatus::from(label.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
