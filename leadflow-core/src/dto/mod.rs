//! Data Transfer Objects for the lead automation API
//!
//! Request and response bodies exchanged with the remote service. Status
//! snapshots live in [`crate::domain::task`] since they double as the
//! locally observed task state.

pub mod scrape;
pub mod sheet;
pub mod verify;

use serde::{Deserialize, Serialize};

/// Response of every task-creation endpoint
///
/// `task_id` is optional on the wire: a body without it is a failed
/// initiation, not a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskCreated {
    #[serde(default)]
    pub task_id: Option<String>,
}

impl TaskCreated {
    /// The task id, if the service assigned a non-empty one
    pub fn id(&self) -> Option<&str> {
        self.task_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_created_without_id() {
        let created: TaskCreated = serde_json::from_str("{}").unwrap();
        assert_eq!(created.id(), None);

        let created: TaskCreated = serde_json::from_str(r#"{"task_id": "  "}"#).unwrap();
        assert_eq!(created.id(), None);
    }

    #[test]
    fn test_task_created_with_id() {
        let created: TaskCreated =
            serde_json::from_str(r#"{"task_id": "t-1", "message": "queued"}"#).unwrap();
        assert_eq!(created.id(), Some("t-1"));
    }
}
