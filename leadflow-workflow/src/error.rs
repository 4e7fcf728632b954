//! Error types for submission and polling

use thiserror::Error;

/// Errors surfaced by a task workflow
///
/// `Validation` and `Initiation` happen before polling starts; `TaskNotFound`
/// and `TaskFailed` end polling. `TransientPoll` never ends polling: it is
/// logged and the next tick retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// Input was empty or invalid; nothing was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The task-creation call failed or returned no task id
    #[error("Could not start task: {0}")]
    Initiation(String),

    /// A status read failed for a reason worth retrying
    #[error("Status check for task {task_id} failed: {reason}")]
    TransientPoll { task_id: String, reason: String },

    /// The service does not know the task (never created or expired)
    #[error("Task {task_id} not found; it may have expired")]
    TaskNotFound { task_id: String },

    /// The service reported the task as failed
    #[error("Task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// Polling was stopped before the task finished
    #[error("Task tracking was cancelled")]
    Cancelled,
}
