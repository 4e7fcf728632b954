//! Service layer
//!
//! Services contain the submission logic: each backend validates and
//! normalizes one kind of input, creates the remote task, and reads that
//! task's status. [`TaskWorkflow`] drives one backend through the
//! submit-then-poll state machine.
//!
//! Backends are trait-based so the workflow can be tested without a server.

mod scrape;
mod verify;
mod workflow;

use async_trait::async_trait;
use leadflow_core::dto::TaskCreated;

use crate::error::WorkflowError;
use crate::scheduler::StatusSource;

// Re-export implementations
pub use scrape::ScrapeBackend;
pub use verify::{VerifyBackend, VerifySource};
pub use workflow::{TaskWorkflow, WorkflowState};

/// A kind of remote task: how to create it and how to read its status
#[async_trait]
pub trait TaskBackend: StatusSource {
    /// Raw user input accepted by this backend
    type Input: Send + 'static;

    /// Validates `input` and asks the service to create a task
    ///
    /// Returns [`WorkflowError::Validation`] without any network call when
    /// the normalized input is empty, and [`WorkflowError::Initiation`] when
    /// the creation call fails. A response without a task id is handed back
    /// as-is; the workflow decides what that means.
    async fn submit(&self, input: Self::Input) -> Result<TaskCreated, WorkflowError>;
}
