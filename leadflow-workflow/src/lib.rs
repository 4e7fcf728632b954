//! Leadflow Workflow
//!
//! Submission and polling of remote lead automation tasks.
//!
//! Architecture:
//! - Configuration: API location, polling cadence and per-request timeout
//! - Scheduler: the task poller, which reads a status endpoint on a fixed
//!   interval until the task reaches a terminal state or is cancelled
//! - Services: the backends that validate input and create tasks, and the
//!   workflow state machine that ties one submission to one poller
//!
//! A workflow tracks at most one task. Submitting again cancels the poller of
//! the previous task first, and a generation tag on every poll guarantees that
//! a cancelled or superseded poller never delivers another update.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

pub use config::Config;
pub use error::WorkflowError;
pub use scheduler::{CancelToken, PollHandle, PollOutcome, StatusSource, TaskObserver, TaskPoller};
pub use service::{
    ScrapeBackend, TaskBackend, TaskWorkflow, VerifyBackend, VerifySource, WorkflowState,
};
