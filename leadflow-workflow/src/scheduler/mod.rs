//! Scheduler layer
//!
//! This layer handles polling the API for the status of a submitted task.
//! It owns the timer and the cancellation plumbing; it knows nothing about
//! how tasks are created.

pub mod poller;

pub use poller::{CancelToken, PollHandle, PollOutcome, StatusSource, TaskObserver, TaskPoller};
