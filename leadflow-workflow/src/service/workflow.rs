//! Submission workflow
//!
//! Ties one backend to one poller and tracks at most one task:
//!
//! ```text
//! Idle -> Submitting -> Polling -> Completed
//!           |             |    \-> Failed
//!           \-> Idle (validation or initiation error)
//! ```
//!
//! Submitting or tracking a new task always cancels the previous poller first.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use leadflow_core::domain::status::TaskStatus;
use leadflow_core::domain::task::{Task, TaskSnapshot};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::WorkflowError;
use crate::scheduler::poller::GENERIC_FAILURE_MESSAGE;
use crate::scheduler::{CancelToken, PollHandle, TaskObserver, TaskPoller};
use crate::service::TaskBackend;

/// Where a workflow is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Submitting,
    Polling { task_id: String },
    Completed { task_id: String },
    Failed { task_id: String, message: String },
}

impl WorkflowState {
    /// Whether a task is being created or polled
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowState::Submitting | WorkflowState::Polling { .. })
    }
}

struct Tracking<S> {
    state: WorkflowState,
    task: Option<Task<S>>,
}

type SharedTracking<S> = Arc<Mutex<Tracking<S>>>;

fn lock<S>(tracking: &SharedTracking<S>) -> MutexGuard<'_, Tracking<S>> {
    tracking.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records every delivered snapshot before forwarding it to the caller's
/// observer. Runs under the poller's generation check, so a cancelled run
/// can never overwrite the state of a newer one.
struct TrackingObserver<S> {
    tracking: SharedTracking<S>,
    inner: Arc<dyn TaskObserver<S>>,
}

impl<S: TaskSnapshot> TaskObserver<S> for TrackingObserver<S> {
    fn on_update(&self, task_id: &str, snapshot: &S) {
        {
            let mut tracking = lock(&self.tracking);
            if let Some(task) = tracking.task.as_mut().filter(|task| task.id == task_id) {
                task.observe(snapshot.clone());
            }

            let task_id = task_id.to_string();
            tracking.state = match snapshot.status() {
                TaskStatus::Completed => WorkflowState::Completed { task_id },
                TaskStatus::Failed => WorkflowState::Failed {
                    task_id,
                    message: snapshot
                        .error()
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or(GENERIC_FAILURE_MESSAGE)
                        .to_string(),
                },
                _ => WorkflowState::Polling { task_id },
            };
        }

        self.inner.on_update(task_id, snapshot);
    }

    fn on_error(&self, task_id: &str, error: &WorkflowError) {
        lock(&self.tracking).state = WorkflowState::Failed {
            task_id: task_id.to_string(),
            message: error.to_string(),
        };

        self.inner.on_error(task_id, error);
    }
}

/// Resets a `Submitting` workflow to `Idle` when dropped
struct SubmittingGuard<'a, S>(&'a SharedTracking<S>);

impl<S> Drop for SubmittingGuard<'_, S> {
    fn drop(&mut self) {
        let mut tracking = lock(self.0);
        if tracking.state == WorkflowState::Submitting {
            tracking.state = WorkflowState::Idle;
        }
    }
}

/// Submit-then-poll workflow over one backend
pub struct TaskWorkflow<B: TaskBackend> {
    backend: Arc<B>,
    poller: TaskPoller<B>,
    tracking: SharedTracking<B::Snapshot>,
    active: Option<PollHandle<B::Snapshot>>,
}

impl<B: TaskBackend> TaskWorkflow<B> {
    /// Creates an idle workflow polling with the cadence of `config`
    pub fn new(backend: Arc<B>, config: &Config) -> Self {
        Self {
            poller: TaskPoller::from_config(Arc::clone(&backend), config),
            backend,
            tracking: Arc::new(Mutex::new(Tracking {
                state: WorkflowState::Idle,
                task: None,
            })),
            active: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        lock(&self.tracking).state.clone()
    }

    /// The tracked task with its latest snapshot
    pub fn task(&self) -> Option<Task<B::Snapshot>> {
        lock(&self.tracking).task.clone()
    }

    /// Token that stops the active poller, if any
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.active.as_ref().map(PollHandle::token)
    }

    /// Validates and submits `input`, then starts polling the new task
    ///
    /// Any task tracked so far is cancelled and discarded first. On a
    /// validation or initiation error the workflow is back to `Idle` and no
    /// poller runs. Cancel safe: dropping the future before the service
    /// answers also leaves the workflow `Idle`.
    pub async fn submit(
        &mut self,
        input: B::Input,
        observer: Arc<dyn TaskObserver<B::Snapshot>>,
    ) -> Result<String, WorkflowError> {
        self.cancel();
        self.set_state(WorkflowState::Submitting);

        // Back to Idle when the creation call ends, or when this future is
        // dropped while it is pending
        let created = {
            let _submitting = SubmittingGuard(&self.tracking);
            self.backend.submit(input).await
        };

        let created = match created {
            Ok(created) => created,
            Err(e) => {
                debug!("Submission rejected: {}", e);
                return Err(e);
            }
        };

        let Some(task_id) = created.id().map(str::to_string) else {
            return Err(WorkflowError::Initiation(
                "the service returned no task id".to_string(),
            ));
        };

        info!("Task {} created", task_id);
        self.track(task_id.clone(), observer);
        Ok(task_id)
    }

    /// Starts polling a task that already exists on the service
    pub fn track(
        &mut self,
        task_id: impl Into<String>,
        observer: Arc<dyn TaskObserver<B::Snapshot>>,
    ) -> CancelToken {
        self.cancel();

        let task_id = task_id.into();
        {
            let mut tracking = lock(&self.tracking);
            tracking.task = Some(Task::new(task_id.clone()));
            tracking.state = WorkflowState::Polling {
                task_id: task_id.clone(),
            };
        }

        let observer = Arc::new(TrackingObserver {
            tracking: Arc::clone(&self.tracking),
            inner: observer,
        });
        let handle = self.poller.start(task_id, observer);
        let token = handle.token();
        self.active = Some(handle);
        token
    }

    /// Waits until the tracked task ends
    ///
    /// Returns the final snapshot of a completed task; every other ending is
    /// an error. Cancel safe.
    pub async fn wait(&mut self) -> Result<B::Snapshot, WorkflowError> {
        let Some(handle) = self.active.as_mut() else {
            return Err(WorkflowError::Cancelled);
        };

        let task_id = handle.task_id().to_string();
        handle.wait().await.into_result(&task_id)
    }

    /// Stops the active poller and discards the tracked task
    ///
    /// Idempotent. Back to `Idle` once this returns.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.active.take() {
            debug!("Stopping poller for task {}", handle.task_id());
            handle.stop();
        }

        let mut tracking = lock(&self.tracking);
        tracking.state = WorkflowState::Idle;
        tracking.task = None;
    }

    fn set_state(&self, state: WorkflowState) {
        lock(&self.tracking).state = state;
    }
}
