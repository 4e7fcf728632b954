//! Task poller
//!
//! Reads the status of one remote task on a fixed interval until it reaches a
//! terminal state, the service forgets it, or the caller cancels.
//! Each started task gets a generation number; an update is only delivered
//! while its generation is still the poller's current one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use leadflow_client::ClientError;
use leadflow_core::domain::status::TaskStatus;
use leadflow_core::domain::task::TaskSnapshot;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::WorkflowError;

/// Message used when the service marks a task failed without saying why
pub const GENERIC_FAILURE_MESSAGE: &str = "task failed without an error message";

/// Source of task status snapshots
///
/// Implemented by the HTTP backends and by scripted sources in tests.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    /// Snapshot shape of the status endpoint
    type Snapshot: TaskSnapshot;

    /// Reads the current status of a task
    ///
    /// A "not found" error ends polling; any other error is retried.
    async fn fetch_status(&self, task_id: &str) -> Result<Self::Snapshot, ClientError>;
}

/// Receives the state observed by a poller
///
/// Calls are made while the poller's generation lock is held, so an observer
/// must not start or stop polling on the same poller from inside a callback.
pub trait TaskObserver<S>: Send + Sync {
    /// Called with the latest snapshot after every successful poll,
    /// including the final `COMPLETED` or `FAILED` one
    fn on_update(&self, task_id: &str, snapshot: &S);

    /// Called once when polling ends on an error (e.g. the task is not found)
    fn on_error(&self, _task_id: &str, _error: &WorkflowError) {}
}

/// How a polling run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<S> {
    /// The task completed; holds the final snapshot with its result
    Completed(S),
    /// The service reported the task as failed
    Failed { snapshot: S, message: String },
    /// The service does not know the task
    NotFound,
    /// The poller was stopped or superseded before the task finished
    Cancelled,
}

impl<S> PollOutcome<S> {
    /// Converts the outcome into the final snapshot or the matching error
    pub fn into_result(self, task_id: &str) -> Result<S, WorkflowError> {
        match self {
            PollOutcome::Completed(snapshot) => Ok(snapshot),
            PollOutcome::Failed { message, .. } => Err(WorkflowError::TaskFailed {
                task_id: task_id.to_string(),
                message,
            }),
            PollOutcome::NotFound => Err(WorkflowError::TaskNotFound {
                task_id: task_id.to_string(),
            }),
            PollOutcome::Cancelled => Err(WorkflowError::Cancelled),
        }
    }
}

/// The poller's current generation
///
/// Starting a task advances it; stopping a task retires it if it is still
/// current. Deliveries check it under the same lock, which is what makes
/// `stop` effective as soon as it returns.
#[derive(Debug, Default)]
struct GenerationGate {
    current: Mutex<u64>,
}

impl GenerationGate {
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self) -> u64 {
        let mut current = self.lock();
        *current += 1;
        *current
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.lock() == generation
    }

    /// Returns false if `generation` was already superseded
    fn retire(&self, generation: u64) -> bool {
        let mut current = self.lock();
        if *current == generation {
            *current += 1;
            true
        } else {
            false
        }
    }

    /// Runs `deliver` only if `generation` is current; returns whether it ran
    fn deliver(&self, generation: u64, deliver: impl FnOnce()) -> bool {
        let current = self.lock();
        if *current != generation {
            return false;
        }
        deliver();
        drop(current);
        true
    }
}

/// Owned cancellation token for one polling run
///
/// Cloneable so it can be moved into a signal handler while the
/// [`PollHandle`] is being awaited.
#[derive(Debug, Clone)]
pub struct CancelToken {
    generation: u64,
    gate: Arc<GenerationGate>,
    abort: AbortHandle,
}

impl CancelToken {
    /// Stops the polling run
    ///
    /// Idempotent. Once this returns the observer receives nothing more for
    /// this run, even if a status response is already in flight. Cancelling
    /// a run that was superseded by a newer one leaves the newer one alone.
    pub fn cancel(&self) {
        if self.gate.retire(self.generation) {
            debug!("Cancelled polling generation {}", self.generation);
        }
        self.abort.abort();
    }

    /// Whether this run may still deliver updates
    pub fn is_current(&self) -> bool {
        self.gate.is_current(self.generation)
    }
}

/// Handle to a running poll loop
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct PollHandle<S> {
    task_id: String,
    token: CancelToken,
    join: Option<JoinHandle<PollOutcome<S>>>,
    outcome: Option<PollOutcome<S>>,
}

impl<S: Clone> PollHandle<S> {
    /// Id of the polled task
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// A token that stops this run
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Stops polling; see [`CancelToken::cancel`]
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether the loop has ended
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some() || self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the loop to end
    ///
    /// Cancel safe: dropping the returned future leaves the loop running and
    /// the handle usable. Awaiting again after the loop ended returns the same
    /// outcome.
    pub async fn wait(&mut self) -> PollOutcome<S> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let outcome = match self.join.as_mut() {
            Some(join) => match join.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if e.is_panic() {
                        warn!("Poll loop for task {} panicked: {}", self.task_id, e);
                    }
                    PollOutcome::Cancelled
                }
            },
            None => PollOutcome::Cancelled,
        };

        self.join = None;
        self.outcome = Some(outcome.clone());
        outcome
    }
}

impl<S> Drop for PollHandle<S> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Polls the status of one task at a time on a fixed interval
pub struct TaskPoller<R: StatusSource> {
    source: Arc<R>,
    interval: Duration,
    request_timeout: Option<Duration>,
    gate: Arc<GenerationGate>,
}

impl<R: StatusSource> TaskPoller<R> {
    /// Creates a poller with no per-request timeout
    pub fn new(source: Arc<R>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            request_timeout: None,
            gate: Arc::new(GenerationGate::default()),
        }
    }

    /// Creates a poller with the interval and timeout of `config`
    pub fn from_config(source: Arc<R>, config: &Config) -> Self {
        Self::new(source, config.poll_interval).with_request_timeout(config.request_timeout)
    }

    /// Bounds each status read; a read that takes longer is retried
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Starts polling `task_id`
    ///
    /// The first status read happens one interval from now. Starting a new
    /// task supersedes whatever this poller was tracking: the previous run
    /// delivers nothing more and exits at its next tick.
    pub fn start(
        &self,
        task_id: impl Into<String>,
        observer: Arc<dyn TaskObserver<R::Snapshot>>,
    ) -> PollHandle<R::Snapshot> {
        let task_id = task_id.into();
        let generation = self.gate.advance();

        info!(
            "Polling task {} every {:?} (generation {})",
            task_id, self.interval, generation
        );

        let run = PollRun {
            source: Arc::clone(&self.source),
            task_id: task_id.clone(),
            generation,
            gate: Arc::clone(&self.gate),
            interval: self.interval,
            request_timeout: self.request_timeout,
            observer,
        };
        let join = tokio::spawn(run.run());

        PollHandle {
            task_id,
            token: CancelToken {
                generation,
                gate: Arc::clone(&self.gate),
                abort: join.abort_handle(),
            },
            join: Some(join),
            outcome: None,
        }
    }

    /// Stops the run identified by `token`; see [`CancelToken::cancel`]
    pub fn stop(&self, token: &CancelToken) {
        token.cancel();
    }
}

enum PollFailure {
    NotFound,
    Transient(WorkflowError),
}

struct PollRun<R: StatusSource> {
    source: Arc<R>,
    task_id: String,
    generation: u64,
    gate: Arc<GenerationGate>,
    interval: Duration,
    request_timeout: Option<Duration>,
    observer: Arc<dyn TaskObserver<R::Snapshot>>,
}

impl<R: StatusSource> PollRun<R> {
    async fn run(self) -> PollOutcome<R::Snapshot> {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if !self.gate.is_current(self.generation) {
                debug!("Polling of task {} was superseded", self.task_id);
                return PollOutcome::Cancelled;
            }

            debug!("Checking status of task {}", self.task_id);

            match self.fetch_once().await {
                Ok(snapshot) => {
                    let delivered = self.gate.deliver(self.generation, || {
                        self.observer.on_update(&self.task_id, &snapshot)
                    });
                    if !delivered {
                        debug!("Discarding stale status for task {}", self.task_id);
                        return PollOutcome::Cancelled;
                    }

                    if !snapshot.status().is_terminal() {
                        debug!(
                            "Task {} is {} ({:.1}%)",
                            self.task_id,
                            snapshot.status(),
                            snapshot.progress_percent()
                        );
                        continue;
                    }

                    if *snapshot.status() == TaskStatus::Completed {
                        info!("Task {} completed", self.task_id);
                        return PollOutcome::Completed(snapshot);
                    }

                    let message = snapshot
                        .error()
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or(GENERIC_FAILURE_MESSAGE)
                        .to_string();
                    warn!("Task {} failed: {}", self.task_id, message);
                    return PollOutcome::Failed { snapshot, message };
                }
                Err(PollFailure::NotFound) => {
                    let error = WorkflowError::TaskNotFound {
                        task_id: self.task_id.clone(),
                    };
                    let delivered = self.gate.deliver(self.generation, || {
                        self.observer.on_error(&self.task_id, &error)
                    });
                    if !delivered {
                        return PollOutcome::Cancelled;
                    }
                    warn!("{}", error);
                    return PollOutcome::NotFound;
                }
                Err(PollFailure::Transient(error)) => {
                    warn!("{}; retrying in {:?}", error, self.interval);
                }
            }
        }
    }

    async fn fetch_once(&self) -> Result<R::Snapshot, PollFailure> {
        let result = match self.request_timeout {
            Some(limit) => {
                match time::timeout(limit, self.source.fetch_status(&self.task_id)).await {
                    Ok(result) => result,
                    Err(_) => {
                        return Err(PollFailure::Transient(WorkflowError::TransientPoll {
                            task_id: self.task_id.clone(),
                            reason: format!("no response within {:?}", limit),
                        }));
                    }
                }
            }
            None => self.source.fetch_status(&self.task_id).await,
        };

        result.map_err(|e| {
            if e.is_not_found() {
                PollFailure::NotFound
            } else {
                PollFailure::Transient(WorkflowError::TransientPoll {
                    task_id: self.task_id.clone(),
                    reason: e.to_string(),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::domain::task::ScrapeTaskStatus;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_millis(3000);

    enum Step {
        Reply(ScrapeTaskStatus),
        Fail(ClientError),
        Slow(Duration, ScrapeTaskStatus),
    }

    #[derive(Default)]
    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        type Snapshot = ScrapeTaskStatus;

        async fn fetch_status(&self, _task_id: &str) -> Result<ScrapeTaskStatus, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Reply(snapshot)) => Ok(snapshot),
                Some(Step::Fail(error)) => Err(error),
                Some(Step::Slow(delay, snapshot)) => {
                    time::sleep(delay).await;
                    Ok(snapshot)
                }
                None => Ok(snapshot("PENDING", 0, 0)),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<(String, TaskStatus, f64)>>,
        errors: Mutex<Vec<WorkflowError>>,
    }

    impl Recorder {
        fn updates(&self) -> Vec<(String, TaskStatus, f64)> {
            self.updates.lock().unwrap().clone()
        }

        fn errors(&self) -> Vec<WorkflowError> {
            self.errors.lock().unwrap().clone()
        }
    }

    impl TaskObserver<ScrapeTaskStatus> for Recorder {
        fn on_update(&self, task_id: &str, snapshot: &ScrapeTaskStatus) {
            self.updates.lock().unwrap().push((
                task_id.to_string(),
                snapshot.status.clone(),
                snapshot.progress_percent(),
            ));
        }

        fn on_error(&self, _task_id: &str, error: &WorkflowError) {
            self.errors.lock().unwrap().push(error.clone());
        }
    }

    fn snapshot(status: &str, processed: u64, total: u64) -> ScrapeTaskStatus {
        ScrapeTaskStatus {
            status: TaskStatus::from(status),
            urls_processed: processed,
            total_urls: total,
            ..Default::default()
        }
    }

    fn statuses(recorder: &Recorder) -> Vec<TaskStatus> {
        recorder.updates().into_iter().map(|(_, s, _)| s).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_sequence_then_stops_polling() {
        let mut done = snapshot("COMPLETED", 10, 10);
        done.data = Some(serde_json::json!(["info@a.com"]));
        let source = ScriptedSource::new(vec![
            Step::Reply(snapshot("PENDING", 0, 10)),
            Step::Reply(snapshot("PROCESSING", 4, 10)),
            Step::Reply(done.clone()),
        ]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let mut handle = poller.start("task-1", recorder.clone());
        assert_eq!(handle.wait().await, PollOutcome::Completed(done));

        let progress: Vec<f64> = recorder.updates().into_iter().map(|(_, _, p)| p).collect();
        assert_eq!(progress, vec![0.0, 40.0, 100.0]);

        time::sleep(INTERVAL * 10).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(recorder.updates().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_waits_one_interval() {
        let source = ScriptedSource::new(vec![]);
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);
        let _handle = poller.start("task-1", Arc::new(Recorder::default()));

        time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(source.calls(), 0);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_surfaces_remote_message() {
        let mut failed = snapshot("FAILED", 1, 3);
        failed.error = Some("DNS resolution failed".to_string());
        let source = ScriptedSource::new(vec![Step::Reply(failed)]);
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let mut handle = poller.start("task-9", Arc::new(Recorder::default()));
        let err = handle.wait().await.into_result("task-9").unwrap_err();

        assert_eq!(
            err,
            WorkflowError::TaskFailed {
                task_id: "task-9".to_string(),
                message: "DNS resolution failed".to_string(),
            }
        );
        time::sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_without_message_uses_fallback() {
        let source = ScriptedSource::new(vec![Step::Reply(snapshot("FAILED", 0, 0))]);
        let poller = TaskPoller::new(source, INTERVAL);

        let mut handle = poller.start("task-9", Arc::new(Recorder::default()));
        match handle.wait().await {
            PollOutcome::Failed { message, .. } => assert_eq!(message, GENERIC_FAILURE_MESSAGE),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_terminal_and_names_task() {
        let source = ScriptedSource::new(vec![Step::Fail(ClientError::NotFound(
            "task expired-42".to_string(),
        ))]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let mut handle = poller.start("expired-42", recorder.clone());
        assert_eq!(handle.wait().await, PollOutcome::NotFound);

        let errors = recorder.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("expired-42"));

        time::sleep(INTERVAL * 5).await;
        assert_eq!(source.calls(), 1);
        assert!(recorder.updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_keep_polling() {
        let source = ScriptedSource::new(vec![
            Step::Reply(snapshot("SCRAPING", 1, 4)),
            Step::Fail(ClientError::ParseError("truncated body".to_string())),
            Step::Fail(ClientError::api_error(503, "unavailable")),
            Step::Reply(snapshot("COMPLETED", 4, 4)),
        ]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let mut handle = poller.start("task-1", recorder.clone());
        assert!(matches!(handle.wait().await, PollOutcome::Completed(_)));

        assert_eq!(source.calls(), 4);
        assert_eq!(
            statuses(&recorder),
            vec![TaskStatus::Scraping, TaskStatus::Completed]
        );
        assert!(recorder.errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_is_transient() {
        let source = ScriptedSource::new(vec![
            Step::Slow(Duration::from_secs(10), snapshot("PROCESSING", 1, 2)),
            Step::Reply(snapshot("COMPLETED", 2, 2)),
        ]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL)
            .with_request_timeout(Some(Duration::from_secs(1)));

        let mut handle = poller.start("task-1", recorder.clone());
        assert!(matches!(handle.wait().await, PollOutcome::Completed(_)));

        assert_eq!(source.calls(), 2);
        assert_eq!(statuses(&recorder), vec![TaskStatus::Completed]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_response() {
        let source = ScriptedSource::new(vec![Step::Slow(
            Duration::from_secs(5),
            snapshot("PROCESSING", 2, 4),
        )]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let mut handle = poller.start("task-1", recorder.clone());
        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(source.calls(), 1);

        poller.stop(&handle.token());
        handle.stop();

        time::sleep(INTERVAL * 5).await;
        assert!(recorder.updates().is_empty());
        assert_eq!(source.calls(), 1);
        assert_eq!(handle.wait().await, PollOutcome::Cancelled);
        assert!(!handle.token().is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_task_supersedes_previous() {
        let source = ScriptedSource::new(vec![
            Step::Slow(Duration::from_secs(5), snapshot("PROCESSING", 1, 2)),
            Step::Reply(snapshot("COMPLETED", 3, 3)),
        ]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let mut first = poller.start("task-a", recorder.clone());
        time::sleep(Duration::from_millis(3500)).await;
        let mut second = poller.start("task-b", recorder.clone());

        assert!(matches!(second.wait().await, PollOutcome::Completed(_)));
        assert_eq!(first.wait().await, PollOutcome::Cancelled);

        let tasks: Vec<String> = recorder.updates().into_iter().map(|(id, _, _)| id).collect();
        assert_eq!(tasks, vec!["task-b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopping_superseded_handle_keeps_newer_run() {
        let source = ScriptedSource::new(vec![
            Step::Reply(snapshot("PROCESSING", 1, 2)),
            Step::Reply(snapshot("COMPLETED", 2, 2)),
        ]);
        let recorder = Arc::new(Recorder::default());
        let poller = TaskPoller::new(Arc::clone(&source), INTERVAL);

        let first = poller.start("task-a", recorder.clone());
        let mut second = poller.start("task-b", recorder.clone());
        first.stop();
        first.stop();

        assert!(second.token().is_current());
        assert!(matches!(second.wait().await, PollOutcome::Completed(_)));
        assert_eq!(
            statuses(&recorder),
            vec![TaskStatus::Processing, TaskStatus::Completed]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_repeatable() {
        let source = ScriptedSource::new(vec![Step::Reply(snapshot("COMPLETED", 1, 1))]);
        let poller = TaskPoller::new(source, INTERVAL);

        let mut handle = poller.start("task-1", Arc::new(Recorder::default()));
        let first = handle.wait().await;
        assert!(handle.is_finished());
        assert_eq!(handle.wait().await, first);
    }

    #[test]
    fn test_gate_rejects_retired_generation() {
        let gate = GenerationGate::default();
        let generation = gate.advance();

        assert!(gate.deliver(generation, || {}));
        assert!(gate.retire(generation));
        assert!(!gate.retire(generation));

        let mut called = false;
        assert!(!gate.deliver(generation, || called = true));
        assert!(!called);
    }

    #[test]
    fn test_gate_advance_supersedes() {
        let gate = GenerationGate::default();
        let old = gate.advance();
        let new = gate.advance();

        assert!(!gate.is_current(old));
        assert!(!gate.retire(old));
        assert!(gate.is_current(new));
    }
}
