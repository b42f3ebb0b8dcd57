//! Dispatcher implementation

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::{DispatchConfig, RetryPolicy};
use super::limiter::RateLimiter;
use super::queue::{DispatchQueue, DispatchReport, DispatchStats, QueuedItem};
use crate::domain::{ExternalId, WorkItem};
use crate::submit::{SubmitError, Submitter};

/// Observable dispatcher phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    /// Items queued, submissions in flight, or more items may still arrive
    Draining,
    /// Nothing queued, nothing in flight, no intake
    Terminated,
}

/// Result of one submission, sent back to the dispatch loop
struct Outcome {
    queued: QueuedItem,
    result: Result<ExternalId, SubmitError>,
}

/// What woke an idle dispatch loop
enum Wake {
    Outcome(Outcome),
    Intake(Option<WorkItem>),
}

/// State owned by the dispatch loop; spawned submissions never touch it
#[derive(Debug, Default)]
pub struct DispatchState {
    queue: DispatchQueue,
    pending: usize,
    intake_open: bool,
    accepted: Vec<ExternalId>,
    abandoned: Vec<QueuedItem>,
    stats: DispatchStats,
}

impl DispatchState {
    fn new(queue: DispatchQueue, intake_open: bool) -> Self {
        let mut state = Self {
            queue,
            intake_open,
            ..Default::default()
        };
        state.stats.peak_queue_depth = state.queue.len();
        state
    }

    pub fn phase(&self) -> DispatchPhase {
        if self.queue.is_empty() && self.pending == 0 && !self.intake_open {
            DispatchPhase::Terminated
        } else {
            DispatchPhase::Draining
        }
    }

    /// Submissions currently in flight
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    fn enqueue(&mut self, item: WorkItem) {
        self.queue.enqueue(item);
        self.stats.peak_queue_depth = self.stats.peak_queue_depth.max(self.queue.len());
    }

    fn record_issue(&mut self) {
        self.pending += 1;
        self.stats.total_submitted += 1;
        self.stats.peak_in_flight = self.stats.peak_in_flight.max(self.pending);
    }

    fn apply(&mut self, outcome: Outcome, retry: &RetryPolicy) {
        self.pending = self.pending.saturating_sub(1);
        let Outcome { queued, result } = outcome;

        match result {
            Ok(id) => {
                info!(title = %queued.item.title(), %id, attempts = queued.attempts, "Submission accepted");
                self.stats.total_accepted += 1;
                self.accepted.push(id);
            }
            Err(e) => {
                if e.is_timeout() {
                    self.stats.total_timed_out += 1;
                } else {
                    self.stats.total_rejected += 1;
                }
                warn!(title = %queued.item.title(), attempts = queued.attempts, error = %e, "Submission failed");

                if retry.allows_retry(queued.attempts) {
                    self.stats.total_retried += 1;
                    self.queue.requeue(queued);
                    self.stats.peak_queue_depth = self.stats.peak_queue_depth.max(self.queue.len());
                    debug!(queue_depth = self.queue.len(), "DispatchState::apply: re-enqueued");
                } else {
                    error!(
                        title = %queued.item.title(),
                        attempts = queued.attempts,
                        "Retry limit reached, abandoning item"
                    );
                    self.stats.total_abandoned += 1;
                    self.abandoned.push(queued);
                }
            }
        }
    }

    fn into_report(self) -> DispatchReport {
        DispatchReport {
            accepted: self.accepted,
            abandoned: self.abandoned,
            stats: self.stats,
        }
    }
}

/// The Dispatcher drains a queue of work items into a [`Submitter`] under a
/// global rate limit, re-enqueuing failures until they are accepted or the
/// retry policy gives up.
pub struct Dispatcher {
    config: DispatchConfig,
    submitter: Arc<dyn Submitter>,
}

impl Dispatcher {
    /// Create a new dispatcher with the given configuration
    pub fn new(config: DispatchConfig, submitter: Arc<dyn Submitter>) -> Self {
        debug!(?config, "Dispatcher::new: called");
        Self { config, submitter }
    }

    /// Dispatch everything in `queue` and return once all of it is settled
    pub async fn run(&self, queue: DispatchQueue) -> DispatchReport {
        self.drive(queue, None).await
    }

    /// Like [`run`](Self::run), but also accepts items from `intake` while
    /// running; does not finish until the intake channel is closed
    pub async fn run_with_intake(&self, queue: DispatchQueue, intake: mpsc::Receiver<WorkItem>) -> DispatchReport {
        self.drive(queue, Some(intake)).await
    }

    async fn drive(&self, queue: DispatchQueue, mut intake: Option<mpsc::Receiver<WorkItem>>) -> DispatchReport {
        info!(
            queued = queue.len(),
            tokens = self.config.tokens_per_interval,
            interval_ms = self.config.interval_ms,
            "Dispatch starting"
        );
        let mut limiter = RateLimiter::new(self.config.tokens_per_interval, self.config.interval());
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();
        let mut state = DispatchState::new(queue, intake.is_some());

        loop {
            // Settle everything that already finished
            while let Ok(outcome) = outcome_rx.try_recv() {
                state.apply(outcome, &self.config.retry);
            }
            drain_intake(&mut intake, &mut state);

            if state.phase() == DispatchPhase::Terminated {
                break;
            }

            if state.queue.is_empty() {
                debug!(pending = state.pending, "Dispatcher::drive: queue empty, waiting");
                let wake = tokio::select! {
                    Some(outcome) = outcome_rx.recv() => Wake::Outcome(outcome),
                    item = next_intake(&mut intake) => Wake::Intake(item),
                };
                match wake {
                    Wake::Outcome(outcome) => state.apply(outcome, &self.config.retry),
                    Wake::Intake(Some(item)) => state.enqueue(item),
                    Wake::Intake(None) => {
                        debug!("Dispatcher::drive: intake closed");
                        intake = None;
                        state.intake_open = false;
                    }
                }
                continue;
            }

            limiter.acquire().await;

            // Only this loop dequeues, so the queue cannot have emptied
            let Ok(queued) = state.queue.dequeue() else {
                continue;
            };
            self.issue(queued, &mut state, &outcome_tx);
        }

        let report = state.into_report();
        info!(
            accepted = report.stats.total_accepted,
            abandoned = report.stats.total_abandoned,
            submitted = report.stats.total_submitted,
            "Dispatch finished"
        );
        report
    }

    /// Spawn one submission; its outcome comes back through `outcome_tx`
    fn issue(&self, mut queued: QueuedItem, state: &mut DispatchState, outcome_tx: &mpsc::UnboundedSender<Outcome>) {
        queued.attempts += 1;
        state.record_issue();
        debug!(
            title = %queued.item.title(),
            attempt = queued.attempts,
            pending = state.pending,
            "Dispatcher::issue: submitting"
        );

        let submitter = Arc::clone(&self.submitter);
        let timeout = self.config.submit_timeout();
        let retry = self.config.retry.clone();
        let tx = outcome_tx.clone();

        tokio::spawn(async move {
            // Submit on its own task so a panicking submitter still yields an outcome
            let item = queued.item.clone();
            let mut handle = tokio::spawn(async move { submitter.submit(&item).await });
            let result = match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    warn!(title = %queued.item.title(), error = %e, "Submission task failed");
                    Err(SubmitError::rejected(format!("submission task failed: {}", e)))
                }
                Err(_) => {
                    handle.abort();
                    Err(SubmitError::Timeout(timeout))
                }
            };

            if result.is_err() && retry.allows_retry(queued.attempts) {
                let delay = retry.backoff(queued.attempts);
                if !delay.is_zero() {
                    debug!(title = %queued.item.title(), ?delay, "Dispatcher::issue: backing off");
                    tokio::time::sleep(delay).await;
                }
            }

            // The loop holds a sender until it returns, so this only fails at shutdown
            let _ = tx.send(Outcome { queued, result });
        });
    }
}

fn drain_intake(intake: &mut Option<mpsc::Receiver<WorkItem>>, state: &mut DispatchState) {
    let Some(rx) = intake.as_mut() else {
        return;
    };
    loop {
        match rx.try_recv() {
            Ok(item) => state.enqueue(item),
            Err(mpsc::error::TryRecvError::Empty) => return,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                debug!("drain_intake: intake closed");
                *intake = None;
                state.intake_open = false;
                return;
            }
        }
    }
}

async fn next_intake(intake: &mut Option<mpsc::Receiver<WorkItem>>) -> Option<WorkItem> {
    match intake {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssignmentOccurrence, WorkKind};
    use crate::submit::client::mock::{MockSubmitter, Step};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::time::Duration;

    fn item(n: usize) -> WorkItem {
        WorkItem::Assignment(AssignmentOccurrence {
            title: format!("Homework {}", n),
            kind: WorkKind::Homework,
            due: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(23, 59, 0).unwrap(),
            parent: ExternalId::new("course"),
            mandatory: true,
        })
    }

    fn queue_of(n: usize) -> DispatchQueue {
        (1..=n).map(item).collect()
    }

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            tokens_per_interval: 3,
            interval_ms: 1000,
            submit_timeout_ms: 5000,
            retry: RetryPolicy::default(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_accepted_terminates_after_n_submissions() {
        let submitter = Arc::new(MockSubmitter::accepting());
        let dispatcher = Dispatcher::new(fast_config(), submitter.clone());

        let report = dispatcher.run(queue_of(7)).await;

        assert_eq!(submitter.call_count(), 7);
        assert_eq!(report.accepted.len(), 7);
        assert!(report.is_complete());
        assert_eq!(report.stats.total_submitted, 7);
        assert_eq!(report.stats.total_retried, 0);
        assert_eq!(report.stats.peak_queue_depth, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue_terminates_immediately() {
        let submitter = Arc::new(MockSubmitter::accepting());
        let dispatcher = Dispatcher::new(fast_config(), submitter.clone());

        let report = dispatcher.run(DispatchQueue::new()).await;

        assert_eq!(submitter.call_count(), 0);
        assert!(report.accepted.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_once_then_succeed_uses_two_calls_per_item() {
        let n = 5;
        let scripts = (1..=n).map(|i| (format!("Homework {}", i), vec![Step::Reject])).collect();
        let submitter = Arc::new(MockSubmitter::scripted(scripts));
        let dispatcher = Dispatcher::new(fast_config(), submitter.clone());

        let report = dispatcher.run(queue_of(n)).await;

        assert_eq!(submitter.call_count(), 2 * n);
        for i in 1..=n {
            assert_eq!(submitter.calls_for(&format!("Homework {}", i)), 2);
        }
        assert_eq!(report.accepted.len(), n);
        assert_eq!(report.stats.total_rejected, n as u64);
        assert_eq!(report.stats.total_retried, n as u64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_cap_abandons_item() {
        let mut scripts = HashMap::new();
        scripts.insert("Homework 2".to_string(), vec![Step::Reject; 10]);
        let submitter = Arc::new(MockSubmitter::scripted(scripts));

        let mut config = fast_config();
        config.retry.max_attempts = Some(3);
        let dispatcher = Dispatcher::new(config, submitter.clone());

        let report = dispatcher.run(queue_of(3)).await;

        assert_eq!(submitter.calls_for("Homework 2"), 3);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.abandoned.len(), 1);
        assert_eq!(report.abandoned[0].item.title(), "Homework 2");
        assert_eq!(report.abandoned[0].attempts, 3);
        assert!(!report.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_submission_times_out_and_retries() {
        let mut scripts = HashMap::new();
        scripts.insert("Homework 1".to_string(), vec![Step::Hang]);
        let submitter = Arc::new(MockSubmitter::scripted(scripts));

        let mut config = fast_config();
        config.submit_timeout_ms = 2000;
        let dispatcher = Dispatcher::new(config, submitter.clone());

        let report = dispatcher.run(queue_of(2)).await;

        assert_eq!(submitter.calls_for("Homework 1"), 2);
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.stats.total_timed_out, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_in_flight_before_terminating() {
        let mut scripts = HashMap::new();
        scripts.insert("Homework 1".to_string(), vec![Step::Delay(Duration::from_secs(10))]);
        let submitter = Arc::new(MockSubmitter::scripted(scripts));
        let dispatcher = Dispatcher::new(fast_config(), submitter.clone());

        let started = tokio::time::Instant::now();
        let report = dispatcher.run(queue_of(1)).await;

        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(report.accepted.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_retry() {
        let mut scripts = HashMap::new();
        scripts.insert("Homework 1".to_string(), vec![Step::Reject, Step::Reject]);
        let submitter = Arc::new(MockSubmitter::scripted(scripts));

        let mut config = fast_config();
        config.retry.backoff_base_ms = 4000;
        let dispatcher = Dispatcher::new(config, submitter.clone());

        let started = tokio::time::Instant::now();
        let report = dispatcher.run(queue_of(1)).await;

        // 4s after the first failure, 8s after the second
        assert!(started.elapsed() >= Duration::from_secs(12));
        assert_eq!(submitter.calls_for("Homework 1"), 3);
        assert_eq!(report.accepted.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_submitter_counts_as_rejection() {
        let mut scripts = HashMap::new();
        scripts.insert("Homework 2".to_string(), vec![Step::Panic]);
        let submitter = Arc::new(MockSubmitter::scripted(scripts));
        let dispatcher = Dispatcher::new(fast_config(), submitter.clone());

        let report = dispatcher.run(queue_of(3)).await;

        assert_eq!(submitter.calls_for("Homework 2"), 2);
        assert_eq!(report.accepted.len(), 3);
        assert_eq!(report.stats.total_rejected, 1);
        assert_eq!(report.stats.total_retried, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_intake_feeds_running_dispatcher() {
        let submitter = Arc::new(MockSubmitter::accepting());
        let dispatcher = Dispatcher::new(fast_config(), submitter.clone());
        let (tx, rx) = mpsc::channel(16);

        let feeder = tokio::spawn(async move {
            for i in 10..14 {
                tokio::time::sleep(Duration::from_millis(300)).await;
                tx.send(item(i)).await.unwrap();
            }
        });

        let report = dispatcher.run_with_intake(queue_of(2), rx).await;
        feeder.await.unwrap();

        assert_eq!(submitter.call_count(), 6);
        assert_eq!(report.accepted.len(), 6);
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = DispatchState::new(queue_of(1), false);
        assert_eq!(state.phase(), DispatchPhase::Draining);

        let queued = state.queue.dequeue().unwrap();
        state.record_issue();
        assert_eq!(state.pending(), 1);
        assert_eq!(state.phase(), DispatchPhase::Draining);

        state.apply(
            Outcome {
                queued,
                result: Err(SubmitError::rejected("nope")),
            },
            &RetryPolicy::default(),
        );
        // Failure re-enqueues, so still draining
        assert_eq!(state.pending(), 0);
        assert_eq!(state.queue_depth(), 1);
        assert_eq!(state.phase(), DispatchPhase::Draining);

        let queued = state.queue.dequeue().unwrap();
        state.record_issue();
        state.apply(
            Outcome {
                queued,
                result: Ok(ExternalId::new("page")),
            },
            &RetryPolicy::default(),
        );
        assert_eq!(state.phase(), DispatchPhase::Terminated);
    }

    #[test]
    fn test_open_intake_keeps_draining() {
        let state = DispatchState::new(DispatchQueue::new(), true);
        assert_eq!(state.phase(), DispatchPhase::Draining);
    }
}
