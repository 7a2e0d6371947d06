//! Quota gate wrapping every outbound API request.
//!
//! The API enforces an hourly request quota and answers with HTTP 429 /
//! `OVER_RATE_LIMIT` once it is spent. The gate never drops a request: on
//! quota exhaustion it blocks, re-checking every poll interval (20 minutes by
//! default) until a request succeeds, since the quota can reset before the
//! full rolling window has passed. An optional hourly budget paces requests
//! ahead of time so the limit is rarely hit at all.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};

use crate::cancel::CancelFlag;

/// Default interval between re-checks while the quota is exhausted.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20 * 60);

/// Span of the proactive budget.
const BUDGET_WINDOW: Duration = Duration::from_secs(3600);

/// Why a gated request did not produce a value.
#[derive(thiserror::Error, Debug)]
pub enum GateError {
    /// The cancel flag was raised while waiting for quota.
    #[error("cancelled while waiting for quota")]
    Cancelled,
    /// Any failure other than quota exhaustion, returned unchanged.
    #[error(transparent)]
    Api(#[from] regsgov_api::Error),
}

/// Quota state owned by one gate: exhausted or not, and how often to re-check.
#[derive(Debug, Clone, Copy)]
pub struct QuotaState {
    pub exhausted: bool,
    pub poll_interval: Duration,
}

/// Wait-and-retry gate for quota-limited requests.
pub struct QuotaGate {
    state: StdMutex<QuotaState>,
    budget: Option<HourlyBudget>,
    cancel: CancelFlag,
    tracker: RequestTracker,
}

impl QuotaGate {
    /// Create a gate that re-checks every `poll_interval` once the quota is spent.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            state: StdMutex::new(QuotaState {
                exhausted: false,
                poll_interval,
            }),
            budget: None,
            cancel: CancelFlag::new(),
            tracker: RequestTracker::default(),
        }
    }

    /// Pace requests to at most `max_requests` per rolling hour.
    pub fn with_hourly_budget(mut self, max_requests: u64) -> Self {
        self.budget = Some(HourlyBudget::new(max_requests));
        self
    }

    /// Abort quota waits when this flag is raised.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Snapshot of the quota state.
    pub fn state(&self) -> QuotaState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Access the request tracker for reporting.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    fn set_exhausted(&self, exhausted: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).exhausted = exhausted;
    }

    /// Run `operation` under the gate.
    ///
    /// - Waits for the proactive budget, if one is configured. Cancellation
    ///   ends the wait.
    /// - On `QuotaExceeded`: marks the quota exhausted, sleeps one poll
    ///   interval, and re-issues the request. Repeats without limit.
    /// - On success: clears the exhausted flag.
    /// - On any other error: returns it immediately.
    pub async fn run<F, Fut, T>(&self, label: &str, operation: F) -> Result<T, GateError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, regsgov_api::Error>>,
    {
        loop {
            if let Some(budget) = &self.budget {
                tokio::select! {
                    _ = budget.reserve() => {}
                    _ = self.cancel.cancelled() => return Err(GateError::Cancelled),
                }
            }

            match operation().await {
                Ok(val) => {
                    if self.state().exhausted {
                        tracing::info!("Quota restored, resuming with {}", label);
                    }
                    self.set_exhausted(false);
                    self.tracker.record(Outcome::Succeeded);
                    return Ok(val);
                }
                Err(regsgov_api::Error::QuotaExceeded) => {
                    self.tracker.record(Outcome::QuotaLimited);
                    self.set_exhausted(true);

                    let wait = self.state().poll_interval;
                    tracing::warn!(
                        "Quota exhausted during {}; checking again in {} min",
                        label,
                        wait.as_secs() / 60
                    );
                    tokio::select! {
                        _ = sleep(wait) => {}
                        _ = self.cancel.cancelled() => return Err(GateError::Cancelled),
                    }
                    self.tracker.record_wait(wait);
                }
                Err(e) => {
                    self.tracker.record(Outcome::Failed);
                    return Err(e.into());
                }
            }
        }
    }
}

impl Default for QuotaGate {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

/// Proactive hourly budget.
///
/// Each request reserves a start slot. Once `limit` slots fall inside one
/// hour, the next slot opens an hour after the oldest of them, so waiting
/// callers start in reservation order.
struct HourlyBudget {
    limit: usize,
    /// Start slots of the latest `limit` reservations, oldest first.
    slots: StdMutex<VecDeque<Instant>>,
}

impl HourlyBudget {
    fn new(limit: u64) -> Self {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX).max(1);
        Self {
            limit,
            slots: StdMutex::new(VecDeque::new()),
        }
    }

    fn next_slot(&self) -> Instant {
        let now = Instant::now();
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = match slots.front() {
            Some(&oldest) if slots.len() >= self.limit => (oldest + BUDGET_WINDOW).max(now),
            _ => now,
        };
        slots.push_back(slot);
        if slots.len() > self.limit {
            slots.pop_front();
        }
        slot
    }

    async fn reserve(&self) {
        let slot = self.next_slot();
        let now = Instant::now();
        if slot > now {
            tracing::debug!(
                "Hourly budget spent, next request in {:.0}s",
                (slot - now).as_secs_f64()
            );
            sleep_until(slot).await;
        }
    }

    fn remaining(&self) -> u64 {
        let now = Instant::now();
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let live = slots.iter().filter(|&&slot| slot + BUDGET_WINDOW > now).count();
        self.limit.saturating_sub(live) as u64
    }
}

impl QuotaGate {
    /// Requests still allowed this hour, or `None` without a budget.
    pub fn remaining_budget(&self) -> Option<u64> {
        self.budget.as_ref().map(HourlyBudget::remaining)
    }
}

/// How one gated attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    QuotaLimited,
    Failed,
}

impl Outcome {
    const ALL: [Outcome; 3] = [Outcome::Succeeded, Outcome::QuotaLimited, Outcome::Failed];

    fn slot(self) -> usize {
        match self {
            Outcome::Succeeded => 0,
            Outcome::QuotaLimited => 1,
            Outcome::Failed => 2,
        }
    }
}

/// Attempt counts per [`Outcome`] and total quota wait, for the whole run.
#[derive(Default)]
pub struct RequestTracker {
    attempts: [AtomicU64; 3],
    waited_ms: AtomicU64,
}

impl RequestTracker {
    pub fn record(&self, outcome: Outcome) {
        self.attempts[outcome.slot()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wait(&self, waited: Duration) {
        let ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
        self.waited_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.attempts[outcome.slot()].load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> TrackerSummary {
        TrackerSummary {
            requests_made: Outcome::ALL.iter().map(|&o| self.count(o)).sum(),
            requests_succeeded: self.count(Outcome::Succeeded),
            requests_quota_limited: self.count(Outcome::QuotaLimited),
            requests_failed: self.count(Outcome::Failed),
            total_wait_secs: self.waited_ms.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Counter values at one point in time, for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct TrackerSummary {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_quota_limited: u64,
    pub requests_failed: u64,
    pub total_wait_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let gate = QuotaGate::new(Duration::from_secs(60));
        let result = gate
            .run("test", || async { Ok::<_, regsgov_api::Error>(42) })
            .await;
        assert_eq!(result.unwrap(), 42);

        let summary = gate.tracker().summary();
        assert_eq!(summary.requests_made, 1);
        assert_eq!(summary.requests_succeeded, 1);
        assert!(!gate.state().exhausted);
    }

    #[tokio::test]
    async fn quota_exceeded_waits_one_poll_interval_then_succeeds() {
        tokio::time::pause();

        let poll = Duration::from_secs(20 * 60);
        let gate = QuotaGate::new(poll);
        let attempt = Arc::new(AtomicU64::new(0));
        let attempt_clone = Arc::clone(&attempt);

        let started = Instant::now();
        let result = gate
            .run("comments page 1", move || {
                let attempt = Arc::clone(&attempt_clone);
                async move {
                    if attempt.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(regsgov_api::Error::QuotaExceeded)
                    } else {
                        Ok("page")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "page");
        let elapsed = started.elapsed();
        assert!(elapsed >= poll && elapsed < poll + Duration::from_secs(1));
        assert_eq!(attempt.load(Ordering::SeqCst), 2);
        assert!(!gate.state().exhausted);

        let summary = gate.tracker().summary();
        assert_eq!(summary.requests_quota_limited, 1);
        assert_eq!(summary.requests_succeeded, 1);
        assert!((summary.total_wait_secs - 1200.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn keeps_polling_until_quota_returns() {
        tokio::time::pause();

        let poll = Duration::from_secs(60);
        let gate = QuotaGate::new(poll);
        let attempt = Arc::new(AtomicU64::new(0));
        let attempt_clone = Arc::clone(&attempt);

        let started = Instant::now();
        let result = gate
            .run("detail", move || {
                let attempt = Arc::clone(&attempt_clone);
                async move {
                    if attempt.fetch_add(1, Ordering::SeqCst) < 3 {
                        Err(regsgov_api::Error::QuotaExceeded)
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        let elapsed = started.elapsed();
        assert!(elapsed >= poll * 3 && elapsed < poll * 3 + Duration::from_secs(1));
        assert_eq!(gate.tracker().summary().requests_quota_limited, 3);
    }

    #[tokio::test]
    async fn exhausted_flag_is_visible_while_waiting() {
        tokio::time::pause();

        let gate = Arc::new(QuotaGate::new(Duration::from_secs(600)));
        let attempt = Arc::new(AtomicU64::new(0));

        let gate_clone = Arc::clone(&gate);
        let handle = tokio::spawn(async move {
            gate_clone
                .run("page", move || {
                    let attempt = Arc::clone(&attempt);
                    async move {
                        if attempt.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err(regsgov_api::Error::QuotaExceeded)
                        } else {
                            Ok(())
                        }
                    }
                })
                .await
        });

        tokio::task::yield_now().await;
        assert!(gate.state().exhausted);

        tokio::time::advance(Duration::from_secs(601)).await;
        handle.await.unwrap().unwrap();
        assert!(!gate.state().exhausted);
    }

    #[tokio::test]
    async fn other_errors_are_returned_unchanged() {
        let gate = QuotaGate::new(Duration::from_secs(60));
        let result = gate
            .run("page", || async {
                Err::<i32, _>(regsgov_api::Error::Unauthorized { status: 403 })
            })
            .await;

        assert!(matches!(
            result,
            Err(GateError::Api(regsgov_api::Error::Unauthorized { status: 403 }))
        ));
        let summary = gate.tracker().summary();
        assert_eq!(summary.requests_made, 1);
        assert_eq!(summary.requests_failed, 1);
    }

    #[tokio::test]
    async fn cancel_interrupts_quota_wait() {
        tokio::time::pause();

        let cancel = CancelFlag::new();
        let gate = Arc::new(QuotaGate::new(Duration::from_secs(1200)).with_cancel(cancel.clone()));

        let gate_clone = Arc::clone(&gate);
        let handle = tokio::spawn(async move {
            gate_clone
                .run("page", || async { Err::<(), _>(regsgov_api::Error::QuotaExceeded) })
                .await
        });

        tokio::task::yield_now().await;
        cancel.cancel();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(GateError::Cancelled)));
    }

    #[tokio::test]
    async fn budget_paces_requests() {
        tokio::time::pause();

        let gate = Arc::new(QuotaGate::new(Duration::from_secs(60)).with_hourly_budget(2));
        for _ in 0..2 {
            gate.run("page", || async { Ok::<_, regsgov_api::Error>(()) })
                .await
                .unwrap();
        }
        assert_eq!(gate.remaining_budget(), Some(0));

        let gate_clone = Arc::clone(&gate);
        let handle = tokio::spawn(async move {
            gate_clone
                .run("page", || async { Ok::<_, regsgov_api::Error>(()) })
                .await
        });

        tokio::time::advance(Duration::from_secs(3599)).await;
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        tokio::time::advance(Duration::from_secs(2)).await;
        handle.await.unwrap().unwrap();
    }

    #[test]
    fn no_budget_reports_none() {
        let gate = QuotaGate::default();
        assert_eq!(gate.remaining_budget(), None);
        assert_eq!(gate.state().poll_interval, DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn cancel_interrupts_budget_wait() {
        tokio::time::pause();

        let cancel = CancelFlag::new();
        let gate = Arc::new(
            QuotaGate::new(Duration::from_secs(60))
                .with_hourly_budget(1)
                .with_cancel(cancel.clone()),
        );
        gate.run("page", || async { Ok::<_, regsgov_api::Error>(()) })
            .await
            .unwrap();

        let gate_clone = Arc::clone(&gate);
        let handle = tokio::spawn(async move {
            gate_clone
                .run("page", || async { Ok::<_, regsgov_api::Error>(()) })
                .await
        });

        tokio::task::yield_now().await;
        cancel.cancel();
        assert!(matches!(handle.await.unwrap(), Err(GateError::Cancelled)));
        assert_eq!(gate.tracker().summary().requests_made, 1);
    }

    #[test]
    fn tracker_counts_each_outcome() {
        let tracker = RequestTracker::default();

        tracker.record(Outcome::Succeeded);
        tracker.record(Outcome::Succeeded);
        tracker.record(Outcome::QuotaLimited);
        tracker.record(Outcome::Failed);
        tracker.record_wait(Duration::from_secs(60));

        assert_eq!(tracker.count(Outcome::Succeeded), 2);
        let summary = tracker.summary();
        assert_eq!(summary.requests_made, 4);
        assert_eq!(summary.requests_succeeded, 2);
        assert_eq!(summary.requests_quota_limited, 1);
        assert_eq!(summary.requests_failed, 1);
        assert!((summary.total_wait_secs - 60.0).abs() < 0.01);
    }
}
