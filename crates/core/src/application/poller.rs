// Polling Scheduler
//
// The one stateful, long-lived object of the monitor. Owns the poll
// loop: fetch -> reconcile -> publish -> sleep the interval computed
// from the post-reconciliation active set. Rescheduling after each
// fetch (instead of a fixed-rate timer) keeps the interval adaptive
// and gives natural backpressure against a slow remote.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::constants::{DEFAULT_ACTIVE_FETCH_LIMIT, DEFAULT_COMPLETED_FETCH_LIMIT};
use super::events::{EventBus, EventReceiver};
use super::interval::compute_interval;
use super::reconcile::ReconciliationEngine;
use super::shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
use super::stats::{aggregate, JobStatistics};
use super::store::JobStateStore;
use super::window::resolve_week;
use crate::domain::{JobRecord, JobStatus, WeekBoundary};
use crate::error::Result;
use crate::port::{JobSource, StatsSnapshot, TimeProvider};

/// Fetch limits for one tick
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub active_fetch_limit: usize,
    pub completed_fetch_limit: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            active_fetch_limit: DEFAULT_ACTIVE_FETCH_LIMIT,
            completed_fetch_limit: DEFAULT_COMPLETED_FETCH_LIMIT,
        }
    }
}

/// Shared state of the poll loop
struct PollerInner {
    config: PollerConfig,
    source: Arc<dyn JobSource>,
    time: Arc<dyn TimeProvider>,
    store: Mutex<JobStateStore>,
    engine: ReconciliationEngine,
    events: EventBus,
}

/// Scheduler lifecycle: STOPPED <-> RUNNING
struct Lifecycle {
    shutdown: Option<ShutdownSender>,
    handle: Option<JoinHandle<()>>,
}

/// Adaptive polling scheduler with an explicit lifecycle.
///
/// `start()` and `stop()` are idempotent and are driven by the session
/// collaborator (login starts polling, logout stops it); the scheduler
/// itself holds no authentication logic.
pub struct PollingScheduler {
    inner: Arc<PollerInner>,
    lifecycle: Mutex<Lifecycle>,
}

impl PollingScheduler {
    pub fn new(
        source: Arc<dyn JobSource>,
        time: Arc<dyn TimeProvider>,
        config: PollerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                config,
                source,
                time,
                store: Mutex::new(JobStateStore::new()),
                engine: ReconciliationEngine::new(),
                events: EventBus::default(),
            }),
            lifecycle: Mutex::new(Lifecycle {
                shutdown: None,
                handle: None,
            }),
        }
    }

    /// Subscribe to change events produced by reconciliation
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.lock().shutdown.is_some()
    }

    /// Transition to RUNNING: immediate first tick, then recursive
    /// self-scheduling. No-op when already running (no duplicate
    /// timers).
    pub fn start(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.shutdown.is_some() {
            debug!("Poller already running, start ignored");
            return;
        }

        let (sender, token) = shutdown_channel();
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            run_loop(inner, token).await;
        });

        lifecycle.shutdown = Some(sender);
        lifecycle.handle = Some(handle);
        info!("Job polling started");
    }

    /// Transition to STOPPED: no new ticks are scheduled. An in-flight
    /// fetch is allowed to complete but its result is discarded when
    /// the loop observes the signal. No-op when already stopped.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        let Some(sender) = lifecycle.shutdown.take() else {
            debug!("Poller already stopped, stop ignored");
            return;
        };
        sender.shutdown();
        // The loop observes the signal and drains on its own; the
        // detached handle needs no await
        lifecycle.handle.take();
        info!("Job polling stopped");
    }

    // ------------------------------------------------------------------
    // Read side (store snapshots; no I/O)
    // ------------------------------------------------------------------

    /// Counts aggregated from the current store snapshot
    pub fn statistics(&self) -> JobStatistics {
        aggregate(&self.inner.store.lock().all())
    }

    /// Active jobs, most-recently-started first
    pub fn active_jobs(&self, limit: usize) -> Vec<JobRecord> {
        self.inner.store.lock().get_active(limit)
    }

    pub fn jobs_by_status(&self, status: JobStatus, limit: usize) -> Vec<JobRecord> {
        self.inner.store.lock().get_by_status(status, limit)
    }

    // ------------------------------------------------------------------
    // Remote actions (errors propagate to the caller, never into the
    // poll loop)
    // ------------------------------------------------------------------

    /// Resolve the requested week and fetch its job history
    /// (offset 0 = this week, -1 = last week)
    pub async fn jobs_in_week(&self, week_offset: i32) -> Result<(WeekBoundary, Vec<JobRecord>)> {
        let week = resolve_week(self.inner.time.now_utc(), week_offset);
        let jobs = self
            .inner
            .source
            .fetch_jobs_in_range(week.start, week.end)
            .await?;
        Ok((week, jobs))
    }

    /// Server-side counters, fetched on demand
    pub async fn remote_stats(&self) -> Result<StatsSnapshot> {
        self.inner.source.fetch_stats().await
    }

    /// Request cancellation of a job. Failures surface to the caller
    /// of this action; the polling loop is unaffected either way.
    pub async fn cancel(&self, job_id: &str) -> Result<()> {
        self.inner.source.cancel_job(&job_id.to_string()).await
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        if let Some(sender) = self.lifecycle.lock().shutdown.take() {
            sender.shutdown();
        }
    }
}

/// The poll loop: one tick, then sleep the adaptive interval, until
/// shutdown. Only one fetch is ever in flight because this single task
/// owns fetch, reconcile and sleep sequentially.
async fn run_loop(inner: Arc<PollerInner>, mut shutdown: ShutdownToken) {
    loop {
        if shutdown.is_shutdown() {
            break;
        }

        let delay = tick(&inner, &shutdown).await;

        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.wait() => break,
        }
    }
    debug!("Poll loop terminated");
}

/// One poll-and-reconcile cycle; returns the delay until the next tick
async fn tick(inner: &PollerInner, shutdown: &ShutdownToken) -> std::time::Duration {
    let fetched = fetch_snapshot(inner).await;

    // stop() during the fetch: drop the result on arrival
    if shutdown.is_shutdown() {
        return std::time::Duration::ZERO;
    }

    match fetched {
        Ok(snapshot) => {
            let events = {
                let mut store = inner.store.lock();
                inner.engine.apply(&mut store, &snapshot)
            };
            for event in events {
                inner.events.publish(event);
            }
        }
        Err(err) => {
            // Stale data self-heals on the next successful tick
            warn!(error = %err, "Job fetch failed, store left unchanged");
        }
    }

    // The next delay comes from the post-reconciliation active set
    let active = inner
        .store
        .lock()
        .get_active(inner.config.active_fetch_limit);
    compute_interval(&active)
}

/// Fetch active plus recently finished jobs as one snapshot, active
/// first, so terminal transitions are observed rather than inferred
/// from absence
async fn fetch_snapshot(inner: &PollerInner) -> Result<Vec<JobRecord>> {
    let mut snapshot = inner
        .source
        .fetch_active_jobs(inner.config.active_fetch_limit)
        .await?;
    let completed = inner
        .source
        .fetch_completed_jobs(inner.config.completed_fetch_limit)
        .await?;
    snapshot.extend(completed);
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobKind;
    use crate::port::job_source::mocks::MockJobSource;
    use crate::port::time_provider::mocks::MockTimeProvider;
    use std::time::Duration;

    fn running(id: &str, progress: u8) -> JobRecord {
        JobRecord::new(id, JobKind::DocumentAnalysis, JobStatus::Running)
            .with_progress(progress)
            .with_started_at(1_000)
    }

    fn scheduler_with(source: Arc<MockJobSource>) -> PollingScheduler {
        PollingScheduler::new(
            source,
            Arc::new(MockTimeProvider::new(1_000_000)),
            PollerConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_spawns_one_loop() {
        let source = MockJobSource::new_shared();
        source.push_active_snapshot(vec![running("j1", 95)]);
        let scheduler = scheduler_with(source.clone());

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        // Interval is 1000ms at >=90% progress; over ~3.5s a single
        // loop performs 4 ticks of 2 fetches each
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(source.max_in_flight(), 1);
        assert!(
            source.fetch_count() <= 10,
            "duplicate loop detected: {} fetches",
            source.fetch_count()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_twice_is_noop() {
        let source = MockJobSource::new_shared();
        let scheduler = scheduler_with(source);

        scheduler.start();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        // Restart after stop works
        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_result() {
        let source = MockJobSource::new_shared();
        source.set_fetch_delay(Duration::from_millis(500));
        source.push_active_snapshot(vec![running("j1", 50)]);
        let scheduler = scheduler_with(source.clone());
        let mut events = scheduler.subscribe();

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        // First fetch still in flight
        scheduler.stop();
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        assert!(scheduler.active_jobs(10).is_empty(), "result must be discarded");
        assert!(matches!(
            events.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_overlapping_fetch_with_slow_source() {
        let source = MockJobSource::new_shared();
        source.set_fetch_delay(Duration::from_millis(2_500));
        source.push_active_snapshot(vec![running("j1", 95)]);
        let scheduler = scheduler_with(source.clone());

        scheduler.start();
        // Interval (1000ms) is far below the fetch latency; a slow
        // remote must delay ticks, not stack them
        tokio::time::sleep(Duration::from_secs(15)).await;
        scheduler.stop();

        assert_eq!(source.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_keeps_store_and_loop() {
        let source = MockJobSource::new_shared();
        source.push_active_snapshot(vec![running("j1", 40)]);
        let scheduler = scheduler_with(source.clone());

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(scheduler.active_jobs(10).len(), 1);

        source.set_fail_fetches(true);
        tokio::time::sleep(Duration::from_secs(10)).await;
        // Failed ticks leave the last good state in place
        assert_eq!(scheduler.active_jobs(10).len(), 1);

        // Next successful tick self-heals
        source.set_fail_fetches(false);
        source.push_active_snapshot(vec![running("j1", 80)]);
        tokio::time::sleep(Duration::from_secs(5)).await;
        scheduler.stop();

        assert_eq!(scheduler.active_jobs(10)[0].progress, 80);
    }

    #[tokio::test]
    async fn test_cancel_propagates_source_error() {
        let source = MockJobSource::new_shared();
        source.set_fail_cancel(true);
        let scheduler = scheduler_with(source.clone());

        assert!(scheduler.cancel("j1").await.is_err());

        source.set_fail_cancel(false);
        scheduler.cancel("j1").await.unwrap();
        assert_eq!(source.cancelled_jobs(), vec!["j1".to_string()]);
    }

    #[tokio::test]
    async fn test_jobs_in_week_resolves_monday_window() {
        let source = MockJobSource::new_shared();
        // Wednesday 2025-04-09 12:00 UTC
        let wednesday_ms = 1_744_200_000_000;
        let scheduler = PollingScheduler::new(
            source.clone(),
            Arc::new(MockTimeProvider::new(wednesday_ms)),
            PollerConfig::default(),
        );

        let in_week = running("in", 10).with_started_at(wednesday_ms - 86_400_000);
        let last_week = running("out", 10).with_started_at(wednesday_ms - 8 * 86_400_000);
        source.set_range_jobs(vec![in_week, last_week]);

        let (week, jobs) = scheduler.jobs_in_week(0).await.unwrap();
        assert_eq!(week.start.to_rfc3339(), "2025-04-07T00:00:00+00:00");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "in");

        let (previous, jobs) = scheduler.jobs_in_week(-1).await.unwrap();
        assert_eq!(previous.start.to_rfc3339(), "2025-03-31T00:00:00+00:00");
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "out");
    }
}
