// Job Source Port (Interface)
// Abstraction over the remote job-listing/cancel API

use crate::domain::{JobId, JobRecord};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side job counters, fetched as-is for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub queued: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
}

/// Remote source of job state
///
/// All calls are asynchronous and may fail; the polling layer absorbs
/// fetch failures, while `cancel_job` errors propagate to the caller
/// that requested the cancellation.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch jobs currently QUEUED or RUNNING
    async fn fetch_active_jobs(&self, limit: usize) -> Result<Vec<JobRecord>>;

    /// Fetch recently finished jobs (any terminal status)
    async fn fetch_completed_jobs(&self, limit: usize) -> Result<Vec<JobRecord>>;

    /// Fetch server-side counters
    async fn fetch_stats(&self) -> Result<StatsSnapshot>;

    /// Fetch jobs whose start time falls inside [start, end]
    async fn fetch_jobs_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<JobRecord>>;

    /// Request cancellation of a job
    async fn cancel_job(&self, job_id: &JobId) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted JobSource for tests
    ///
    /// Plays back queued snapshots in order; once a queue runs dry the
    /// last snapshot repeats (an empty script repeats the empty
    /// snapshot). Tracks call counts and the number of concurrently
    /// outstanding fetches so tests can assert the single-flight
    /// invariant.
    pub struct MockJobSource {
        active_script: Mutex<VecDeque<Vec<JobRecord>>>,
        completed_script: Mutex<VecDeque<Vec<JobRecord>>>,
        last_active: Mutex<Vec<JobRecord>>,
        last_completed: Mutex<Vec<JobRecord>>,
        range_jobs: Mutex<Vec<JobRecord>>,
        stats: Mutex<StatsSnapshot>,

        fail_fetches: Mutex<bool>,
        fail_cancel: Mutex<bool>,
        fetch_delay: Mutex<Option<Duration>>,

        fetch_count: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        cancelled: Mutex<Vec<JobId>>,
    }

    impl MockJobSource {
        pub fn new() -> Self {
            Self {
                active_script: Mutex::new(VecDeque::new()),
                completed_script: Mutex::new(VecDeque::new()),
                last_active: Mutex::new(Vec::new()),
                last_completed: Mutex::new(Vec::new()),
                range_jobs: Mutex::new(Vec::new()),
                stats: Mutex::new(StatsSnapshot::default()),
                fail_fetches: Mutex::new(false),
                fail_cancel: Mutex::new(false),
                fetch_delay: Mutex::new(None),
                fetch_count: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                cancelled: Mutex::new(Vec::new()),
            }
        }

        pub fn new_shared() -> Arc<Self> {
            Arc::new(Self::new())
        }

        /// Queue one active-jobs snapshot for playback
        pub fn push_active_snapshot(&self, jobs: Vec<JobRecord>) {
            self.active_script.lock().unwrap().push_back(jobs);
        }

        /// Queue one completed-jobs snapshot for playback
        pub fn push_completed_snapshot(&self, jobs: Vec<JobRecord>) {
            self.completed_script.lock().unwrap().push_back(jobs);
        }

        pub fn set_range_jobs(&self, jobs: Vec<JobRecord>) {
            *self.range_jobs.lock().unwrap() = jobs;
        }

        pub fn set_stats(&self, stats: StatsSnapshot) {
            *self.stats.lock().unwrap() = stats;
        }

        /// Make every fetch fail until cleared
        pub fn set_fail_fetches(&self, fail: bool) {
            *self.fail_fetches.lock().unwrap() = fail;
        }

        pub fn set_fail_cancel(&self, fail: bool) {
            *self.fail_cancel.lock().unwrap() = fail;
        }

        /// Delay every fetch, to simulate a slow remote
        pub fn set_fetch_delay(&self, delay: Duration) {
            *self.fetch_delay.lock().unwrap() = Some(delay);
        }

        pub fn fetch_count(&self) -> usize {
            self.fetch_count.load(Ordering::SeqCst)
        }

        /// Highest number of fetches that were ever outstanding at once
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn cancelled_jobs(&self) -> Vec<JobId> {
            self.cancelled.lock().unwrap().clone()
        }

        async fn enter_fetch(&self) -> Result<()> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight
                .fetch_max(now_in_flight, Ordering::SeqCst);

            let delay = *self.fetch_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if *self.fail_fetches.lock().unwrap() {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                return Err(AppError::Source("mock transport failure".to_string()));
            }
            Ok(())
        }

        fn exit_fetch(&self) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        fn next_snapshot(
            script: &Mutex<VecDeque<Vec<JobRecord>>>,
            last: &Mutex<Vec<JobRecord>>,
        ) -> Vec<JobRecord> {
            if let Some(snapshot) = script.lock().unwrap().pop_front() {
                *last.lock().unwrap() = snapshot.clone();
                snapshot
            } else {
                last.lock().unwrap().clone()
            }
        }
    }

    impl Default for MockJobSource {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl JobSource for MockJobSource {
        async fn fetch_active_jobs(&self, limit: usize) -> Result<Vec<JobRecord>> {
            self.enter_fetch().await?;
            let mut jobs = Self::next_snapshot(&self.active_script, &self.last_active);
            jobs.truncate(limit);
            self.exit_fetch();
            Ok(jobs)
        }

        async fn fetch_completed_jobs(&self, limit: usize) -> Result<Vec<JobRecord>> {
            self.enter_fetch().await?;
            let mut jobs = Self::next_snapshot(&self.completed_script, &self.last_completed);
            jobs.truncate(limit);
            self.exit_fetch();
            Ok(jobs)
        }

        async fn fetch_stats(&self) -> Result<StatsSnapshot> {
            self.enter_fetch().await?;
            let stats = self.stats.lock().unwrap().clone();
            self.exit_fetch();
            Ok(stats)
        }

        async fn fetch_jobs_in_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<JobRecord>> {
            self.enter_fetch().await?;
            let jobs = self
                .range_jobs
                .lock()
                .unwrap()
                .iter()
                .filter(|j| {
                    j.started_at
                        .and_then(DateTime::<Utc>::from_timestamp_millis)
                        .map(|t| t >= start && t <= end)
                        .unwrap_or(false)
                })
                .cloned()
                .collect();
            self.exit_fetch();
            Ok(jobs)
        }

        async fn cancel_job(&self, job_id: &JobId) -> Result<()> {
            if *self.fail_cancel.lock().unwrap() {
                return Err(AppError::Source(format!(
                    "mock cancel rejected for {}",
                    job_id
                )));
            }
            self.cancelled.lock().unwrap().push(job_id.clone());
            Ok(())
        }
    }
}
