// Job State Store
//
// In-memory collection of known jobs keyed by job id. Pure data
// structure: no I/O, mutated only from within a reconciliation pass.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use crate::domain::error::{DomainError, Result};
use crate::domain::{JobId, JobRecord, JobStatus};

/// Outcome of an accepted upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First sighting of this job id
    Inserted,
    /// An existing job entered a terminal status
    EnteredTerminal,
    /// Progress or status moved while non-terminal
    Progressed,
    /// Snapshot carried no observable change
    Unchanged,
}

#[derive(Debug, Clone)]
struct TrackedJob {
    record: JobRecord,
    /// Consecutive snapshots this job has been absent from while
    /// terminal; reset on every sighting
    misses: u32,
}

/// In-memory job collection with transition-checked updates
#[derive(Debug, Default)]
pub struct JobStateStore {
    jobs: HashMap<JobId, TrackedJob>,
}

impl JobStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by job id, subject to transition invariants.
    ///
    /// A rejected snapshot (illegal transition or regressing progress)
    /// leaves the store untouched; the caller treats the error as a
    /// logged no-op, never as a failure of the pass.
    pub fn upsert(&mut self, incoming: JobRecord) -> Result<UpsertOutcome> {
        let Some(tracked) = self.jobs.get_mut(&incoming.id) else {
            self.jobs.insert(
                incoming.id.clone(),
                TrackedJob {
                    record: incoming,
                    misses: 0,
                },
            );
            return Ok(UpsertOutcome::Inserted);
        };

        let current = &tracked.record;
        if !current.status.can_transition(incoming.status) {
            debug!(
                job_id = %incoming.id,
                from = %current.status,
                to = %incoming.status,
                "Rejected late/duplicate snapshot"
            );
            return Err(DomainError::InvalidStatusTransition {
                from: current.status.to_string(),
                to: incoming.status.to_string(),
            });
        }

        // Progress never decreases while RUNNING
        if current.status == JobStatus::Running
            && incoming.status == JobStatus::Running
            && incoming.progress < current.progress
        {
            debug!(
                job_id = %incoming.id,
                current = current.progress,
                incoming = incoming.progress,
                "Rejected stale progress snapshot"
            );
            return Err(DomainError::StaleProgress {
                job_id: incoming.id.clone(),
                current: current.progress,
                incoming: incoming.progress,
            });
        }

        let entered_terminal = !current.status.is_terminal() && incoming.status.is_terminal();
        let changed =
            current.status != incoming.status || current.progress != incoming.progress;

        tracked.misses = 0;
        tracked.record = incoming;

        if entered_terminal {
            Ok(UpsertOutcome::EnteredTerminal)
        } else if changed {
            Ok(UpsertOutcome::Progressed)
        } else {
            Ok(UpsertOutcome::Unchanged)
        }
    }

    /// Idempotent eviction
    pub fn remove(&mut self, job_id: &str) -> Option<JobRecord> {
        self.jobs.remove(job_id).map(|t| t.record)
    }

    pub fn get(&self, job_id: &str) -> Option<&JobRecord> {
        self.jobs.get(job_id).map(|t| &t.record)
    }

    /// Jobs with status QUEUED or RUNNING, most-recently-started first,
    /// capped at `limit`
    pub fn get_active(&self, limit: usize) -> Vec<JobRecord> {
        let mut active: Vec<&JobRecord> = self
            .jobs
            .values()
            .map(|t| &t.record)
            .filter(|r| r.is_active())
            .collect();
        active.sort_by_key(|r| Reverse(r.started_at.unwrap_or(i64::MIN)));
        active.into_iter().take(limit).cloned().collect()
    }

    pub fn get_by_status(&self, status: JobStatus, limit: usize) -> Vec<JobRecord> {
        let mut jobs: Vec<&JobRecord> = self
            .jobs
            .values()
            .map(|t| &t.record)
            .filter(|r| r.status == status)
            .collect();
        jobs.sort_by_key(|r| Reverse(r.started_at.unwrap_or(i64::MIN)));
        jobs.into_iter().take(limit).cloned().collect()
    }

    /// Full snapshot for statistics
    pub fn all(&self) -> Vec<JobRecord> {
        self.jobs.values().map(|t| t.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Reset the absence counter after a sighting
    pub fn mark_seen(&mut self, job_id: &str) {
        if let Some(tracked) = self.jobs.get_mut(job_id) {
            tracked.misses = 0;
        }
    }

    /// Bump the absence counter of a terminal job; returns the new
    /// count
    pub fn record_miss(&mut self, job_id: &str) -> u32 {
        match self.jobs.get_mut(job_id) {
            Some(tracked) => {
                tracked.misses += 1;
                tracked.misses
            }
            None => 0,
        }
    }

    /// Ids of all terminal jobs currently tracked
    pub fn terminal_ids(&self) -> Vec<JobId> {
        self.jobs
            .values()
            .filter(|t| t.record.is_terminal())
            .map(|t| t.record.id.clone())
            .collect()
    }
}
