// Reconciliation Engine
//
// Diffs one fetched snapshot against the store and turns the delta
// into discrete change events. Passes are strictly sequential: the
// poll loop never starts pass k+1 before pass k has returned.

use std::collections::HashSet;

use tracing::{debug, info};

use super::constants::EVICTION_MISS_THRESHOLD;
use super::store::{JobStateStore, UpsertOutcome};
use crate::domain::{ChangeEvent, JobRecord};

/// Stateless diffing of snapshots against a store
#[derive(Debug, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply one snapshot, mutating the store and returning the
    /// resulting events in snapshot iteration order (cleanups last).
    ///
    /// Rejected records (late or duplicate snapshots) are skipped
    /// without aborting the rest of the pass.
    pub fn apply(&self, store: &mut JobStateStore, snapshot: &[JobRecord]) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.len());

        for record in snapshot {
            seen.insert(record.id.as_str());

            match store.upsert(record.clone()) {
                Ok(UpsertOutcome::Inserted) => {
                    // A job first sighted in a terminal status still
                    // counts as a completion for subscribers
                    if record.is_terminal() {
                        events.push(ChangeEvent::JobCompleted {
                            job: record.clone(),
                        });
                    } else {
                        events.push(ChangeEvent::ProgressUpdate {
                            job: record.clone(),
                        });
                    }
                }
                Ok(UpsertOutcome::EnteredTerminal) => {
                    info!(job_id = %record.id, status = %record.status, "Job finished");
                    events.push(ChangeEvent::JobCompleted {
                        job: record.clone(),
                    });
                }
                Ok(UpsertOutcome::Progressed) => {
                    events.push(ChangeEvent::ProgressUpdate {
                        job: record.clone(),
                    });
                }
                Ok(UpsertOutcome::Unchanged) => {}
                Err(err) => {
                    // Already logged by the store; the pass continues
                    debug!(job_id = %record.id, error = %err, "Snapshot record skipped");
                }
            }

            // Presence resets the absence counter even when the
            // record itself was rejected as stale
            store.mark_seen(&record.id);
        }

        // Terminal jobs absent from this snapshot accumulate misses
        // until eviction
        for job_id in store.terminal_ids() {
            if seen.contains(job_id.as_str()) {
                continue;
            }
            let misses = store.record_miss(&job_id);
            if misses >= EVICTION_MISS_THRESHOLD {
                store.remove(&job_id);
                debug!(job_id = %job_id, misses, "Evicting terminal job");
                events.push(ChangeEvent::JobCleanup { job_id });
            }
        }

        events
    }
}
