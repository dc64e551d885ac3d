// Adaptive Interval Policy
//
// Pure function from the active job set to the next poll delay. The
// most urgent job governs the shared polling rate: each active job
// yields a candidate interval from (kind, status, progress) and the
// minimum wins. Candidates never increase with progress, which keeps
// urgency monotonic.

use std::time::Duration;

use tracing::trace;

use super::constants::*;
use crate::domain::{JobKind, JobRecord, JobStatus};

/// Compute the delay until the next poll for the given active set.
///
/// An empty set yields the idle interval. Identical input always
/// yields identical output.
pub fn compute_interval(active: &[JobRecord]) -> Duration {
    let millis = active
        .iter()
        .map(candidate_interval_ms)
        .min()
        .unwrap_or(IDLE_POLL_INTERVAL_MS);

    trace!(active_jobs = active.len(), interval_ms = millis, "Computed poll interval");
    Duration::from_millis(millis)
}

/// Per-job candidate interval from the fixed lookup table
fn candidate_interval_ms(job: &JobRecord) -> u64 {
    let urgent = matches!(job.kind, JobKind::QuestionGeneration);

    match job.status {
        JobStatus::Queued => {
            if urgent {
                QUEUED_URGENT_INTERVAL_MS
            } else {
                QUEUED_INTERVAL_MS
            }
        }
        JobStatus::Running => {
            if job.progress >= PROGRESS_FINAL_THRESHOLD {
                RUNNING_FINAL_INTERVAL_MS
            } else if job.progress >= PROGRESS_MID_THRESHOLD {
                RUNNING_MID_INTERVAL_MS
            } else if urgent {
                RUNNING_URGENT_EARLY_INTERVAL_MS
            } else {
                RUNNING_EARLY_INTERVAL_MS
            }
        }
        // Terminal jobs should never be in the active set; treat them
        // as exerting no urgency
        _ => IDLE_POLL_INTERVAL_MS,
    }
}
