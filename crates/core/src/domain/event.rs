// Change Events emitted by reconciliation
//
// Replaces render-layer signaling with a typed payload the UI (or any
// other subscriber) can filter on.

use serde::{Deserialize, Serialize};

use super::job::{JobId, JobRecord};

/// Discriminant used by subscribers to filter the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEventKind {
    ProgressUpdate,
    JobCompleted,
    JobCleanup,
}

/// One discrete state change observed during a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEvent {
    /// New job sighted, or progress/status moved while non-terminal
    ProgressUpdate { job: JobRecord },
    /// Job entered COMPLETED, FAILED or CANCELLED; the record carries
    /// the final status
    JobCompleted { job: JobRecord },
    /// Terminal job evicted after going missing from consecutive
    /// snapshots
    JobCleanup { job_id: JobId },
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeEventKind {
        match self {
            ChangeEvent::ProgressUpdate { .. } => ChangeEventKind::ProgressUpdate,
            ChangeEvent::JobCompleted { .. } => ChangeEventKind::JobCompleted,
            ChangeEvent::JobCleanup { .. } => ChangeEventKind::JobCleanup,
        }
    }

    /// The job id the event refers to
    pub fn job_id(&self) -> &str {
        match self {
            ChangeEvent::ProgressUpdate { job } | ChangeEvent::JobCompleted { job } => &job.id,
            ChangeEvent::JobCleanup { job_id } => job_id,
        }
    }
}
