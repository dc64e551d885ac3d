// Statistics Aggregator
//
// Pure reduction over a store snapshot. Recomputed on demand rather
// than maintained incrementally, so the counts can never drift from
// the store contents.

use serde::{Deserialize, Serialize};

use crate::domain::{JobRecord, JobStatus};

/// Per-status counts over one store snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatistics {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// queued + running
    pub active_total: usize,
    /// completed + failed + cancelled
    pub finished_total: usize,
}

impl JobStatistics {
    pub fn count_for(&self, status: JobStatus) -> usize {
        match status {
            JobStatus::Queued => self.queued,
            JobStatus::Running => self.running,
            JobStatus::Completed => self.completed,
            JobStatus::Failed => self.failed,
            JobStatus::Cancelled => self.cancelled,
        }
    }
}

/// Aggregate counts by status
pub fn aggregate(jobs: &[JobRecord]) -> JobStatistics {
    let mut stats = JobStatistics::default();
    for job in jobs {
        match job.status {
            JobStatus::Queued => stats.queued += 1,
            JobStatus::Running => stats.running += 1,
            JobStatus::Completed => stats.completed += 1,
            JobStatus::Failed => stats.failed += 1,
            JobStatus::Cancelled => stats.cancelled += 1,
        }
    }
    stats.active_total = stats.queued + stats.running;
    stats.finished_total = stats.completed + stats.failed + stats.cancelled;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobKind, JobRecord, JobStatus};

    fn job(id: &str, status: JobStatus) -> JobRecord {
        JobRecord::new(id, JobKind::DocumentAnalysis, status)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(&[]), JobStatistics::default());
    }

    #[test]
    fn test_counts_by_status() {
        let jobs = vec![
            job("a", JobStatus::Queued),
            job("b", JobStatus::Running),
            job("c", JobStatus::Running),
            job("d", JobStatus::Completed),
            job("e", JobStatus::Failed),
            job("f", JobStatus::Cancelled),
        ];

        let stats = aggregate(&jobs);
        assert_eq!(stats.queued, 1);
        assert_eq!(stats.running, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.cancelled, 1);
    }

    #[test]
    fn test_active_total_matches_active_statuses() {
        let jobs = vec![
            job("a", JobStatus::Queued),
            job("b", JobStatus::Running),
            job("c", JobStatus::Completed),
        ];

        let stats = aggregate(&jobs);
        let active = jobs.iter().filter(|j| j.status.is_active()).count();
        assert_eq!(stats.active_total, active);
        assert_eq!(stats.finished_total, jobs.len() - active);
    }
}
