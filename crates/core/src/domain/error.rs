// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job status transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Stale progress for job {job_id}: {incoming} < {current}")]
    StaleProgress {
        job_id: String,
        current: u8,
        incoming: u8,
    },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
