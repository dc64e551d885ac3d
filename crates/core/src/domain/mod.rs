// Domain Layer - Pure monitoring entities, no I/O

pub mod error;
pub mod event;
pub mod job;
pub mod week;

// Re-exports
pub use error::DomainError;
pub use event::{ChangeEvent, ChangeEventKind};
pub use job::{JobId, JobKind, JobMetadata, JobRecord, JobStatus};
pub use week::WeekBoundary;
