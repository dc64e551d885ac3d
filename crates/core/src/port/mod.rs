// Port Layer - Interfaces for external dependencies

pub mod job_source;
pub mod time_provider;

// Re-exports
pub use job_source::{JobSource, StatsSnapshot};
pub use time_provider::{SystemTimeProvider, TimeProvider};
