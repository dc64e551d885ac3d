// Docwatch Infrastructure - HTTP Adapter
// Implements: JobSource against the remote corpus job API

mod dto;
mod job_source_impl;

pub use job_source_impl::{HttpJobSource, HttpJobSourceConfig};

// Note: reqwest::Error conversion is handled by a helper function
// due to Rust's orphan rules (cannot implement From<reqwest::Error>
// for AppError here)
