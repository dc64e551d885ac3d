// HTTP JobSource Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use docwatch_core::domain::{JobId, JobRecord};
use docwatch_core::error::{AppError, Result};
use docwatch_core::port::{JobSource, StatsSnapshot};

use crate::dto::{into_records, JobListDto, StatsDto};

// Helper to convert reqwest::Error to AppError without leaking the
// transport type into core
fn map_http_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Source(format!("Request timed out: {}", err))
    } else if err.is_connect() {
        AppError::Source(format!("Connection failed: {}", err))
    } else if err.is_decode() {
        AppError::Source(format!("Malformed response body: {}", err))
    } else {
        AppError::Source(format!("HTTP error: {}", err))
    }
}

#[derive(Debug, Clone)]
pub struct HttpJobSourceConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl HttpJobSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// JobSource backed by the remote corpus job API
pub struct HttpJobSource {
    client: Client,
    base_url: String,
}

impl HttpJobSource {
    pub fn new(config: HttpJobSourceConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_job_list(&self, path_and_query: &str) -> Result<Vec<JobRecord>> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!(%url, "Fetching job list");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_http_error)?
            .error_for_status()
            .map_err(map_http_error)?;

        let list: JobListDto = response.json().await.map_err(map_http_error)?;
        Ok(into_records(list))
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn fetch_active_jobs(&self, limit: usize) -> Result<Vec<JobRecord>> {
        self.get_job_list(&format!("/api/jobs/active?limit={}", limit))
            .await
    }

    async fn fetch_completed_jobs(&self, limit: usize) -> Result<Vec<JobRecord>> {
        self.get_job_list(&format!("/api/jobs/completed?limit={}", limit))
            .await
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        let url = format!("{}/api/jobs/stats", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_http_error)?
            .error_for_status()
            .map_err(map_http_error)?;

        let stats: StatsDto = response.json().await.map_err(map_http_error)?;
        Ok(stats.into())
    }

    async fn fetch_jobs_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<JobRecord>> {
        self.get_job_list(&format!(
            "/api/jobs?start_ms={}&end_ms={}",
            start.timestamp_millis(),
            end.timestamp_millis()
        ))
        .await
    }

    async fn cancel_job(&self, job_id: &JobId) -> Result<()> {
        let url = format!("{}/api/jobs/{}/cancel", self.base_url, job_id);
        debug!(%url, "Requesting job cancellation");

        self.client
            .post(&url)
            .send()
            .await
            .map_err(map_http_error)?
            .error_for_status()
            .map_err(map_http_error)?;

        Ok(())
    }
}
