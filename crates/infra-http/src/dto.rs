// Wire DTOs for the remote job API
//
// The remote shape is looser than the domain model (string status and
// type fields); conversion funnels everything through the typed enums,
// with unknown job types preserved as JobKind::Other.

use serde::Deserialize;

use docwatch_core::domain::{JobKind, JobMetadata, JobRecord, JobStatus};
use docwatch_core::error::{AppError, Result};
use docwatch_core::port::StatsSnapshot;

#[derive(Debug, Deserialize)]
pub(crate) struct JobDto {
    pub job_id: String,
    pub job_type: String,
    pub status: String,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub question_count: Option<u32>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub enhanced: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobListDto {
    pub jobs: Vec<JobDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsDto {
    #[serde(default)]
    pub queued: u64,
    #[serde(default)]
    pub running: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub cancelled: u64,
}

fn parse_status(raw: &str) -> Result<JobStatus> {
    match raw {
        "QUEUED" => Ok(JobStatus::Queued),
        "RUNNING" => Ok(JobStatus::Running),
        "COMPLETED" => Ok(JobStatus::Completed),
        "FAILED" => Ok(JobStatus::Failed),
        "CANCELLED" => Ok(JobStatus::Cancelled),
        other => Err(AppError::Source(format!("Unknown job status: {}", other))),
    }
}

impl JobDto {
    pub(crate) fn into_record(self) -> Result<JobRecord> {
        let status = parse_status(&self.status)?;
        Ok(JobRecord {
            id: self.job_id,
            kind: JobKind::from(self.job_type),
            status,
            progress: self.progress.min(100),
            started_at: self.start_time,
            finished_at: self.end_time,
            doc_id: self.doc_id,
            metadata: JobMetadata {
                question_count: self.question_count,
                model_name: self.model_name,
                enhanced: self.enhanced,
            },
        })
    }
}

impl From<StatsDto> for StatsSnapshot {
    fn from(dto: StatsDto) -> Self {
        StatsSnapshot {
            queued: dto.queued,
            running: dto.running,
            completed: dto.completed,
            failed: dto.failed,
            cancelled: dto.cancelled,
        }
    }
}

/// Convert a list response, dropping records the API reports in a
/// status we do not understand (logged by the caller)
pub(crate) fn into_records(list: JobListDto) -> Vec<JobRecord> {
    list.jobs
        .into_iter()
        .filter_map(|dto| {
            let id = dto.job_id.clone();
            match dto.into_record() {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(job_id = %id, error = %err, "Skipping malformed job record");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_conversion_full() {
        let dto: JobDto = serde_json::from_str(
            r#"{
                "job_id": "j-42",
                "job_type": "QUESTION_GENERATION",
                "status": "RUNNING",
                "progress": 55,
                "start_time": 1700000000000,
                "doc_id": "doc-9",
                "question_count": 12,
                "model_name": "gpt-4o",
                "enhanced": true
            }"#,
        )
        .unwrap();

        let record = dto.into_record().unwrap();
        assert_eq!(record.id, "j-42");
        assert_eq!(record.kind, JobKind::QuestionGeneration);
        assert_eq!(record.status, JobStatus::Running);
        assert_eq!(record.progress, 55);
        assert_eq!(record.metadata.question_count, Some(12));
    }

    #[test]
    fn test_unknown_type_preserved_unknown_status_rejected() {
        let dto: JobDto = serde_json::from_str(
            r#"{"job_id": "j-1", "job_type": "OCR_SWEEP", "status": "RUNNING"}"#,
        )
        .unwrap();
        let record = dto.into_record().unwrap();
        assert_eq!(record.kind, JobKind::Other("OCR_SWEEP".to_string()));

        let dto: JobDto = serde_json::from_str(
            r#"{"job_id": "j-2", "job_type": "OCR_SWEEP", "status": "PAUSED"}"#,
        )
        .unwrap();
        assert!(dto.into_record().is_err());
    }

    #[test]
    fn test_malformed_records_are_dropped_from_lists() {
        let list: JobListDto = serde_json::from_str(
            r#"{"jobs": [
                {"job_id": "ok", "job_type": "DOCUMENT_ANALYSIS", "status": "QUEUED"},
                {"job_id": "bad", "job_type": "DOCUMENT_ANALYSIS", "status": "PAUSED"}
            ]}"#,
        )
        .unwrap();

        let records = into_records(list);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ok");
    }

    #[test]
    fn test_progress_clamped_to_100() {
        let dto: JobDto = serde_json::from_str(
            r#"{"job_id": "j-3", "job_type": "DOCUMENT_ANALYSIS", "status": "RUNNING", "progress": 120}"#,
        )
        .unwrap();
        assert_eq!(dto.into_record().unwrap().progress, 100);
    }
}
