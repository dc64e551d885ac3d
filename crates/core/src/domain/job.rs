// Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (assigned by the remote job service)
pub type JobId = String;

/// Job Status (closed set, terminal states accept no further change)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Queued or Running - the job still governs the polling rate
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// Completed, Failed or Cancelled - no further transitions accepted
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Check whether a snapshot may move a job from `self` to `next`.
    ///
    /// Same-status updates are allowed while non-terminal (progress may
    /// still change); anything else outside the lifecycle below is a
    /// late or duplicate snapshot and must be rejected:
    ///
    /// QUEUED -> RUNNING -> {COMPLETED, FAILED, CANCELLED}
    /// QUEUED -> CANCELLED
    pub fn can_transition(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (*self, next) {
            (Queued, Queued) | (Running, Running) => true,
            (Queued, Running) | (Queued, Cancelled) => true,
            (Running, Completed) | (Running, Failed) | (Running, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "QUEUED"),
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
            JobStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Job Kind (open set - the remote service may introduce new kinds)
///
/// The two known kinds have different urgency profiles: question
/// generation feeds an interactive review screen and polls faster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobKind {
    QuestionGeneration,
    DocumentAnalysis,
    Other(String),
}

impl From<String> for JobKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "QUESTION_GENERATION" => JobKind::QuestionGeneration,
            "DOCUMENT_ANALYSIS" => JobKind::DocumentAnalysis,
            _ => JobKind::Other(s),
        }
    }
}

impl From<JobKind> for String {
    fn from(kind: JobKind) -> Self {
        match kind {
            JobKind::QuestionGeneration => "QUESTION_GENERATION".to_string(),
            JobKind::DocumentAnalysis => "DOCUMENT_ANALYSIS".to_string(),
            JobKind::Other(s) => s,
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::QuestionGeneration => write!(f, "QUESTION_GENERATION"),
            JobKind::DocumentAnalysis => write!(f, "DOCUMENT_ANALYSIS"),
            JobKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Domain metadata carried through unchanged - the monitor never
/// interprets these fields, the UI collaborator does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<bool>,
}

/// One tracked background job as reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,

    /// 0-100, meaningful only while RUNNING
    pub progress: u8,

    pub started_at: Option<i64>, // epoch ms
    pub finished_at: Option<i64>,

    /// Correlation key to an external document, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,

    #[serde(default)]
    pub metadata: JobMetadata,
}

impl JobRecord {
    pub fn new(id: impl Into<JobId>, kind: JobKind, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            kind,
            status,
            progress: 0,
            started_at: None,
            finished_at: None,
            doc_id: None,
            metadata: JobMetadata::default(),
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_started_at(mut self, epoch_ms: i64) -> Self {
        self.started_at = Some(epoch_ms);
        self
    }

    pub fn with_finished_at(mut self, epoch_ms: i64) -> Self {
        self.finished_at = Some(epoch_ms);
        self
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lifecycle_transitions() {
        use JobStatus::*;

        assert!(Queued.can_transition(Running));
        assert!(Queued.can_transition(Cancelled));
        assert!(Running.can_transition(Completed));
        assert!(Running.can_transition(Failed));
        assert!(Running.can_transition(Cancelled));

        // Same-status updates are allowed while non-terminal
        assert!(Queued.can_transition(Queued));
        assert!(Running.can_transition(Running));
    }

    #[test]
    fn test_terminal_statuses_are_locked() {
        use JobStatus::*;

        for terminal in [Completed, Failed, Cancelled] {
            for next in [Queued, Running, Completed, Failed, Cancelled] {
                assert!(
                    !terminal.can_transition(next),
                    "{} -> {} must be rejected",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn test_no_skipping_queued_to_terminal_except_cancel() {
        use JobStatus::*;

        assert!(!Queued.can_transition(Completed));
        assert!(!Queued.can_transition(Failed));
        assert!(!Running.can_transition(Queued));
    }

    #[test]
    fn test_job_kind_open_set_roundtrip() {
        let known: JobKind = serde_json::from_str("\"QUESTION_GENERATION\"").unwrap();
        assert_eq!(known, JobKind::QuestionGeneration);

        let unknown: JobKind = serde_json::from_str("\"OCR_SWEEP\"").unwrap();
        assert_eq!(unknown, JobKind::Other("OCR_SWEEP".to_string()));

        let back = serde_json::to_string(&unknown).unwrap();
        assert_eq!(back, "\"OCR_SWEEP\"");
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "job-1",
            "kind": "DOCUMENT_ANALYSIS",
            "status": "RUNNING",
            "progress": 40,
            "started_at": 1000,
            "finished_at": null
        }"#;

        let record: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, JobStatus::Running);
        assert_eq!(record.progress, 40);
        assert!(record.doc_id.is_none());
        assert_eq!(record.metadata, JobMetadata::default());
    }
}
