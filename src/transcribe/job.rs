//! Transcription job data model.
//!
//! A [`Job`] tracks one unit of asynchronous remote work from submission to a
//! terminal state.  The poller owns the `Job` for the duration of its polling
//! loop and is the only writer; once the job is terminal the extracted
//! [`Transcription`] is handed to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JobId / JobHandle
// ---------------------------------------------------------------------------

/// Opaque identifier assigned by the remote service on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Wrap a raw identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier, for building polling URLs.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle returned by a successful submission.
///
/// Submission never blocks for completion — the handle is what the caller
/// passes to `await_completion` later (possibly from a different task).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Identifier of the submitted job.
    pub id: JobId,
}

impl JobHandle {
    /// Wrap a job id in a handle.
    pub fn new(id: JobId) -> Self {
        Self { id }
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle states reported by the remote service.
///
/// ```text
/// Submitted ──▶ Processing ──▶ Completed
///      │             │
///      └─────────────┴───────▶ Failed
/// ```
///
/// `Completed` and `Failed` are terminal — the poller never observes a
/// transition out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted by the service, not yet picked up by a worker.
    Submitted,
    /// A remote worker is transcribing the audio.
    Processing,
    /// Transcription finished; a result is available.
    Completed,
    /// The service gave up on the job; an error cause is available.
    Failed,
}

impl JobStatus {
    /// Returns `true` for states from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

/// Completed-job payload: the transcript and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// The transcript text.
    pub text: String,
    /// Detected (or pinned) ISO-639-1 language code.
    pub language_code: String,
    /// Service-reported confidence in `[0, 1]`.
    pub confidence: f32,
}

// ---------------------------------------------------------------------------
// JobSnapshot
// ---------------------------------------------------------------------------

/// One status observation returned by `JobClient::poll`.
///
/// `result` is present only when `status == Completed`; `error` only when
/// `status == Failed`.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    /// Observed lifecycle state.
    pub status: JobStatus,
    /// Transcript payload for a completed job.
    pub result: Option<Transcription>,
    /// Remote-reported cause for a failed job.
    pub error: Option<String>,
}

impl JobSnapshot {
    /// A snapshot for a still-pending job.
    pub fn pending(status: JobStatus) -> Self {
        Self {
            status,
            result: None,
            error: None,
        }
    }

    /// A snapshot for a completed job carrying its transcript.
    pub fn completed(result: Transcription) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            error: None,
        }
    }

    /// A snapshot for a failed job carrying the remote cause.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: None,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// JobOptions
// ---------------------------------------------------------------------------

/// Per-job feature flags forwarded to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    /// ISO-639-1 language code to pin, or `"auto"` to request automatic
    /// language detection.
    pub language: String,
    /// Request speaker-segmented output.
    pub speaker_labels: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            speaker_labels: false,
        }
    }
}

impl JobOptions {
    /// Returns `true` when automatic language detection was requested.
    pub fn detect_language(&self) -> bool {
        self.language == "auto"
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A submitted job as tracked by the poller.
///
/// Mutated only by the poller as it observes status changes; terminal states
/// are final.
#[derive(Debug, Clone)]
pub struct Job {
    /// Identifier assigned on submission.
    pub id: JobId,
    /// Last observed lifecycle state.
    pub status: JobStatus,
    /// Transcript payload, present only once `status == Completed`.
    pub result: Option<Transcription>,
    /// Remote cause, present only once `status == Failed`.
    pub error: Option<String>,
}

impl Job {
    /// A freshly submitted job with no observations yet.
    pub fn submitted(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Submitted,
            result: None,
            error: None,
        }
    }

    /// Apply a poll observation.
    ///
    /// Once the job has reached a terminal state further observations are
    /// ignored — terminal states are final.
    pub fn observe(&mut self, snapshot: JobSnapshot) {
        if self.status.is_terminal() {
            return;
        }
        self.status = snapshot.status;
        self.result = snapshot.result;
        self.error = snapshot.error;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn transcription(text: &str) -> Transcription {
        Transcription {
            text: text.into(),
            language_code: "en".into(),
            confidence: 0.9,
        }
    }

    // ---- JobStatus ---

    #[test]
    fn completed_and_failed_are_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn submitted_and_processing_are_not_terminal() {
        assert!(!JobStatus::Submitted.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    // ---- Job lifecycle ---

    #[test]
    fn submitted_job_starts_without_result_or_error() {
        let job = Job::submitted(JobId::new("abc"));
        assert_eq!(job.status, JobStatus::Submitted);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn observe_updates_status_and_result() {
        let mut job = Job::submitted(JobId::new("abc"));

        job.observe(JobSnapshot::pending(JobStatus::Processing));
        assert_eq!(job.status, JobStatus::Processing);

        job.observe(JobSnapshot::completed(transcription("hello")));
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result.as_ref().map(|r| r.text.as_str()), Some("hello"));
    }

    #[test]
    fn terminal_state_is_final() {
        let mut job = Job::submitted(JobId::new("abc"));
        job.observe(JobSnapshot::failed("worker crashed"));
        assert_eq!(job.status, JobStatus::Failed);

        // A later (bogus) observation must not undo the terminal state.
        job.observe(JobSnapshot::pending(JobStatus::Processing));
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("worker crashed"));
    }

    // ---- JobOptions ---

    #[test]
    fn default_options_request_language_detection() {
        let options = JobOptions::default();
        assert!(options.detect_language());
        assert!(!options.speaker_labels);
    }

    #[test]
    fn pinned_language_disables_detection() {
        let options = JobOptions {
            language: "fr".into(),
            ..Default::default()
        };
        assert!(!options.detect_language());
    }

    // ---- JobId ---

    #[test]
    fn job_id_displays_raw_identifier() {
        let id = JobId::new("tr-123");
        assert_eq!(id.to_string(), "tr-123");
        assert_eq!(id.as_str(), "tr-123");
    }
}
