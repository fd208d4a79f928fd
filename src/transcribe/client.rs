//! Core `JobClient` trait and `HttpJobClient` implementation.
//!
//! `HttpJobClient` speaks an AssemblyAI-style REST surface: raw audio bytes
//! are uploaded first (`POST /v2/upload` → upload URL), then a transcript job
//! is created (`POST /v2/transcript` → job id), and finally the job is polled
//! (`GET /v2/transcript/{id}`).  All connection details come from the
//! [`SharedConfig`] handle; nothing is hardcoded, and a credential update
//! through the handle applies to subsequent requests.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{SharedConfig, TranscriptionConfig};
use crate::transcribe::job::{JobId, JobOptions, JobSnapshot, JobStatus, Transcription};

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Errors that can occur while submitting or awaiting a transcription job.
///
/// `UploadFailed` and `PollingTimedOut` are transport-class failures a caller
/// may retry.  `NoSpeechDetected` and `RemoteJobFailed` are domain-class
/// failures that retrying without new input is unlikely to fix.  `Transport`
/// is the failure mode of one poll attempt; the poller absorbs it as
/// transient and it never escapes `await_completion`.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// Uploading or submitting the audio payload failed.
    #[error("audio upload failed: {0}")]
    UploadFailed(String),

    /// No terminal status was observed before the await-completion deadline.
    #[error("transcription did not complete within {0:?}")]
    PollingTimedOut(Duration),

    /// The job completed but the transcript was empty.
    #[error("no speech detected in the audio")]
    NoSpeechDetected,

    /// The remote service reported the job as failed.
    #[error("transcription failed: {0}")]
    RemoteJobFailed(String),

    /// A single poll attempt failed at the transport level.
    #[error("transcription service unreachable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscribeError::Transport("request timed out".into())
        } else {
            TranscribeError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// JobClient trait
// ---------------------------------------------------------------------------

/// Async interface to a remote asynchronous transcription service.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn JobClient>`).  The client is stateless with
/// respect to job lifecycle — tracking a job to completion is the poller's
/// responsibility.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Submit `audio` for transcription and return the assigned job id.
    ///
    /// Returns as soon as the service has accepted the job; never blocks for
    /// completion.
    async fn submit(&self, audio: &[u8], options: &JobOptions)
        -> Result<JobId, TranscribeError>;

    /// Fetch the current status of a previously submitted job.
    async fn poll(&self, id: &JobId) -> Result<JobSnapshot, TranscribeError>;
}

// ---------------------------------------------------------------------------
// HttpJobClient
// ---------------------------------------------------------------------------

/// Production [`JobClient`] that talks to an AssemblyAI-style REST API.
///
/// The HTTP client is pre-configured with the per-request timeout from
/// `config.transcription.request_timeout_secs`.  The API key and base URL
/// are re-read from the [`SharedConfig`] on every request, so
/// [`update_credentials`](crate::config::update_credentials) takes effect
/// without rebuilding the client.
pub struct HttpJobClient {
    client: reqwest::Client,
    config: SharedConfig,
}

impl HttpJobClient {
    /// Build an `HttpJobClient` from a shared configuration handle.
    ///
    /// A default (no-timeout) client is used as a last-resort fallback if the
    /// builder fails (should never happen in practice).
    pub fn new(config: SharedConfig) -> Self {
        let timeout_secs = config.read().unwrap().transcription.request_timeout_secs;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    /// Snapshot the transcription section of the shared config.
    fn snapshot(&self) -> TranscriptionConfig {
        self.config.read().unwrap().transcription.clone()
    }

    fn api_key(config: &TranscriptionConfig) -> String {
        config.api_key.clone().unwrap_or_default()
    }
}

#[async_trait]
impl JobClient for HttpJobClient {
    /// Upload `audio` and create a transcript job for it.
    ///
    /// Any failure on this path — upload, job creation, or a response with no
    /// job id — is reported as [`TranscribeError::UploadFailed`], since the
    /// unit of work was never accepted by the service.
    async fn submit(
        &self,
        audio: &[u8],
        options: &JobOptions,
    ) -> Result<JobId, TranscribeError> {
        let config = self.snapshot();
        let key = Self::api_key(&config);

        // ── 1. Upload the raw audio bytes ────────────────────────────────
        let upload_url = format!("{}/v2/upload", config.base_url);
        let upload_response = self
            .client
            .post(&upload_url)
            .header("authorization", &key)
            .body(audio.to_vec())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TranscribeError::UploadFailed(e.to_string()))?;

        let upload_json: serde_json::Value = upload_response
            .json()
            .await
            .map_err(|e| TranscribeError::UploadFailed(e.to_string()))?;

        let audio_url = upload_json["upload_url"]
            .as_str()
            .ok_or_else(|| {
                TranscribeError::UploadFailed("service did not return an upload URL".into())
            })?
            .to_string();

        // ── 2. Create the transcript job ─────────────────────────────────
        let mut body = serde_json::json!({
            "audio_url": audio_url,
            "punctuate": config.punctuate,
            "format_text": config.format_text,
            "speech_model": config.speech_model,
        });

        if options.speaker_labels {
            body["speaker_labels"] = serde_json::json!(true);
            body["disfluencies"] = serde_json::json!(true);
        }

        if options.detect_language() {
            body["language_detection"] = serde_json::json!(true);
        } else {
            body["language_code"] = serde_json::json!(options.language);
        }

        let submit_url = format!("{}/v2/transcript", config.base_url);
        let submit_response = self
            .client
            .post(&submit_url)
            .header("authorization", &key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| TranscribeError::UploadFailed(e.to_string()))?;

        let submit_json: serde_json::Value = submit_response
            .json()
            .await
            .map_err(|e| TranscribeError::UploadFailed(e.to_string()))?;

        let id = submit_json["id"].as_str().ok_or_else(|| {
            TranscribeError::UploadFailed("service did not return a job id".into())
        })?;

        log::debug!("transcribe: submitted job {id}");
        Ok(JobId::new(id))
    }

    /// Fetch one status observation for `id`.
    async fn poll(&self, id: &JobId) -> Result<JobSnapshot, TranscribeError> {
        let config = self.snapshot();
        let key = Self::api_key(&config);

        let url = format!("{}/v2/transcript/{}", config.base_url, id.as_str());
        let response = self
            .client
            .get(&url)
            .header("authorization", &key)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranscribeError::Transport(format!("malformed response: {e}")))?;

        let status = json["status"].as_str().unwrap_or_default();
        let snapshot = match status {
            "queued" => JobSnapshot::pending(JobStatus::Submitted),
            "processing" => JobSnapshot::pending(JobStatus::Processing),
            "completed" => JobSnapshot::completed(Transcription {
                text: json["text"].as_str().unwrap_or_default().trim().to_string(),
                language_code: json["language_code"].as_str().unwrap_or("en").to_string(),
                confidence: json["confidence"].as_f64().unwrap_or(0.0) as f32,
            }),
            "error" => JobSnapshot::failed(
                json["error"]
                    .as_str()
                    .unwrap_or("unknown transcription error"),
            ),
            other => {
                return Err(TranscribeError::Transport(format!(
                    "unrecognised job status `{other}`"
                )))
            }
        };

        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
