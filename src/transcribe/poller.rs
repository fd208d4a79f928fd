//! Job poller — drives a submitted transcription job to a terminal state.
//!
//! [`JobPoller`] wraps an `Arc<dyn JobClient>` and adds the lifecycle logic
//! the client itself stays agnostic of:
//!
//! * `submit` forwards to the client and returns a [`JobHandle`] immediately.
//! * `await_completion` polls at a fixed interval until the job is
//!   `Completed` or `Failed`, or a hard deadline elapses.
//!
//! Transport failures on individual poll attempts are transient: they are
//! logged at warn level and the loop continues, bounded only by the overall
//! deadline.  The remote job itself is never cancelled — exceeding the
//! deadline abandons the wait, not the job.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::transcribe::client::{JobClient, TranscribeError};
use crate::transcribe::job::{Job, JobHandle, JobOptions, JobStatus, Transcription};

// ---------------------------------------------------------------------------
// JobPoller
// ---------------------------------------------------------------------------

/// Default interval between consecutive status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls a remote transcription job until it reaches a terminal state.
///
/// The poller holds no per-job state between calls; each `await_completion`
/// owns its [`Job`] record for the duration of the loop and hands the
/// extracted [`Transcription`] to the caller once terminal.
pub struct JobPoller {
    client: Arc<dyn JobClient>,
    poll_interval: Duration,
}

impl JobPoller {
    /// Create a poller with the default 1 s poll interval.
    pub fn new(client: Arc<dyn JobClient>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval (useful for tests and latency tuning).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Submit `audio` for transcription.
    ///
    /// Returns as soon as the service has accepted the job; the returned
    /// handle is what [`await_completion`](Self::await_completion) consumes.
    pub async fn submit(
        &self,
        audio: &[u8],
        options: &JobOptions,
    ) -> Result<JobHandle, TranscribeError> {
        let id = self.client.submit(audio, options).await?;
        Ok(JobHandle::new(id))
    }

    /// Poll the job behind `handle` until it is terminal or `deadline`
    /// elapses.
    ///
    /// # Errors
    ///
    /// - [`TranscribeError::NoSpeechDetected`] — the job completed but the
    ///   transcript is empty.  The remote call succeeded, so this is a domain
    ///   failure, not a transport failure.
    /// - [`TranscribeError::RemoteJobFailed`] — the service reported the job
    ///   as failed; the remote cause is surfaced verbatim.
    /// - [`TranscribeError::PollingTimedOut`] — no terminal state before the
    ///   deadline.  The remote job may still complete server-side.
    pub async fn await_completion(
        &self,
        handle: &JobHandle,
        deadline: Duration,
    ) -> Result<Transcription, TranscribeError> {
        let started = Instant::now();
        let mut job = Job::submitted(handle.id.clone());

        loop {
            match self.client.poll(&job.id).await {
                Ok(snapshot) => job.observe(snapshot),
                Err(e) => {
                    // Transient: a single failed poll does not abort the wait.
                    log::warn!("transcribe: poll attempt for job {} failed: {e}", job.id);
                }
            }

            match job.status {
                JobStatus::Completed => return Self::finish(job),
                JobStatus::Failed => {
                    let cause = job
                        .error
                        .unwrap_or_else(|| "unknown transcription error".into());
                    return Err(TranscribeError::RemoteJobFailed(cause));
                }
                JobStatus::Submitted | JobStatus::Processing => {}
            }

            let elapsed = started.elapsed();
            if elapsed >= deadline {
                log::warn!(
                    "transcribe: job {} still {:?} after {elapsed:?}, giving up",
                    job.id,
                    job.status
                );
                return Err(TranscribeError::PollingTimedOut(deadline));
            }

            // Never sleep past the deadline: the timeout error must land at
            // or just after it, not one full interval later.
            let remaining = deadline - elapsed;
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Extract the transcript from a completed job, rejecting empty text.
    fn finish(job: Job) -> Result<Transcription, TranscribeError> {
        let result = job.result.ok_or(TranscribeError::NoSpeechDetected)?;
        if result.text.trim().is_empty() {
            return Err(TranscribeError::NoSpeechDetected);
        }
        log::debug!(
            "transcribe: job {} completed ({} chars, language {})",
            job.id,
            result.text.len(),
            result.language_code
        );
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
