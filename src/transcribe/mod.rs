//! Remote transcription module.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    JobClient (trait)                       │
//! │                                                            │
//! │   submit(audio, options) ──▶ JobId                         │
//! │   poll(id)               ──▶ JobSnapshot                   │
//! │                                                            │
//! │   HttpJobClient: upload → create job → poll  (reqwest)     │
//! └──────────────────────────┬─────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                        JobPoller                           │
//! │                                                            │
//! │   submit            ──▶ JobHandle  (returns immediately)   │
//! │   await_completion  ──▶ Transcription | TranscribeError    │
//! │     fixed poll interval, hard deadline, transient-error    │
//! │     absorption, empty-transcript rejection                 │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use voice_inspect::config::{new_shared_config, AppConfig};
//! use voice_inspect::transcribe::{HttpJobClient, JobOptions, JobPoller};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = new_shared_config(AppConfig::default());
//!     let client = Arc::new(HttpJobClient::new(config));
//!     let poller = JobPoller::new(client);
//!
//!     let audio: Vec<u8> = std::fs::read("answer.wav").unwrap();
//!     let handle = poller.submit(&audio, &JobOptions::default()).await.unwrap();
//!     let transcription = poller
//!         .await_completion(&handle, Duration::from_secs(180))
//!         .await
//!         .unwrap();
//!     println!("{} ({})", transcription.text, transcription.language_code);
//! }
//! ```

pub mod client;
pub mod job;
pub mod poller;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{HttpJobClient, JobClient, TranscribeError};
pub use job::{Job, JobHandle, JobId, JobOptions, JobSnapshot, JobStatus, Transcription};
pub use poller::JobPoller;
