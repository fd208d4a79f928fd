//! voice-inspect — orchestration core for a voice-driven inspection
//! assistant.
//!
//! The crate drives recorded audio through a remote asynchronous
//! transcription service and then through a dependency-ordered chain of
//! AI text-processing stages (translation, extraction, relevance analysis,
//! scoring, summarization), tolerating partial failure and always returning
//! a deterministic, name-keyed result.
//!
//! # Architecture
//!
//! ```text
//! audio bytes
//!     │
//!     ▼
//! transcribe::JobPoller ── JobClient (HTTP) ──▶ remote transcription job
//!     │   submit → poll (1 s interval) → terminal state | hard deadline
//!     ▼
//! Transcription {text, language_code, confidence}
//!     │  (becomes the pipeline SeedInput)
//!     ▼
//! pipeline::PipelineExecutor ── TextTransformer (HTTP) ──▶ LLM backend
//!     │   validated DAG, topological order, per-stage degradation
//!     ▼
//! PipelineResult: stage name → Completed | Failed | Skipped
//! ```
//!
//! The `service` module wires both halves behind one facade and adds the
//! product's predefined flows (Q&A answer analysis, form-field extraction).
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_inspect::config::{new_shared_config, AppConfig};
//! use voice_inspect::pipeline::SeedInput;
//! use voice_inspect::service::SpeechService;
//! use voice_inspect::transcribe::JobOptions;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = new_shared_config(AppConfig::load().unwrap());
//!     let service = SpeechService::from_config(config);
//!
//!     let audio: Vec<u8> = std::fs::read("answer.wav").unwrap();
//!     let transcription = service
//!         .transcribe(&audio, &JobOptions::default())
//!         .await
//!         .unwrap();
//!
//!     let seed: SeedInput = transcription.into();
//!     let analysis = service
//!         .analyze_answer("What is the asking price?", &seed)
//!         .await
//!         .unwrap();
//!
//!     println!("{}", analysis.summary);
//!     println!("{}", analysis.relevancy_score);
//! }
//! ```

pub mod config;
pub mod pipeline;
pub mod service;
pub mod transcribe;
pub mod transform;
