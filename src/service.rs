//! Service facade — the surface the surrounding application layer calls.
//!
//! [`SpeechService`] wires a [`JobPoller`] and a [`PipelineExecutor`] over
//! injected `Arc<dyn JobClient>` / `Arc<dyn TextTransformer>` seams and
//! exposes:
//!
//! * the transcription operations (`submit_transcription_job`,
//!   `await_transcription`, and the combined `transcribe`),
//! * arbitrary pipeline runs (`run_pipeline`),
//! * the two predefined analysis flows recovered from the product:
//!   Q&A answer analysis and form-field extraction,
//! * the narrow `update_credentials` operation.
//!
//! # Flow shapes
//!
//! ```text
//! answer analysis:   translate ──▶ analyze ──▶ score
//!                                      └─────▶ summarize
//!
//! field extraction:  translate ──▶ extract
//! ```
//!
//! Both flows always return a fully shaped response: a degraded stage shows
//! up as the placeholder text in its field, never as an overall failure.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{self, ApiCredentials, SharedConfig};
use crate::pipeline::{
    PipelineDefinition, PipelineError, PipelineExecutor, PipelineResult, SeedInput, Stage,
    STAGE_UNAVAILABLE,
};
use crate::transcribe::{
    HttpJobClient, JobClient, JobHandle, JobOptions, JobPoller, TranscribeError, Transcription,
};
use crate::transform::{ApiTransformer, TextTransformer};

// ---------------------------------------------------------------------------
// Stage instructions
// ---------------------------------------------------------------------------

const TRANSLATE_INSTRUCTION: &str = "\
You are an expert language translator. Verify whether the input text is \
already English before translating: trust the text content over a possibly \
incorrect detected language code. If the text is English, return it \
unchanged; otherwise translate it to English. Reply with ONLY the English \
text.";

const SCORE_INSTRUCTION: &str = "\
You are an answer quality scorer. Based on the analysis, score the answer's \
relevance, content match, completeness, and specificity from 1-10.

Format your response EXACTLY as bullet points like this:
• Relevance: [score] - [brief one-line explanation]
• Content Match: [score] - [brief one-line explanation]
• Completeness: [score] - [brief one-line explanation]
• Specificity: [score] - [brief one-line explanation]";

const SUMMARIZE_INSTRUCTION: &str = "\
You are a concise summarizer. Create a polished two-sentence summary of the \
user's response.";

fn analyze_instruction(question: &str) -> String {
    format!(
        "You are an answer relevance analyzer. Analyse the ENGLISH answer for \
         relevance to the question: '{question}'. Reply with the key points \
         and a conclusion on relevance."
    )
}

fn extract_instruction(field_name: &str) -> String {
    format!(
        "You are an information extractor filling a form. From the English \
         text, extract the value for the field '{field_name}'. Output ONLY \
         the value."
    )
}

// ---------------------------------------------------------------------------
// Predefined pipelines
// ---------------------------------------------------------------------------

/// The Q&A answer-analysis chain:
/// `translate` → `analyze` → {`score`, `summarize`}.
pub fn answer_analysis_pipeline(question: &str) -> PipelineDefinition {
    PipelineDefinition::new()
        .with_stage(Stage::new("translate", TRANSLATE_INSTRUCTION))
        .with_stage(
            Stage::new("analyze", analyze_instruction(question)).with_dependency("translate"),
        )
        .with_stage(Stage::new("score", SCORE_INSTRUCTION).with_dependency("analyze"))
        .with_stage(Stage::new("summarize", SUMMARIZE_INSTRUCTION).with_dependency("analyze"))
}

/// The form-filler chain: `translate` → `extract`.
pub fn field_extraction_pipeline(field_name: &str) -> PipelineDefinition {
    PipelineDefinition::new()
        .with_stage(Stage::new("translate", TRANSLATE_INSTRUCTION))
        .with_stage(
            Stage::new("extract", extract_instruction(field_name)).with_dependency("translate"),
        )
}

// ---------------------------------------------------------------------------
// Flow responses
// ---------------------------------------------------------------------------

/// Projected outputs of the answer-analysis flow.
///
/// Degraded stages show up as [`STAGE_UNAVAILABLE`] in the corresponding
/// field — the shape is always complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerAnalysis {
    /// English rendering of the answer.
    pub translated_text: String,
    /// Key points and a relevance conclusion.
    pub analysis: String,
    /// Bullet-scored rubric (relevance, content match, completeness,
    /// specificity).
    pub relevancy_score: String,
    /// Two-sentence summary of the answer.
    pub summary: String,
}

impl AnswerAnalysis {
    /// The canned analysis for an empty answer; no stage runs.
    fn no_answer() -> Self {
        Self {
            translated_text: String::new(),
            analysis: String::new(),
            relevancy_score: "N/A".into(),
            summary: "No answer provided.".into(),
        }
    }

    fn from_result(result: &PipelineResult) -> Self {
        Self {
            translated_text: result.text("translate").unwrap_or(STAGE_UNAVAILABLE).into(),
            analysis: result.text("analyze").unwrap_or(STAGE_UNAVAILABLE).into(),
            relevancy_score: result.text("score").unwrap_or(STAGE_UNAVAILABLE).into(),
            summary: result.text("summarize").unwrap_or(STAGE_UNAVAILABLE).into(),
        }
    }
}

/// Projected outputs of the field-extraction flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExtraction {
    /// The extracted form-field value.
    pub field_value: String,
    /// English rendering of the transcript the value was extracted from.
    pub translated_text: String,
}

impl FieldExtraction {
    fn from_result(result: &PipelineResult) -> Self {
        Self {
            field_value: result.text("extract").unwrap_or(STAGE_UNAVAILABLE).into(),
            translated_text: result.text("translate").unwrap_or(STAGE_UNAVAILABLE).into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechService
// ---------------------------------------------------------------------------

/// Facade over the transcription poller and the pipeline executor.
///
/// One instance serves any number of concurrent requests; the only shared
/// resources are the HTTP clients behind the injected seams, which are safe
/// for concurrent use.
pub struct SpeechService {
    poller: JobPoller,
    executor: PipelineExecutor,
    config: SharedConfig,
}

impl SpeechService {
    /// Wire a service over explicit collaborator seams.
    ///
    /// The poll interval is taken from the config at construction time.
    pub fn new(
        job_client: Arc<dyn JobClient>,
        transformer: Arc<dyn TextTransformer>,
        config: SharedConfig,
    ) -> Self {
        let poll_interval =
            Duration::from_secs(config.read().unwrap().transcription.poll_interval_secs);
        Self {
            poller: JobPoller::new(job_client).with_poll_interval(poll_interval),
            executor: PipelineExecutor::new(transformer),
            config,
        }
    }

    /// Production wiring over the bundled HTTP clients.
    pub fn from_config(config: SharedConfig) -> Self {
        let job_client: Arc<dyn JobClient> = Arc::new(HttpJobClient::new(Arc::clone(&config)));
        let transformer: Arc<dyn TextTransformer> =
            Arc::new(ApiTransformer::new(Arc::clone(&config)));
        Self::new(job_client, transformer, config)
    }

    // -----------------------------------------------------------------------
    // Transcription
    // -----------------------------------------------------------------------

    /// Submit `audio` for transcription; returns as soon as the remote
    /// service has accepted the job.
    pub async fn submit_transcription_job(
        &self,
        audio: &[u8],
        options: &JobOptions,
    ) -> Result<JobHandle, TranscribeError> {
        self.poller.submit(audio, options).await
    }

    /// Await the job behind `handle` under an explicit deadline.
    pub async fn await_transcription(
        &self,
        handle: &JobHandle,
        deadline: Duration,
    ) -> Result<Transcription, TranscribeError> {
        self.poller.await_completion(handle, deadline).await
    }

    /// Submit and await in one call, with the deadline from config — the
    /// common path for interactive requests.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        options: &JobOptions,
    ) -> Result<Transcription, TranscribeError> {
        let handle = self.submit_transcription_job(audio, options).await?;
        let deadline =
            Duration::from_secs(self.config.read().unwrap().transcription.deadline_secs);
        self.await_transcription(&handle, deadline).await
    }

    // -----------------------------------------------------------------------
    // Pipelines
    // -----------------------------------------------------------------------

    /// Run a caller-supplied pipeline against `seed`, honouring the
    /// configured aggregate deadline (if any).
    pub async fn run_pipeline(
        &self,
        definition: &PipelineDefinition,
        seed: &SeedInput,
    ) -> Result<PipelineResult, PipelineError> {
        self.executor
            .execute_with_deadline(definition, seed, self.pipeline_deadline())
            .await
    }

    /// Run the Q&A answer-analysis flow.
    ///
    /// An empty answer short-circuits to the canned "No answer provided."
    /// response without invoking any stage.
    pub async fn analyze_answer(
        &self,
        question: &str,
        seed: &SeedInput,
    ) -> Result<AnswerAnalysis, PipelineError> {
        if seed.text.trim().is_empty() {
            return Ok(AnswerAnalysis::no_answer());
        }
        let definition = answer_analysis_pipeline(question);
        let result = self.run_pipeline(&definition, seed).await?;
        Ok(AnswerAnalysis::from_result(&result))
    }

    /// Run the form-field extraction flow.
    pub async fn extract_field(
        &self,
        field_name: &str,
        seed: &SeedInput,
    ) -> Result<FieldExtraction, PipelineError> {
        let definition = field_extraction_pipeline(field_name);
        let result = self.run_pipeline(&definition, seed).await?;
        Ok(FieldExtraction::from_result(&result))
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Replace API keys for subsequent calls.
    pub fn update_credentials(&self, credentials: &ApiCredentials) {
        config::update_credentials(&self.config, credentials);
    }

    fn pipeline_deadline(&self) -> Option<Duration> {
        self.config
            .read()
            .unwrap()
            .pipeline
            .deadline_secs
            .map(Duration::from_secs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
