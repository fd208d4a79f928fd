//! Core `TextTransformer` trait and `ApiTransformer` implementation.
//!
//! `ApiTransformer` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint — OpenAI, Groq, Together.ai, vLLM, etc.  All connection details
//! come from the [`SharedConfig`] handle; nothing is hardcoded, and a
//! credential update through the handle applies to subsequent requests.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{SharedConfig, TransformConfig};
use crate::transform::prompt::build_chat;

// ---------------------------------------------------------------------------
// TransformError
// ---------------------------------------------------------------------------

/// Errors that can occur during a text transform.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The backing model call could not be completed (connection failure,
    /// timeout, quota, malformed response).
    #[error("transform backend unavailable: {0}")]
    Unavailable(String),

    /// The call succeeded but yielded no usable text.
    #[error("transform returned an empty response")]
    EmptyOutput,
}

impl From<reqwest::Error> for TransformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransformError::Unavailable("request timed out".into())
        } else {
            TransformError::Unavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TransformContext
// ---------------------------------------------------------------------------

/// One named upstream output visible to a transform call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamOutput {
    /// Name of the stage that produced the output.
    pub stage: String,
    /// The output text.
    pub output: String,
}

/// Upstream information visible to a transform call.
///
/// The executor fills this with the seed transcript metadata plus the named
/// outputs of exactly the stages the calling stage declared as dependencies —
/// never a sibling's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformContext {
    /// ISO-639-1 language code of the seed transcript, when known.
    pub language_code: Option<String>,
    /// The seed transcript text.
    pub source_text: Option<String>,
    /// Declared dependencies' outputs, in dependency-declaration order.
    pub upstream: Vec<UpstreamOutput>,
}

impl TransformContext {
    /// Context carrying only seed metadata (for stages with no dependencies).
    pub fn from_seed(text: impl Into<String>, language_code: Option<String>) -> Self {
        Self {
            language_code,
            source_text: Some(text.into()),
            upstream: Vec::new(),
        }
    }

    /// Append one upstream output (builder style).
    pub fn with_upstream(
        mut self,
        stage: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.upstream.push(UpstreamOutput {
            stage: stage.into(),
            output: output.into(),
        });
        self
    }
}

// ---------------------------------------------------------------------------
// TextTransformer trait
// ---------------------------------------------------------------------------

/// Async trait for instruction-driven text transformation.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn TextTransformer>`).
///
/// # Contract
///
/// Given identical `(instruction, input, context)` the implementation may
/// legitimately return different text — model output is non-deterministic.
/// Callers may rely on shape only: a successful call returns non-empty text,
/// an empty model response is reported as [`TransformError::EmptyOutput`].
///
/// # Arguments
/// * `instruction` – What to do with the input; opaque to the caller.
/// * `input`       – The primary text to transform.
/// * `context`     – Seed metadata and declared upstream outputs.
#[async_trait]
pub trait TextTransformer: Send + Sync {
    async fn transform(
        &self,
        instruction: &str,
        input: &str,
        context: &TransformContext,
    ) -> Result<String, TransformError>;
}

// ---------------------------------------------------------------------------
// ApiTransformer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The HTTP client is pre-configured with the per-request timeout from
/// `config.transform.timeout_secs`.  The API key, base URL and model are
/// re-read from the [`SharedConfig`] on every request, so
/// [`update_credentials`](crate::config::update_credentials) takes effect
/// without rebuilding the transformer.
pub struct ApiTransformer {
    client: reqwest::Client,
    config: SharedConfig,
}

impl ApiTransformer {
    /// Build an `ApiTransformer` from a shared configuration handle.
    ///
    /// A default (no-timeout) client is used as a last-resort fallback if the
    /// builder fails (should never happen in practice).
    pub fn new(config: SharedConfig) -> Self {
        let timeout_secs = config.read().unwrap().transform.timeout_secs;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    /// Snapshot the transform section of the shared config.
    fn snapshot(&self) -> TransformConfig {
        self.config.read().unwrap().transform.clone()
    }
}

#[async_trait]
impl TextTransformer for ApiTransformer {
    /// Send the assembled chat prompt to the configured endpoint.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when the
    /// configured API key is non-empty — safe for local providers that
    /// require no authentication.
    async fn transform(
        &self,
        instruction: &str,
        input: &str,
        context: &TransformContext,
    ) -> Result<String, TransformError> {
        let config = self.snapshot();
        let (system_msg, user_msg) = build_chat(instruction, input, context);

        let url = format!("{}/v1/chat/completions", config.base_url);

        let body = serde_json::json!({
            "model":       config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": config.temperature,
        });

        let mut req = self.client.post(&url).json(&body);

        let key = config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransformError::Unavailable(format!("malformed response: {e}")))?;

        let output = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(TransformError::EmptyOutput)?
            .trim()
            .to_string();

        if output.is_empty() {
            return Err(TransformError::EmptyOutput);
        }

        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
