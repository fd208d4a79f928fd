//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Credentials are never process-wide globals: the whole [`AppConfig`] is
//! threaded explicitly into the HTTP clients, either by value or behind a
//! [`SharedConfig`] handle whose [`update_credentials`] operation swaps the
//! API keys for subsequent calls.

use std::sync::{Arc, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Settings for the remote transcription service and the job poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Base URL of the transcription API.
    pub base_url: String,
    /// API key — `None` until configured by the caller.
    pub api_key: Option<String>,
    /// Seconds between consecutive job-status polls.
    pub poll_interval_secs: u64,
    /// Hard deadline in seconds for the whole await-completion operation.
    pub deadline_secs: u64,
    /// Per-request HTTP timeout in seconds (independent of the deadline).
    pub request_timeout_secs: u64,
    /// Remote speech model identifier (e.g. `"nano"` for speed, `"best"` for
    /// accuracy).
    pub speech_model: String,
    /// Ask the service to insert punctuation.
    pub punctuate: bool,
    /// Ask the service to format numbers, currencies, etc. as text.
    pub format_text: bool,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.assemblyai.com".into(),
            api_key: None,
            poll_interval_secs: 1,
            deadline_secs: 180,
            request_timeout_secs: 30,
            speech_model: "nano".into(),
            punctuate: true,
            format_text: true,
        }
    }
}

// ---------------------------------------------------------------------------
// TransformConfig
// ---------------------------------------------------------------------------

/// Settings for the text-transform (LLM) backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Base URL of the API endpoint.
    ///
    /// - OpenAI: `https://api.openai.com`
    /// - Any OpenAI-compatible provider works (Groq, Together.ai, vLLM …).
    pub base_url: String,
    /// API key — `None` for local providers that require no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for a transform response before timing out.
    pub timeout_secs: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o".into(),
            temperature: 0.2,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Settings for the stage pipeline executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Optional aggregate deadline in seconds for one pipeline run.  Once
    /// exceeded, no further stage is scheduled and the remaining stages are
    /// reported with the placeholder output.  `None` = no deadline.
    pub deadline_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { deadline_secs: None }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_inspect::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote transcription service settings.
    pub transcription: TranscriptionConfig,
    /// Text-transform (LLM) backend settings.
    pub transform: TransformConfig,
    /// Stage pipeline executor settings.
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply a credential update, replacing only the keys that are present.
    pub fn apply_credentials(&mut self, credentials: &ApiCredentials) {
        if let Some(key) = &credentials.transcription_key {
            self.transcription.api_key = Some(key.clone());
        }
        if let Some(key) = &credentials.transform_key {
            self.transform.api_key = Some(key.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// SharedConfig
// ---------------------------------------------------------------------------

/// Thread-safe, read-mostly handle to [`AppConfig`].
///
/// Cheap to clone (`Arc` clone).  The HTTP clients snapshot the relevant
/// section on every request, so a credential update through
/// [`update_credentials`] applies to all subsequent calls without rebuilding
/// the clients.  Lock for a short critical section; do **not** hold the lock
/// across `.await` points.
pub type SharedConfig = Arc<RwLock<AppConfig>>;

/// Construct a new [`SharedConfig`] wrapping the given [`AppConfig`].
pub fn new_shared_config(config: AppConfig) -> SharedConfig {
    Arc::new(RwLock::new(config))
}

/// A narrow credential update: `None` fields leave the current key untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCredentials {
    /// New transcription-service API key, if it should change.
    pub transcription_key: Option<String>,
    /// New transform-backend API key, if it should change.
    pub transform_key: Option<String>,
}

/// Replace API keys in `config` for all subsequent calls.
pub fn update_credentials(config: &SharedConfig, credentials: &ApiCredentials) {
    let mut cfg = config.write().unwrap();
    cfg.apply_credentials(credentials);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
