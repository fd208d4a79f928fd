//! Configuration module for voice-inspect.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and the `SharedConfig` handle whose
//! `update_credentials` operation swaps API keys for subsequent calls.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    new_shared_config, update_credentials, ApiCredentials, AppConfig, PipelineConfig,
    SharedConfig, TranscriptionConfig, TransformConfig,
};
