//! Stage pipeline module.
//!
//! A pipeline is a DAG of named [`Stage`]s sharing one [`SeedInput`],
//! executed by [`PipelineExecutor`] to produce one name-keyed
//! [`PipelineResult`].
//!
//! # Architecture
//!
//! ```text
//! PipelineDefinition (declaration-ordered stages, validated DAG)
//!        │
//!        ▼
//! PipelineExecutor::execute(definition, seed)
//!        │
//!        ├─ validate + topological order (declaration-order tie-break)
//!        ├─ per stage, sequentially:
//!        │     input   = seed text (root) | dependency outputs (dependent)
//!        │     context = seed metadata + declared dependencies' outputs
//!        │     TextTransformer::transform(instruction, input, context)
//!        │        ├─ Ok  → Succeeded, output stored
//!        │        └─ Err → Failed; transitive dependents → Skipped
//!        │
//!        └─ PipelineResult: every stage name → Completed | Failed | Skipped
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voice_inspect::config::{new_shared_config, AppConfig};
//! use voice_inspect::pipeline::{PipelineDefinition, PipelineExecutor, SeedInput, Stage};
//! use voice_inspect::transform::ApiTransformer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = new_shared_config(AppConfig::default());
//!     let executor = PipelineExecutor::new(Arc::new(ApiTransformer::new(config)));
//!
//!     let definition = PipelineDefinition::new()
//!         .with_stage(Stage::new("translate", "Translate the input to English."))
//!         .with_stage(
//!             Stage::new("summarize", "Summarise in two sentences.")
//!                 .with_dependency("translate"),
//!         );
//!
//!     let seed = SeedInput::new("Bonjour, je m'appelle Claude").with_language("fr");
//!     let result = executor.execute(&definition, &seed).await.unwrap();
//!     println!("{}", result.text("summarize").unwrap());
//! }
//! ```

pub mod definition;
pub mod executor;
pub mod stage;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use definition::{PipelineDefinition, PipelineError};
pub use executor::PipelineExecutor;
pub use stage::{
    PipelineResult, SeedInput, Stage, StageOutcome, StageStatus, STAGE_UNAVAILABLE,
};
