//! Text-transform module.
//!
//! This module provides:
//! * [`TextTransformer`] — async trait implemented by all transform backends.
//! * [`ApiTransformer`] — OpenAI-compatible REST API backend.
//! * [`TransformContext`] / [`UpstreamOutput`] — what a transform call may
//!   observe beyond its primary input.
//! * [`build_chat`] — assembles the chat messages sent to the API.
//! * [`TransformError`] — error variants for transform operations.
//!
//! The pipeline executor is the main consumer: it holds an
//! `Arc<dyn TextTransformer>` and invokes it once per stage, passing the
//! stage's instruction, its input text, and a context restricted to the
//! stage's declared dependencies.

pub mod prompt;
pub mod transformer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use prompt::build_chat;
pub use transformer::{
    ApiTransformer, TextTransformer, TransformContext, TransformError, UpstreamOutput,
};
