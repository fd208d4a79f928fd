//! Stage, seed-input and result types for the stage pipeline.
//!
//! [`Stage`] is one named unit of text transformation with declared upstream
//! dependencies.  [`StageStatus`] drives the executor's per-stage state
//! machine.  [`PipelineResult`] is the immutable, name-keyed outcome mapping
//! the executor returns — every declared stage is present, degraded stages
//! explicitly so, never inferred from list positions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::transcribe::Transcription;

/// Sentinel output substituted for a stage that failed, lost a dependency, or
/// was never scheduled before the run deadline.  Preserves the result shape.
pub const STAGE_UNAVAILABLE: &str = "<stage unavailable>";

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// A named unit of work with declared upstream dependencies.
///
/// The instruction is opaque to the executor; the dependency list is not —
/// it defines both the execution order and the exact set of upstream outputs
/// the stage may observe.
///
/// # Example
/// ```rust
/// use voice_inspect::pipeline::Stage;
///
/// let analyze = Stage::new("analyze", "Analyse the answer for relevance.")
///     .with_dependency("translate");
/// assert_eq!(analyze.depends_on, vec!["translate".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    /// Unique name within a pipeline.
    pub name: String,
    /// Names of the stages whose outputs must be available before this stage
    /// runs.  Must form an acyclic graph across the pipeline.
    pub depends_on: Vec<String>,
    /// The transformation to apply; opaque to the executor.
    pub instruction: String,
}

impl Stage {
    /// Create a stage with no dependencies.
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
            instruction: instruction.into(),
        }
    }

    /// Declare one upstream dependency (builder style).
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// Returns `true` when the stage has no upstream dependencies.
    pub fn is_root(&self) -> bool {
        self.depends_on.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SeedInput
// ---------------------------------------------------------------------------

/// Initial input of a pipeline run.
///
/// Root stages (no dependencies) take `text` as their primary input; every
/// stage additionally sees the seed metadata in its transform context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedInput {
    /// The seed text (typically a transcript).
    pub text: String,
    /// ISO-639-1 language code of the seed text, when known.
    pub language_code: Option<String>,
    /// Transcription confidence in `[0, 1]`, when the seed came from the
    /// transcription path.
    pub confidence: Option<f32>,
}

impl SeedInput {
    /// A seed with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language_code: None,
            confidence: None,
        }
    }

    /// Attach a language code (builder style).
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }
}

impl From<Transcription> for SeedInput {
    fn from(t: Transcription) -> Self {
        Self {
            text: t.text,
            language_code: Some(t.language_code),
            confidence: Some(t.confidence),
        }
    }
}

// ---------------------------------------------------------------------------
// StageStatus
// ---------------------------------------------------------------------------

/// States of one stage during a pipeline run.
///
/// ```text
/// Pending ──▶ Running ──▶ Succeeded
///    │            └─────▶ Failed
///    └──────────────────▶ Skipped   (dependency failed, or deadline passed)
/// ```
///
/// `Succeeded`, `Failed` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Not yet scheduled.
    Pending,
    /// The transform call is in flight.
    Running,
    /// The transform call produced output text.
    Succeeded,
    /// The transform call failed; the stage degrades to the placeholder.
    Failed,
    /// Never invoked — an ancestor did not succeed, or the run deadline
    /// passed before the stage was scheduled.
    Skipped,
}

impl StageStatus {
    /// Returns `true` for states from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageStatus::Succeeded | StageStatus::Failed | StageStatus::Skipped
        )
    }
}

// ---------------------------------------------------------------------------
// StageOutcome
// ---------------------------------------------------------------------------

/// Terminal outcome of one stage in a finished pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The stage ran and produced output text.
    Completed(String),
    /// The stage ran and the transform failed.
    Failed,
    /// The stage was never invoked: a (transitive) dependency did not
    /// succeed, or the run deadline passed first.
    Skipped,
}

impl StageOutcome {
    /// Output text, with [`STAGE_UNAVAILABLE`] substituted for degraded
    /// stages — the caller always gets a well-shaped string per stage.
    pub fn text(&self) -> &str {
        match self {
            StageOutcome::Completed(text) => text,
            StageOutcome::Failed | StageOutcome::Skipped => STAGE_UNAVAILABLE,
        }
    }

    /// Returns `true` when the stage did not produce real output.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, StageOutcome::Completed(_))
    }
}

// ---------------------------------------------------------------------------
// PipelineResult
// ---------------------------------------------------------------------------

/// Immutable result of a pipeline run: every declared stage name maps to a
/// terminal [`StageOutcome`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    outcomes: BTreeMap<String, StageOutcome>,
}

impl PipelineResult {
    pub(crate) fn insert(&mut self, stage: impl Into<String>, outcome: StageOutcome) {
        self.outcomes.insert(stage.into(), outcome);
    }

    /// Outcome of `stage`, or `None` when the pipeline declared no such stage.
    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.get(stage)
    }

    /// Output text of `stage` (placeholder when degraded), or `None` when the
    /// pipeline declared no such stage.
    pub fn text(&self, stage: &str) -> Option<&str> {
        self.outcomes.get(stage).map(StageOutcome::text)
    }

    /// Returns `true` when `stage` exists and did not produce real output.
    pub fn is_degraded(&self, stage: &str) -> bool {
        self.outcomes
            .get(stage)
            .is_some_and(StageOutcome::is_degraded)
    }

    /// Number of stages in the result.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns `true` when the result holds no stages.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate over `(stage name, outcome)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StageOutcome)> {
        self.outcomes.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- StageStatus ---

    #[test]
    fn pending_and_running_are_not_terminal() {
        assert!(!StageStatus::Pending.is_terminal());
        assert!(!StageStatus::Running.is_terminal());
    }

    #[test]
    fn succeeded_failed_skipped_are_terminal() {
        assert!(StageStatus::Succeeded.is_terminal());
        assert!(StageStatus::Failed.is_terminal());
        assert!(StageStatus::Skipped.is_terminal());
    }

    // ---- Stage ---

    #[test]
    fn new_stage_has_no_dependencies() {
        let stage = Stage::new("translate", "Translate to English.");
        assert!(stage.is_root());
        assert_eq!(stage.name, "translate");
    }

    #[test]
    fn with_dependency_appends_in_order() {
        let stage = Stage::new("merge", "Merge the outputs.")
            .with_dependency("a")
            .with_dependency("b");
        assert_eq!(stage.depends_on, vec!["a".to_string(), "b".to_string()]);
        assert!(!stage.is_root());
    }

    // ---- SeedInput ---

    #[test]
    fn seed_from_transcription_carries_metadata() {
        let seed: SeedInput = Transcription {
            text: "hello".into(),
            language_code: "en".into(),
            confidence: 0.93,
        }
        .into();

        assert_eq!(seed.text, "hello");
        assert_eq!(seed.language_code.as_deref(), Some("en"));
        assert_eq!(seed.confidence, Some(0.93));
    }

    // ---- StageOutcome ---

    #[test]
    fn completed_outcome_exposes_text() {
        let outcome = StageOutcome::Completed("result".into());
        assert_eq!(outcome.text(), "result");
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn degraded_outcomes_render_placeholder() {
        assert_eq!(StageOutcome::Failed.text(), STAGE_UNAVAILABLE);
        assert_eq!(StageOutcome::Skipped.text(), STAGE_UNAVAILABLE);
        assert!(StageOutcome::Failed.is_degraded());
        assert!(StageOutcome::Skipped.is_degraded());
    }

    // ---- PipelineResult ---

    #[test]
    fn result_lookup_by_name() {
        let mut result = PipelineResult::default();
        result.insert("translate", StageOutcome::Completed("hello".into()));
        result.insert("score", StageOutcome::Skipped);

        assert_eq!(result.text("translate"), Some("hello"));
        assert_eq!(result.text("score"), Some(STAGE_UNAVAILABLE));
        assert_eq!(result.text("missing"), None);
        assert!(result.is_degraded("score"));
        assert!(!result.is_degraded("translate"));
        assert!(!result.is_degraded("missing"));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn empty_result_reports_empty() {
        let result = PipelineResult::default();
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }
}
