//! Pipeline executor — dependency-ordered, degradation-tolerant stage runs.
//!
//! [`PipelineExecutor`] validates a [`PipelineDefinition`], computes its
//! deterministic execution order, and runs the stages one at a time over an
//! `Arc<dyn TextTransformer>`.
//!
//! # Failure policy
//!
//! A failing stage never aborts the run.  The failing stage and every stage
//! that (transitively) depends on it degrade to the placeholder outcome;
//! stages with no path from the failure still execute normally.  The caller
//! therefore always receives a complete, name-keyed [`PipelineResult`] —
//! the only hard error is an invalid definition, which is rejected before
//! any stage runs.
//!
//! # Ordering guarantees
//!
//! A stage is never invoked before all of its dependencies have reached a
//! terminal state, and the context it observes holds exactly the terminal
//! outputs of its declared dependencies plus the seed input.  Execution is
//! sequential; the stage graph encodes genuine data dependencies, so order
//! is a correctness requirement, not an optimisation artefact.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::pipeline::definition::{PipelineDefinition, PipelineError};
use crate::pipeline::stage::{PipelineResult, SeedInput, Stage, StageOutcome, StageStatus};
use crate::transform::{TextTransformer, TransformContext, UpstreamOutput};

// ---------------------------------------------------------------------------
// PipelineExecutor
// ---------------------------------------------------------------------------

/// Executes pipelines over a shared [`TextTransformer`].
///
/// The executor holds no per-run state; one instance is safe to use for any
/// number of concurrent runs.
pub struct PipelineExecutor {
    transformer: Arc<dyn TextTransformer>,
}

impl PipelineExecutor {
    /// Create an executor over `transformer`.
    pub fn new(transformer: Arc<dyn TextTransformer>) -> Self {
        Self { transformer }
    }

    /// Run `definition` against `seed` with no aggregate deadline.
    pub async fn execute(
        &self,
        definition: &PipelineDefinition,
        seed: &SeedInput,
    ) -> Result<PipelineResult, PipelineError> {
        self.execute_with_deadline(definition, seed, None).await
    }

    /// Run `definition` against `seed`.
    ///
    /// When `deadline` is set and elapses mid-run, no further stage is
    /// scheduled: every unscheduled stage is reported as skipped.  Stages
    /// already completed keep their real output.
    ///
    /// # Errors
    ///
    /// [`PipelineError`] when the definition is invalid (duplicate name,
    /// unresolved dependency, cycle).  Nothing has been executed in that
    /// case.
    pub async fn execute_with_deadline(
        &self,
        definition: &PipelineDefinition,
        seed: &SeedInput,
        deadline: Option<Duration>,
    ) -> Result<PipelineResult, PipelineError> {
        let order = definition.execution_order()?;
        let stages = definition.stages();
        let started = Instant::now();

        let mut statuses = vec![StageStatus::Pending; stages.len()];
        let mut outputs: HashMap<&str, String> = HashMap::new();

        for &i in &order {
            let stage = &stages[i];

            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    log::warn!(
                        "pipeline: deadline exceeded — skipping stage `{}`",
                        stage.name
                    );
                    statuses[i] = StageStatus::Skipped;
                    continue;
                }
            }

            // A stage runs only when every declared dependency succeeded;
            // otherwise it degrades without being invoked.
            if let Some(dependency) = stage
                .depends_on
                .iter()
                .find(|d| !outputs.contains_key(d.as_str()))
            {
                log::warn!(
                    "pipeline: skipping stage `{}` — dependency `{dependency}` did not succeed",
                    stage.name
                );
                statuses[i] = StageStatus::Skipped;
                continue;
            }

            let (input, context) = stage_input(stage, seed, &outputs);

            statuses[i] = StageStatus::Running;
            log::debug!("pipeline: running stage `{}`", stage.name);

            match self
                .transformer
                .transform(&stage.instruction, &input, &context)
                .await
            {
                Ok(text) => {
                    statuses[i] = StageStatus::Succeeded;
                    outputs.insert(stage.name.as_str(), text);
                }
                Err(e) => {
                    statuses[i] = StageStatus::Failed;
                    log::warn!("pipeline: stage `{}` failed: {e}", stage.name);
                }
            }
        }

        // Assemble the result: every declared stage gets a terminal outcome.
        let mut result = PipelineResult::default();
        for (i, stage) in stages.iter().enumerate() {
            let outcome = match statuses[i] {
                StageStatus::Succeeded => match outputs.remove(stage.name.as_str()) {
                    Some(text) => StageOutcome::Completed(text),
                    None => StageOutcome::Skipped,
                },
                StageStatus::Failed => StageOutcome::Failed,
                StageStatus::Pending | StageStatus::Running | StageStatus::Skipped => {
                    StageOutcome::Skipped
                }
            };
            result.insert(stage.name.clone(), outcome);
        }

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a stage's primary input and transform context.
///
/// Root stages take the seed text as input.  Dependent stages take their
/// declared dependencies' outputs (in dependency-declaration order) joined
/// as input, so downstream work derives from upstream results rather than
/// the raw seed.  The seed metadata rides along in the context either way.
fn stage_input(
    stage: &Stage,
    seed: &SeedInput,
    outputs: &HashMap<&str, String>,
) -> (String, TransformContext) {
    let mut context = TransformContext {
        language_code: seed.language_code.clone(),
        source_text: Some(seed.text.clone()),
        upstream: Vec::new(),
    };

    if stage.is_root() {
        return (seed.text.clone(), context);
    }

    let mut parts: Vec<&str> = Vec::with_capacity(stage.depends_on.len());
    for dependency in &stage.depends_on {
        if context.upstream.iter().any(|u| &u.stage == dependency) {
            continue;
        }
        if let Some(output) = outputs.get(dependency.as_str()) {
            context.upstream.push(UpstreamOutput {
                stage: dependency.clone(),
                output: output.clone(),
            });
            parts.push(output);
        }
    }

    (parts.join("\n\n"), context)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stage::STAGE_UNAVAILABLE;
    use crate::transform::TransformError;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// One recorded transform invocation.
    #[derive(Debug, Clone)]
    struct RecordedCall {
        instruction: String,
        input: String,
        context: TransformContext,
    }

    /// Records every call; responds from a script keyed by instruction, or
    /// echoes `[instruction] input` when unscripted.
    struct ScriptedTransformer {
        responses: HashMap<String, String>,
        failures: HashSet<String>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedTransformer {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                failures: HashSet::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_response(mut self, instruction: &str, output: &str) -> Self {
            self.responses.insert(instruction.into(), output.into());
            self
        }

        fn with_failure(mut self, instruction: &str) -> Self {
            self.failures.insert(instruction.into());
            self
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        fn call_for(&self, instruction: &str) -> Option<RecordedCall> {
            self.calls()
                .into_iter()
                .find(|c| c.instruction == instruction)
        }
    }

    #[async_trait]
    impl TextTransformer for ScriptedTransformer {
        async fn transform(
            &self,
            instruction: &str,
            input: &str,
            context: &TransformContext,
        ) -> Result<String, TransformError> {
            self.calls.lock().unwrap().push(RecordedCall {
                instruction: instruction.into(),
                input: input.into(),
                context: context.clone(),
            });

            if self.failures.contains(instruction) {
                return Err(TransformError::Unavailable("scripted failure".into()));
            }
            match self.responses.get(instruction) {
                Some(output) => Ok(output.clone()),
                None => Ok(format!("[{instruction}] {input}")),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Stages in these tests use the stage name as instruction so the
    /// scripted transformer can dispatch on it.
    fn stage(name: &str) -> Stage {
        Stage::new(name, name)
    }

    fn executor(transformer: Arc<ScriptedTransformer>) -> PipelineExecutor {
        PipelineExecutor::new(transformer)
    }

    fn seed() -> SeedInput {
        SeedInput::new("seed text").with_language("en")
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// A single stage with no dependencies yields exactly what one direct
    /// transform call over the seed input yields.
    #[tokio::test]
    async fn single_stage_matches_direct_transform() {
        let transformer = Arc::new(ScriptedTransformer::new());
        let definition = PipelineDefinition::new().with_stage(stage("translate"));

        let result = executor(Arc::clone(&transformer))
            .execute(&definition, &seed())
            .await
            .unwrap();

        let direct = transformer
            .transform(
                "translate",
                "seed text",
                &TransformContext::from_seed("seed text", Some("en".into())),
            )
            .await
            .unwrap();

        assert_eq!(result.text("translate"), Some(direct.as_str()));
    }

    /// A stage's context holds exactly the outputs of its declared
    /// dependencies plus the seed input — never a sibling's output.
    #[tokio::test]
    async fn context_is_restricted_to_declared_dependencies() {
        let transformer = Arc::new(ScriptedTransformer::new());
        // a and b are independent; c depends only on b.
        let definition = PipelineDefinition::new()
            .with_stage(stage("a"))
            .with_stage(stage("b"))
            .with_stage(stage("c").with_dependency("b"));

        executor(Arc::clone(&transformer))
            .execute(&definition, &seed())
            .await
            .unwrap();

        let call = transformer.call_for("c").unwrap();
        let upstream_names: Vec<&str> =
            call.context.upstream.iter().map(|u| u.stage.as_str()).collect();

        assert_eq!(upstream_names, vec!["b"], "c must see b and only b");
        assert_eq!(call.context.source_text.as_deref(), Some("seed text"));
        assert_eq!(call.context.language_code.as_deref(), Some("en"));
        assert_eq!(call.input, "[b] seed text");
    }

    /// Independent stages start in declaration order, reproducibly.
    #[tokio::test]
    async fn independent_stages_start_in_declaration_order() {
        let transformer = Arc::new(ScriptedTransformer::new());
        let definition = PipelineDefinition::new()
            .with_stage(stage("a"))
            .with_stage(stage("b"));

        executor(Arc::clone(&transformer))
            .execute(&definition, &seed())
            .await
            .unwrap();

        let order: Vec<String> = transformer
            .calls()
            .into_iter()
            .map(|c| c.instruction)
            .collect();
        assert_eq!(order, vec!["a".to_string(), "b".to_string()]);
    }

    /// A failed stage degrades itself and its transitive dependents; an
    /// unrelated sibling still produces real output.
    #[tokio::test]
    async fn failure_degrades_transitively_but_not_siblings() {
        let transformer = Arc::new(ScriptedTransformer::new().with_failure("x"));
        let definition = PipelineDefinition::new()
            .with_stage(stage("x"))
            .with_stage(stage("y").with_dependency("x"))
            .with_stage(stage("w").with_dependency("y"))
            .with_stage(stage("z"));

        let result = executor(Arc::clone(&transformer))
            .execute(&definition, &seed())
            .await
            .unwrap();

        assert_eq!(result.outcome("x"), Some(&StageOutcome::Failed));
        assert_eq!(result.outcome("y"), Some(&StageOutcome::Skipped));
        assert_eq!(result.outcome("w"), Some(&StageOutcome::Skipped));
        assert_eq!(result.text("y"), Some(STAGE_UNAVAILABLE));
        assert_eq!(result.text("z"), Some("[z] seed text"));

        // y and w were never invoked.
        let invoked: Vec<String> = transformer
            .calls()
            .into_iter()
            .map(|c| c.instruction)
            .collect();
        assert_eq!(invoked, vec!["x".to_string(), "z".to_string()]);
    }

    /// A cyclic definition is rejected before any stage executes.
    #[tokio::test]
    async fn cycle_is_rejected_before_any_execution() {
        let transformer = Arc::new(ScriptedTransformer::new());
        let definition = PipelineDefinition::new()
            .with_stage(stage("a").with_dependency("b"))
            .with_stage(stage("b").with_dependency("a"));

        let err = executor(Arc::clone(&transformer))
            .execute(&definition, &seed())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::CycleDetected(_)));
        assert!(transformer.calls().is_empty(), "no stage may have run");
    }

    /// An exhausted deadline stops scheduling; unscheduled stages get the
    /// placeholder while completed stages keep their output.
    #[tokio::test]
    async fn deadline_skips_unscheduled_stages() {
        let transformer = Arc::new(ScriptedTransformer::new());
        let definition = PipelineDefinition::new()
            .with_stage(stage("a"))
            .with_stage(stage("b"));

        let result = executor(Arc::clone(&transformer))
            .execute_with_deadline(&definition, &seed(), Some(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(result.outcome("a"), Some(&StageOutcome::Skipped));
        assert_eq!(result.outcome("b"), Some(&StageOutcome::Skipped));
        assert!(transformer.calls().is_empty());
    }

    /// Every declared stage is present in the result, degraded or not.
    #[tokio::test]
    async fn result_covers_every_declared_stage() {
        let transformer = Arc::new(ScriptedTransformer::new().with_failure("b"));
        let definition = PipelineDefinition::new()
            .with_stage(stage("a"))
            .with_stage(stage("b"))
            .with_stage(stage("c").with_dependency("b"));

        let result = executor(transformer)
            .execute(&definition, &seed())
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        for name in ["a", "b", "c"] {
            assert!(result.outcome(name).is_some(), "missing stage `{name}`");
        }
    }

    /// End to end: a French answer flows through translate → analyze →
    /// {score, summarize}; the scoring and summary stages derive from the
    /// analysis, never the raw French seed.
    #[tokio::test]
    async fn end_to_end_french_answer_analysis() {
        let transformer = Arc::new(
            ScriptedTransformer::new()
                .with_response("translate", "Hello, my name is Claude")
                .with_response("analyze", "The answer is a short self-introduction.")
                .with_response("score", "• Relevance: 7")
                .with_response("summarize", "The speaker introduces themselves."),
        );

        let definition = PipelineDefinition::new()
            .with_stage(stage("translate"))
            .with_stage(stage("analyze").with_dependency("translate"))
            .with_stage(stage("score").with_dependency("analyze"))
            .with_stage(stage("summarize").with_dependency("analyze"));

        let seed = SeedInput::new("Bonjour, je m'appelle Claude").with_language("fr");

        let result = executor(Arc::clone(&transformer))
            .execute(&definition, &seed)
            .await
            .unwrap();

        // All four keys, all real output.
        for name in ["translate", "analyze", "score", "summarize"] {
            assert!(!result.is_degraded(name), "stage `{name}` degraded");
        }

        // translate consumed the raw seed.
        let translate = transformer.call_for("translate").unwrap();
        assert_eq!(translate.input, "Bonjour, je m'appelle Claude");

        // analyze consumed translate's output as context and input.
        let analyze = transformer.call_for("analyze").unwrap();
        assert_eq!(analyze.input, "Hello, my name is Claude");
        assert_eq!(analyze.context.upstream.len(), 1);
        assert_eq!(analyze.context.upstream[0].stage, "translate");

        // score and summarize derive from analyze's output, never the raw
        // French seed.
        for name in ["score", "summarize"] {
            let call = transformer.call_for(name).unwrap();
            assert_eq!(call.input, "The answer is a short self-introduction.");
            assert!(!call.input.contains("Bonjour"));
            let upstream: Vec<&str> =
                call.context.upstream.iter().map(|u| u.stage.as_str()).collect();
            assert_eq!(upstream, vec!["analyze"]);
        }
    }

    /// A multi-dependency stage receives its inputs in dependency-declaration
    /// order.
    #[tokio::test]
    async fn multi_dependency_input_is_declaration_ordered() {
        let transformer = Arc::new(
            ScriptedTransformer::new()
                .with_response("first", "ONE")
                .with_response("second", "TWO"),
        );
        let definition = PipelineDefinition::new()
            .with_stage(stage("second"))
            .with_stage(stage("first"))
            .with_stage(
                stage("merge")
                    .with_dependency("first")
                    .with_dependency("second"),
            );

        executor(Arc::clone(&transformer))
            .execute(&definition, &seed())
            .await
            .unwrap();

        let merge = transformer.call_for("merge").unwrap();
        // depends_on order, not pipeline declaration order.
        assert_eq!(merge.input, "ONE\n\nTWO");
    }
}
