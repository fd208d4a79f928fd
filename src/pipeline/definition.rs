//! Pipeline definition — a validated DAG of named stages.
//!
//! [`PipelineDefinition`] holds stages in declaration order and checks, before
//! anything runs, that stage names are unique, every dependency resolves
//! within the pipeline, and the dependency graph is acyclic.  A definition
//! that fails validation is a programming error ([`PipelineError`]), not a
//! runtime condition — stage graphs are static or constructed from trusted
//! caller input, never from end-user data.

use std::collections::HashMap;

use thiserror::Error;

use crate::pipeline::stage::Stage;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// An invalid pipeline definition.  Fatal for the whole call: the executor
/// rejects the definition before any stage runs, and degradation never masks
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Two stages share the same name.
    #[error("duplicate stage name `{0}`")]
    DuplicateStage(String),

    /// A stage references a dependency that is not part of the pipeline.
    #[error("stage `{stage}` depends on unknown stage `{dependency}`")]
    UnknownDependency {
        /// The stage declaring the dependency.
        stage: String,
        /// The name that failed to resolve.
        dependency: String,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle involving stage `{0}`")]
    CycleDetected(String),
}

// ---------------------------------------------------------------------------
// PipelineDefinition
// ---------------------------------------------------------------------------

/// A declaration-ordered collection of [`Stage`]s forming a DAG.
///
/// Constructed once per request and discarded after the run — no
/// cross-request state.
///
/// # Example
/// ```rust
/// use voice_inspect::pipeline::{PipelineDefinition, Stage};
///
/// let definition = PipelineDefinition::new()
///     .with_stage(Stage::new("translate", "Translate to English."))
///     .with_stage(
///         Stage::new("summarize", "Summarise in two sentences.")
///             .with_dependency("translate"),
///     );
/// assert!(definition.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineDefinition {
    stages: Vec<Stage>,
}

impl PipelineDefinition {
    /// An empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder style).  Declaration order is significant: it
    /// breaks scheduling ties between independent stages.
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a stage in place.
    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    /// The stages in declaration order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Look up a stage by name.
    pub fn get(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` when the definition holds no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    // -----------------------------------------------------------------------
    // Validation and ordering
    // -----------------------------------------------------------------------

    /// Validate name uniqueness, dependency resolution and acyclicity.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.execution_order().map(|_| ())
    }

    /// Compute the execution order: a topological order over stage indices in
    /// which every stage is scheduled strictly after all of its dependencies.
    /// Ties among independent stages are broken by declaration order, so the
    /// result is deterministic and reproducible.
    pub fn execution_order(&self) -> Result<Vec<usize>, PipelineError> {
        // Name → declaration index, rejecting duplicates.
        let mut index_of: HashMap<&str, usize> = HashMap::with_capacity(self.stages.len());
        for (i, stage) in self.stages.iter().enumerate() {
            if index_of.insert(stage.name.as_str(), i).is_some() {
                return Err(PipelineError::DuplicateStage(stage.name.clone()));
            }
        }

        // Build the edge lists, resolving every dependency.  Duplicate
        // entries in a depends_on list count once — it is a set.
        let n = self.stages.len();
        let mut indegree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, stage) in self.stages.iter().enumerate() {
            let mut seen: Vec<usize> = Vec::with_capacity(stage.depends_on.len());
            for dependency in &stage.depends_on {
                let dep_index = *index_of.get(dependency.as_str()).ok_or_else(|| {
                    PipelineError::UnknownDependency {
                        stage: stage.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                if seen.contains(&dep_index) {
                    continue;
                }
                seen.push(dep_index);
                indegree[i] += 1;
                dependents[dep_index].push(i);
            }
        }

        // Kahn's algorithm.  The ready set is kept ordered by declaration
        // index (BTreeSet), so independent stages run in declaration order.
        let mut ready: std::collections::BTreeSet<usize> = (0..n)
            .filter(|&i| indegree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(n);

        while let Some(&i) = ready.iter().next() {
            ready.remove(&i);
            order.push(i);
            for &dependent in &dependents[i] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < n {
            // Every unscheduled stage sits on a cycle (or downstream of one);
            // report the first in declaration order for a stable message.
            let culprit = (0..n)
                .find(|i| !order.contains(i))
                .map(|i| self.stages[i].name.clone())
                .unwrap_or_default();
            return Err(PipelineError::CycleDetected(culprit));
        }

        Ok(order)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
