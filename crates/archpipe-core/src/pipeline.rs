//! Stage/action topology of the pipeline.
//!
//! Stages form a strict linear chain: each stage is placed immediately
//! after its predecessor and no stage starts until every action in the
//! prior stage has finished. Within a stage, actions sharing a run order
//! execute concurrently; a higher run order waits for all lower ones
//! (barrier semantics). Halt-on-failure between stages is the platform
//! default and not modeled here.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::env::EnvOverlay;
use crate::error::{Result, TopologyError};
use crate::job::BuildJob;

/// What an action does when its stage runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ActionKind {
    /// Check out a branch of the source repository into an artifact.
    SourceCheckout {
        repository: String,
        branch: String,
        output: String,
    },

    /// Run a build job against an input artifact.
    Build {
        job: String,
        input: String,
        env: EnvOverlay,
    },
}

/// A single action bound to a stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Action {
    pub name: String,

    /// Intra-stage ordering: equal values run concurrently, higher values
    /// wait for all lower ones. Must be >= 1.
    pub run_order: u32,

    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    /// A checkout action producing the shared source artifact.
    pub fn source_checkout(
        name: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            run_order: 1,
            kind: ActionKind::SourceCheckout {
                repository: repository.into(),
                branch: branch.into(),
                output: output.into(),
            },
        }
    }

    /// A build action invoking `job` with the given overlay.
    pub fn build(
        name: impl Into<String>,
        job: impl Into<String>,
        input: impl Into<String>,
        env: EnvOverlay,
        run_order: u32,
    ) -> Self {
        Self {
            name: name.into(),
            run_order,
            kind: ActionKind::Build {
                job: job.into(),
                input: input.into(),
                env,
            },
        }
    }
}

/// An ordered pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    /// Append an action. Action names are unique within a stage and run
    /// orders start at 1.
    pub fn add_action(&mut self, action: Action) -> Result<()> {
        if action.run_order == 0 {
            return Err(TopologyError::ZeroRunOrder);
        }
        if self.actions.iter().any(|a| a.name == action.name) {
            return Err(TopologyError::DuplicateAction {
                stage: self.name.clone(),
                action: action.name,
            });
        }
        self.actions.push(action);
        Ok(())
    }

    /// Actions grouped by run order, ascending. Each group is a set of
    /// actions the platform may run concurrently; groups are separated by
    /// barriers.
    pub fn concurrency_groups(&self) -> BTreeMap<u32, Vec<&Action>> {
        let mut groups: BTreeMap<u32, Vec<&Action>> = BTreeMap::new();
        for action in &self.actions {
            groups.entry(action.run_order).or_default().push(action);
        }
        groups
    }
}

/// Where to place a stage in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// First stage of the pipeline.
    First,
    /// Immediately after the named stage, which must be the current tail.
    JustAfter(String),
}

/// The full pipeline: a strict linear chain of stages plus the build jobs
/// its actions reference. Built once at synthesis and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineTopology {
    pub name: String,

    /// Name of the shared source artifact every build action consumes.
    pub source_artifact: String,

    pub stages: Vec<Stage>,
    pub jobs: Vec<BuildJob>,
}

impl PipelineTopology {
    pub fn new(name: impl Into<String>, source_artifact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_artifact: source_artifact.into(),
            stages: Vec::new(),
            jobs: Vec::new(),
        }
    }

    /// Register a build job so actions can reference it by id.
    pub fn add_job(&mut self, job: BuildJob) -> Result<()> {
        if self.jobs.iter().any(|j| j.id == job.id) {
            return Err(TopologyError::DuplicateJob(job.id));
        }
        self.jobs.push(job);
        Ok(())
    }

    /// Append a stage at the given placement.
    ///
    /// The chain stays linear: `JustAfter` must name the current tail
    /// stage, so no branching or merging can be expressed.
    pub fn add_stage(&mut self, stage: Stage, placement: Placement) -> Result<()> {
        if self.stages.iter().any(|s| s.name == stage.name) {
            return Err(TopologyError::DuplicateStage(stage.name));
        }
        match placement {
            Placement::First => {
                if let Some(existing) = self.stages.first() {
                    return Err(TopologyError::UnknownPredecessor {
                        stage: stage.name,
                        after: format!("(pipeline already starts at {})", existing.name),
                    });
                }
            }
            Placement::JustAfter(after) => match self.stages.last() {
                Some(tail) if tail.name == after => {}
                _ => {
                    return Err(TopologyError::UnknownPredecessor {
                        stage: stage.name,
                        after,
                    });
                }
            },
        }
        self.stages.push(stage);
        Ok(())
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn job(&self, id: &str) -> Option<&BuildJob> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Stage names in execution order.
    pub fn stage_order(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check the whole-topology invariants:
    /// - at least one stage, the first containing the source checkout
    /// - every build action references a registered job
    /// - every build action consumes the shared source artifact
    /// - run orders in each stage are contiguous starting at 1
    pub fn validate(&self) -> Result<()> {
        if self.stages.is_empty() {
            return Err(TopologyError::EmptyPipeline);
        }

        let job_ids: HashSet<&str> = self.jobs.iter().map(|j| j.id.as_str()).collect();

        for stage in &self.stages {
            for action in &stage.actions {
                if let ActionKind::Build { job, input, .. } = &action.kind {
                    if !job_ids.contains(job.as_str()) {
                        return Err(TopologyError::UnknownJob {
                            action: action.name.clone(),
                            job: job.clone(),
                        });
                    }
                    if *input != self.source_artifact {
                        return Err(TopologyError::ArtifactMismatch {
                            action: action.name.clone(),
                            expected: self.source_artifact.clone(),
                            actual: input.clone(),
                        });
                    }
                }
            }

            let orders: Vec<u32> = stage.concurrency_groups().keys().copied().collect();
            let contiguous = orders
                .iter()
                .enumerate()
                .all(|(i, order)| *order == i as u32 + 1);
            if !stage.actions.is_empty() && !contiguous {
                return Err(TopologyError::NonContiguousRunOrders {
                    stage: stage.name.clone(),
                    orders,
                });
            }
        }

        Ok(())
    }
}
