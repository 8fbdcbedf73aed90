//! Topology assertions for synthesized pipelines.
//!
//! The pipeline is static configuration, so "testing" it means checking
//! the declared topology, not runtime behavior. `evaluate` re-checks
//! every observable property a correct synthesis must have and reports
//! violations instead of failing fast, so a broken topology surfaces all
//! of its problems at once.

use archpipe_core::env::keys;
use archpipe_core::{ActionKind, Environment, PipelineTopology, PolicyBundle};
use serde::{Deserialize, Serialize};

use crate::catalog::BuildSpec;
use crate::sequencer::REPOSITORY_NAME;

/// Outcome of a topology check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyReport {
    /// Whether every check passed.
    pub passed: bool,

    /// Violations found (empty if passed).
    pub violations: Vec<String>,

    /// Summary message.
    pub message: String,
}

/// Check all topology properties against the given environment:
///
/// - stages form the expected total order
/// - combining (multi-arch) jobs sit at run order 2 behind at least two
///   run-order-1 jobs in the same stage
/// - every job carries exactly the three canonical policy statements with
///   resource patterns matching the bound repository/registry
/// - every build action consumes the shared source artifact
/// - every build overlay carries the base keys with the bound values
pub fn evaluate(topology: &PipelineTopology, env: &Environment) -> TopologyReport {
    let mut violations = Vec::new();

    check_stage_order(topology, &mut violations);
    check_combining_jobs(topology, &mut violations);
    check_policies(topology, env, &mut violations);
    check_artifacts_and_overlays(topology, env, &mut violations);

    let passed = violations.is_empty();
    let message = if passed {
        format!(
            "topology ok: {} stages, {} jobs",
            topology.stages.len(),
            topology.jobs.len()
        )
    } else {
        format!("{} violation(s) found", violations.len())
    };

    TopologyReport {
        passed,
        violations,
        message,
    }
}

const EXPECTED_STAGE_ORDER: [&str; 7] = [
    "Source_Code",
    "Concept_1A_Build_Speed_Native",
    "Concept_1B_Build_Speed_Emulated",
    "Concept_2A_Software_Running",
    "Concept_2B_Software_Not_Running",
    "Concept_3A_Runtime_Tests",
    "Concept_3B_Performance_Tests",
];

fn check_stage_order(topology: &PipelineTopology, violations: &mut Vec<String>) {
    let order = topology.stage_order();
    if order != EXPECTED_STAGE_ORDER {
        violations.push(format!(
            "stage order mismatch: expected {:?}, got {:?}",
            EXPECTED_STAGE_ORDER, order
        ));
    }
}

fn check_combining_jobs(topology: &PipelineTopology, violations: &mut Vec<String>) {
    for stage in &topology.stages {
        let groups = stage.concurrency_groups();
        for action in &stage.actions {
            let ActionKind::Build { job, .. } = &action.kind else {
                continue;
            };
            let Some(job_def) = topology.job(job) else {
                continue; // validate() reports unknown jobs
            };
            if job_def.build_spec != BuildSpec::NativeMultiArch.path() {
                continue;
            }
            if action.run_order != 2 {
                violations.push(format!(
                    "combining action {} has run order {}, expected 2",
                    action.name, action.run_order
                ));
            }
            let gating = groups.get(&1).map_or(0, |g| g.len());
            if gating < 2 {
                violations.push(format!(
                    "combining action {} gated on {} run-order-1 action(s), expected both arch builds",
                    action.name, gating
                ));
            }
        }
    }
}

fn check_policies(topology: &PipelineTopology, env: &Environment, violations: &mut Vec<String>) {
    // Every job must carry the canonical bundle for the demo resources.
    let expected = match (
        archpipe_core::RepositoryRef::from_name(REPOSITORY_NAME),
        archpipe_core::RegistryRef::from_name(REPOSITORY_NAME),
    ) {
        (Ok(repo), Ok(registry)) => PolicyBundle::for_resources(env, &repo, &registry),
        _ => {
            violations.push("could not rebuild canonical policy bundle".to_string());
            return;
        }
    };

    for job in &topology.jobs {
        if job.policies != expected {
            violations.push(format!(
                "job {} policy bundle deviates from the canonical three statements",
                job.id
            ));
        }
        if job.policies.registry_auth.resources != vec!["*".to_string()] {
            violations.push(format!(
                "job {} registry-auth statement must stay unscoped",
                job.id
            ));
        }
    }
}

fn check_artifacts_and_overlays(
    topology: &PipelineTopology,
    env: &Environment,
    violations: &mut Vec<String>,
) {
    for stage in &topology.stages {
        for action in &stage.actions {
            let ActionKind::Build { input, env: overlay, .. } = &action.kind else {
                continue;
            };
            if *input != topology.source_artifact {
                violations.push(format!(
                    "action {} consumes {} instead of the shared artifact {}",
                    action.name, input, topology.source_artifact
                ));
            }
            let base_pairs = [
                (keys::ECR_REPO_NAME, REPOSITORY_NAME),
                (keys::AWS_ACCOUNT_ID, env.account.as_str()),
                (keys::AWS_REGION, env.region.as_str()),
            ];
            for (key, expected) in base_pairs {
                if overlay.get(key) != Some(expected) {
                    violations.push(format!(
                        "action {} overlay key {} is {:?}, expected {:?}",
                        action.name,
                        key,
                        overlay.get(key),
                        expected
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::build_topology;
    use archpipe_core::{Action, EnvOverlay, Placement, Stage};

    #[test]
    fn test_synthesized_topology_passes() {
        let env = Environment::new("123456789012", "us-east-2");
        let topology = build_topology(&env).expect("topology");
        let report = evaluate(&topology, &env);
        assert!(report.passed, "violations: {:?}", report.violations);
        assert!(report.message.contains("7 stages"));
    }

    #[test]
    fn test_extra_stage_detected() {
        let env = Environment::new("123456789012", "us-east-2");
        let mut topology = build_topology(&env).expect("topology");
        topology
            .add_stage(
                Stage::new("Concept_4_Unplanned"),
                Placement::JustAfter("Concept_3B_Performance_Tests".to_string()),
            )
            .expect("stage");
        let report = evaluate(&topology, &env);
        assert!(!report.passed);
        assert!(report.violations[0].contains("stage order mismatch"));
    }

    #[test]
    fn test_foreign_artifact_detected() {
        let env = Environment::new("123456789012", "us-east-2");
        let mut topology = build_topology(&env).expect("topology");
        // Tamper with the last stage: add an action reading another artifact.
        let job_id = topology.jobs[0].id.clone();
        let stage = topology.stages.last_mut().expect("stage");
        stage
            .add_action(Action::build(
                "Tampered",
                job_id,
                "OtherArtifact",
                EnvOverlay::default(),
                1,
            ))
            .expect("action");
        let report = evaluate(&topology, &env);
        assert!(!report.passed);
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("shared artifact")));
    }

    #[test]
    fn test_wrong_environment_detected() {
        let env = Environment::new("123456789012", "us-east-2");
        let other = Environment::new("999999999999", "us-east-2");
        let topology = build_topology(&env).expect("topology");
        let report = evaluate(&topology, &other);
        assert!(!report.passed, "account mismatch must be reported");
    }
}
