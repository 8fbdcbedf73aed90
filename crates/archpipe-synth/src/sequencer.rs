//! Stage/action sequencer: catalog in, pipeline topology out.
//!
//! Runs once, synchronously, at synthesis time. For each catalog entry it
//! instantiates a build job via the factory, derives the env overlay by
//! copy from the base set, and appends the action with its run order into
//! the scenario's stage, chaining stages strictly after one another.

use archpipe_core::env::keys;
use archpipe_core::{
    Action, BuildJobFactory, EnvOverlay, Environment, PipelineTopology, Placement, RegistryRef,
    RepositoryRef, Result, Stage,
};
use tracing::{debug, info};

use crate::catalog::{CatalogEntry, SCENARIO_STAGES};

/// Name of the external repository and registry the demo binds to.
pub const REPOSITORY_NAME: &str = "arm64_demo";
/// Logical pipeline name.
pub const PIPELINE_NAME: &str = "Arm64DemoPipeline";
/// Shared artifact produced by the source stage.
pub const SOURCE_ARTIFACT: &str = "SourceArtifact";
/// Branch checked out by the source stage.
pub const SOURCE_BRANCH: &str = "main";

/// Build the complete demo topology for the given environment.
///
/// The returned topology is validated: stage order is total, every action
/// references a registered job, and every build action consumes the shared
/// source artifact.
pub fn build_topology(env: &Environment) -> Result<PipelineTopology> {
    let repository = RepositoryRef::from_name(REPOSITORY_NAME)?;
    let registry = RegistryRef::from_name(REPOSITORY_NAME)?;

    info!(
        pipeline = PIPELINE_NAME,
        repository = REPOSITORY_NAME,
        account = %env.account,
        region = %env.region,
        "Synthesizing pipeline topology"
    );

    let factory = BuildJobFactory::new(env, repository.clone(), &registry);
    let base = EnvOverlay::base(env, &registry);

    let mut topology = PipelineTopology::new(PIPELINE_NAME, SOURCE_ARTIFACT);

    // Source stage: single checkout of the demo repository's main branch.
    let mut source = Stage::new("Source_Code");
    source.add_action(Action::source_checkout(
        "Source_Code",
        REPOSITORY_NAME,
        SOURCE_BRANCH,
        SOURCE_ARTIFACT,
    ))?;
    let mut previous = source.name.clone();
    topology.add_stage(source, Placement::First)?;

    for scenario in SCENARIO_STAGES {
        let mut stage = Stage::new(scenario.name);
        for entry in scenario.entries {
            let mut job = factory.arch_build_job(entry.job_id, entry.arch, entry.build_spec.path());
            if let Some(minutes) = entry.timeout_minutes {
                job = job.with_timeout_minutes(minutes);
            }
            topology.add_job(job)?;

            let overlay = entry_overlay(&base, entry);
            debug!(
                stage = scenario.name,
                action = entry.action_name,
                job = entry.job_id,
                run_order = entry.run_order,
                "Adding build action"
            );
            stage.add_action(Action::build(
                entry.action_name,
                entry.job_id,
                SOURCE_ARTIFACT,
                overlay,
                entry.run_order,
            ))?;
        }
        topology.add_stage(stage, Placement::JustAfter(previous))?;
        previous = scenario.name.to_string();
    }

    topology.validate()?;
    info!(
        stages = topology.stages.len(),
        jobs = topology.jobs.len(),
        "Topology synthesized"
    );
    Ok(topology)
}

/// Derive one entry's overlay from the base set. Each call clones the
/// base, so no entry can observe another entry's overrides.
fn entry_overlay(base: &EnvOverlay, entry: &CatalogEntry) -> EnvOverlay {
    let mut overlay = base.clone();
    if let Some(files_location) = entry.overlay.files_location {
        overlay = overlay.with(keys::FILES_LOCATION, files_location);
    }
    if let Some(container_name) = entry.overlay.container_name {
        overlay = overlay.with(keys::CONTAINER_NAME, container_name);
    }
    if let Some(platform) = entry.overlay.platform {
        overlay = overlay.with(keys::PLATFORM, platform.platform());
    }
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use archpipe_core::ActionKind;

    fn topology() -> PipelineTopology {
        let env = Environment::new("123456789012", "us-east-2");
        build_topology(&env).expect("topology builds")
    }

    #[test]
    fn test_stage_chain() {
        let topo = topology();
        assert_eq!(
            topo.stage_order(),
            vec![
                "Source_Code",
                "Concept_1A_Build_Speed_Native",
                "Concept_1B_Build_Speed_Emulated",
                "Concept_2A_Software_Running",
                "Concept_2B_Software_Not_Running",
                "Concept_3A_Runtime_Tests",
                "Concept_3B_Performance_Tests",
            ]
        );
    }

    #[test]
    fn test_source_stage_checks_out_main() {
        let topo = topology();
        let source = topo.stage("Source_Code").expect("source stage");
        assert_eq!(source.actions.len(), 1);
        match &source.actions[0].kind {
            ActionKind::SourceCheckout {
                repository,
                branch,
                output,
            } => {
                assert_eq!(repository, REPOSITORY_NAME);
                assert_eq!(branch, "main");
                assert_eq!(output, SOURCE_ARTIFACT);
            }
            other => panic!("expected source checkout, got {:?}", other),
        }
    }

    #[test]
    fn test_job_count() {
        let topo = topology();
        assert_eq!(topo.jobs.len(), 15, "one job per catalog entry");
    }

    #[test]
    fn test_native_speed_overlays() {
        let topo = topology();
        let stage = topo
            .stage("Concept_1A_Build_Speed_Native")
            .expect("native speed stage");

        let overlay_of = |name: &str| -> &EnvOverlay {
            let action = stage
                .actions
                .iter()
                .find(|a| a.name == name)
                .unwrap_or_else(|| panic!("action {} missing", name));
            match &action.kind {
                ActionKind::Build { env, .. } => env,
                other => panic!("expected build action, got {:?}", other),
            }
        };

        let x86 = overlay_of("Native_Speed_x86_Build");
        assert_eq!(x86.get(keys::ECR_REPO_NAME), Some("arm64_demo"));
        assert_eq!(x86.get(keys::AWS_ACCOUNT_ID), Some("123456789012"));
        assert_eq!(x86.get(keys::AWS_REGION), Some("us-east-2"));
        assert_eq!(x86.get(keys::FILES_LOCATION), Some("native_speed"));
        assert_eq!(x86.get(keys::CONTAINER_NAME), Some("compute_bound_native"));
        assert_eq!(x86.get(keys::PLATFORM), Some("x86"));

        let arm64 = overlay_of("Native_Speed_arm64_Build");
        assert_eq!(arm64.get(keys::PLATFORM), Some("arm64"));
        assert_eq!(arm64.get(keys::FILES_LOCATION), Some("native_speed"));

        // The combining job inherits the arm64 overlay wholesale.
        let multi = overlay_of("Native_Speed_Multi_Arch_Build");
        assert_eq!(multi, arm64);
    }

    #[test]
    fn test_emulated_stage_base_overlay_and_timeout() {
        let topo = topology();
        let stage = topo
            .stage("Concept_1B_Build_Speed_Emulated")
            .expect("emulated stage");
        assert_eq!(stage.actions.len(), 1);
        match &stage.actions[0].kind {
            ActionKind::Build { env, .. } => {
                assert_eq!(env.len(), 3, "base overlay only");
                assert!(env.get(keys::PLATFORM).is_none());
            }
            other => panic!("expected build action, got {:?}", other),
        }
        let job = topo
            .job("Emulated_Speed_Multi-Arch_Build")
            .expect("emulated job");
        assert_eq!(job.timeout_minutes, Some(120));
    }

    #[test]
    fn test_software_not_running_run_orders() {
        let topo = topology();
        let stage = topo
            .stage("Concept_2B_Software_Not_Running")
            .expect("not-running stage");
        let groups = stage.concurrency_groups();
        let group1: Vec<_> = groups[&1].iter().map(|a| a.name.as_str()).collect();
        let group2: Vec<_> = groups[&2].iter().map(|a| a.name.as_str()).collect();
        assert_eq!(group1, vec!["Python_x86_Build", "Python_Fixes_arm64_Build"]);
        assert_eq!(group2, vec!["Nodejs_x86_Build", "Nodejs_Fixes_arm64_Build"]);
    }

    #[test]
    fn test_overlay_derivation_idempotent() {
        let env = Environment::new("123456789012", "us-east-2");
        let a = build_topology(&env).expect("first synth");
        let b = build_topology(&env).expect("second synth");
        assert_eq!(a, b, "same inputs must yield an identical topology");
    }
}
