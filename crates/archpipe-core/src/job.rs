//! Build-job definitions and the per-architecture job factory.

use serde::{Deserialize, Serialize};

use crate::arch::{Arch, BuildImage, ComputeType};
use crate::iam::PolicyBundle;
use crate::resource::{Environment, RegistryRef, RepositoryRef};

/// One isolated, ephemeral build execution.
///
/// Created once per (scenario, architecture) pair and never mutated
/// afterwards. All demo jobs run privileged because the build step drives
/// a container daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildJob {
    /// Logical job id, unique across the pipeline.
    pub id: String,

    /// Name of the source repository the job checks out.
    pub source_repository: String,

    /// Buildspec path within the source tree.
    pub build_spec: String,

    /// Compute fleet size.
    pub compute: ComputeType,

    /// Build image, selected by target architecture.
    pub image: BuildImage,

    /// Container operations require privileged mode.
    pub privileged: bool,

    /// Job timeout in minutes; `None` uses the platform default.
    pub timeout_minutes: Option<u32>,

    /// Statements attached to the job's execution role.
    pub policies: PolicyBundle,
}

/// Factory producing [`BuildJob`]s bound to one repository/registry pair.
///
/// The source stack repeated the same project-plus-three-policies block
/// for every job; the factory is that block, parameterized.
#[derive(Debug, Clone)]
pub struct BuildJobFactory {
    repository: RepositoryRef,
    policies: PolicyBundle,
}

impl BuildJobFactory {
    pub fn new(env: &Environment, repository: RepositoryRef, registry: &RegistryRef) -> Self {
        let policies = PolicyBundle::for_resources(env, &repository, registry);
        Self {
            repository,
            policies,
        }
    }

    /// Build a job for one architecture with the standard demo profile:
    /// large compute, privileged, per-arch image, shared policy bundle.
    pub fn arch_build_job(
        &self,
        id: impl Into<String>,
        arch: Arch,
        build_spec: impl Into<String>,
    ) -> BuildJob {
        BuildJob {
            id: id.into(),
            source_repository: self.repository.name.clone(),
            build_spec: build_spec.into(),
            compute: ComputeType::Large,
            image: arch.build_image(),
            privileged: true,
            timeout_minutes: None,
            policies: self.policies.clone(),
        }
    }

    /// The policy bundle every produced job carries.
    pub fn policies(&self) -> &PolicyBundle {
        &self.policies
    }
}

impl BuildJob {
    /// Set an explicit timeout, overriding the platform default.
    pub fn with_timeout_minutes(mut self, minutes: u32) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> BuildJobFactory {
        let env = Environment::new("123456789012", "us-east-2");
        let repo = RepositoryRef::from_name("arm64_demo").expect("repo");
        let registry = RegistryRef::from_name("arm64_demo").expect("registry");
        BuildJobFactory::new(&env, repo, &registry)
    }

    #[test]
    fn test_arch_build_job_profile() {
        let job = factory().arch_build_job(
            "Native_Speed_x86_Build",
            Arch::X86,
            "native_build/native_build.yml",
        );
        assert_eq!(job.id, "Native_Speed_x86_Build");
        assert_eq!(job.source_repository, "arm64_demo");
        assert_eq!(job.compute, ComputeType::Large);
        assert_eq!(job.image, BuildImage::LinuxStandard4);
        assert!(job.privileged, "container builds need privileged mode");
        assert!(job.timeout_minutes.is_none());
    }

    #[test]
    fn test_arm64_job_uses_arm_image() {
        let job = factory().arch_build_job(
            "Native_Speed_arm64_Build",
            Arch::Arm64,
            "native_build/native_build.yml",
        );
        assert_eq!(job.image, BuildImage::LinuxArm2);
    }

    #[test]
    fn test_jobs_share_policy_bundle() {
        let f = factory();
        let a = f.arch_build_job("a", Arch::X86, "native_build/native_build.yml");
        let b = f.arch_build_job("b", Arch::Arm64, "native_build/native_build.yml");
        assert_eq!(a.policies, b.policies, "no per-job policy variation");
        assert_eq!(a.policies.statements().len(), 3);
    }

    #[test]
    fn test_with_timeout() {
        let job = factory()
            .arch_build_job("Emulated", Arch::X86, "emulated_speed/emulated_speed.yml")
            .with_timeout_minutes(120);
        assert_eq!(job.timeout_minutes, Some(120));
    }
}
