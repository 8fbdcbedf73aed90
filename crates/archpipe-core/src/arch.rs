//! Target architectures and their build environments.

use serde::{Deserialize, Serialize};

/// Processor architecture a build job targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    /// x86_64, built on the standard Linux image.
    X86,

    /// arm64, built on the Graviton Linux image.
    Arm64,
}

impl Arch {
    /// Platform label injected into build jobs as `PLATFORM`.
    pub fn platform(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::Arm64 => "arm64",
        }
    }

    /// Identifier of the managed build image for this architecture.
    pub fn build_image(&self) -> BuildImage {
        match self {
            Arch::X86 => BuildImage::LinuxStandard4,
            Arch::Arm64 => BuildImage::LinuxArm2,
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.platform())
    }
}

/// Managed build images offered by the build service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildImage {
    /// `aws/codebuild/standard:4.0` (x86_64).
    LinuxStandard4,

    /// `aws/codebuild/amazonlinux2-aarch64-standard:2.0` (arm64).
    LinuxArm2,
}

impl BuildImage {
    /// Image identifier as the build service expects it.
    pub fn image_id(&self) -> &'static str {
        match self {
            BuildImage::LinuxStandard4 => "aws/codebuild/standard:4.0",
            BuildImage::LinuxArm2 => "aws/codebuild/amazonlinux2-aarch64-standard:2.0",
        }
    }
}

/// Compute fleet size for a build job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComputeType {
    Small,
    Medium,
    /// All demo jobs build container images and use the large fleet.
    Large,
}
