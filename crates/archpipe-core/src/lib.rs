//! archpipe-core - Pipeline topology domain model
//!
//! Typed building blocks for the multi-architecture CI demo pipeline:
//! - `Arch` / `BuildImage`: target architectures and their build images
//! - `RepositoryRef` / `RegistryRef`: by-name bindings to existing resources
//! - `PolicyBundle`: the three permission statements every job carries
//! - `EnvOverlay`: per-job environment variables, derived by copy
//! - `BuildJob` / `BuildJobFactory`: one job per (scenario, architecture)
//! - `PipelineTopology`: the strict stage chain with run-order barriers
//!
//! Everything here is built exactly once at synthesis time; nothing
//! executes, schedules, or retries — that is the platform's job.

pub mod arch;
pub mod digest;
pub mod env;
pub mod error;
pub mod iam;
pub mod job;
pub mod pipeline;
pub mod resource;
pub mod telemetry;

pub use arch::{Arch, BuildImage, ComputeType};
pub use digest::{canonical_json, topology_digest};
pub use env::EnvOverlay;
pub use error::{Result, TopologyError};
pub use iam::{Effect, PolicyBundle, PolicyStatement};
pub use job::{BuildJob, BuildJobFactory};
pub use pipeline::{Action, ActionKind, PipelineTopology, Placement, Stage};
pub use resource::{Environment, RegistryRef, RepositoryRef};
pub use telemetry::init_tracing;
