//! Permission statements attached to build-job execution roles.
//!
//! Every build job receives the same three statements: pull from the
//! source repository, push image layers to the registry, and fetch a
//! registry authorization token. There is no per-job variation.

use serde::{Deserialize, Serialize};

use crate::resource::{Environment, RegistryRef, RepositoryRef};

/// Statement effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// A single IAM policy statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyStatement {
    /// Statement id, e.g. `AllowSrcPulls`.
    pub sid: String,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

/// The seven registry actions needed to push a multi-layer image.
const REGISTRY_OPS_ACTIONS: [&str; 7] = [
    "ecr:BatchGetImage",
    "ecr:PutImage",
    "ecr:BatchCheckLayerAvailability",
    "ecr:CompleteLayerUpload",
    "ecr:UploadLayerPart",
    "ecr:InitiateLayerUpload",
    "ecr:GetDownloadUrlForLayer",
];

/// The three canonical statements shared by every build job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyBundle {
    pub source_pull: PolicyStatement,
    pub registry_ops: PolicyStatement,
    pub registry_auth: PolicyStatement,
}

impl PolicyBundle {
    /// Build the bundle for the given repository/registry pair.
    ///
    /// `source_pull` and `registry_ops` are scoped to the exact resource
    /// ARN. `registry_auth` is unscoped (`*`): the authorization-token
    /// action is account-wide by platform rule and cannot name a registry
    /// in its resource constraint.
    pub fn for_resources(env: &Environment, repo: &RepositoryRef, registry: &RegistryRef) -> Self {
        let source_pull = PolicyStatement {
            sid: "AllowSrcPulls".to_string(),
            effect: Effect::Allow,
            actions: vec!["codecommit:GitPull".to_string()],
            resources: vec![repo.arn(env)],
        };
        let registry_ops = PolicyStatement {
            sid: "AllowECROps".to_string(),
            effect: Effect::Allow,
            actions: REGISTRY_OPS_ACTIONS.iter().map(|a| a.to_string()).collect(),
            resources: vec![registry.arn(env)],
        };
        let registry_auth = PolicyStatement {
            sid: "AllowECRAuth".to_string(),
            effect: Effect::Allow,
            actions: vec!["ecr:GetAuthorizationToken".to_string()],
            resources: vec!["*".to_string()],
        };
        Self {
            source_pull,
            registry_ops,
            registry_auth,
        }
    }

    /// All three statements in attachment order.
    pub fn statements(&self) -> [&PolicyStatement; 3] {
        [&self.source_pull, &self.registry_ops, &self.registry_auth]
    }
}
