//! References to pre-existing external resources.
//!
//! The demo never creates its source repository or image registry; both
//! are bound by name and must already exist in the target account/region.
//! Resolution failures surface as deploy-time validation errors from the
//! platform, not from this code.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopologyError};

/// Pseudo-parameter rendered when the target account is not known at
/// synthesis time; the platform substitutes the real value at deploy.
pub const ACCOUNT_PSEUDO_PARAM: &str = "${AWS::AccountId}";
/// Pseudo-parameter for the target region.
pub const REGION_PSEUDO_PARAM: &str = "${AWS::Region}";

/// Target deployment environment (account + region).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    /// Build an environment from explicit values (real ids or the
    /// pseudo-parameters above).
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

/// By-name reference to an existing source-control repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRef {
    pub name: String,
}

impl RepositoryRef {
    /// Bind to a repository by name. The name must be non-empty.
    pub fn from_name(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_resource_name(&name)?;
        Ok(Self { name })
    }

    /// Exact repository ARN in the given environment.
    pub fn arn(&self, env: &Environment) -> String {
        format!(
            "arn:aws:codecommit:{}:{}:{}",
            env.region, env.account, self.name
        )
    }
}

/// By-name reference to an existing container image registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryRef {
    pub name: String,
}

impl RegistryRef {
    /// Bind to a registry repository by name. The name must be non-empty.
    pub fn from_name(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_resource_name(&name)?;
        Ok(Self { name })
    }

    /// Exact registry repository ARN in the given environment.
    pub fn arn(&self, env: &Environment) -> String {
        format!(
            "arn:aws:ecr:{}:{}:repository/{}",
            env.region, env.account, self.name
        )
    }
}

fn validate_resource_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(TopologyError::InvalidResourceName(name.to_string()));
    }
    Ok(())
}
