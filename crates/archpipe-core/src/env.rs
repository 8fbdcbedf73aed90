//! Per-job environment variable overlays.
//!
//! The source stack built these by mutating one shared dictionary between
//! action registrations, which made each overlay depend on every earlier
//! update. Here derivation is mutation-by-copy: `with` returns a fresh
//! overlay, so later overlays never retroactively affect earlier jobs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::resource::{Environment, RegistryRef};

/// Well-known variable names recognized by the buildspec scripts.
pub mod keys {
    pub const ECR_REPO_NAME: &str = "ECR_REPO_NAME";
    pub const AWS_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
    pub const AWS_REGION: &str = "AWS_REGION";
    pub const FILES_LOCATION: &str = "FILES_LOCATION";
    pub const CONTAINER_NAME: &str = "CONTAINER_NAME";
    pub const PLATFORM: &str = "PLATFORM";
}

/// Environment variable mapping injected into one build job.
///
/// Backed by a `BTreeMap` so serialized output is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvOverlay(BTreeMap<String, String>);

impl EnvOverlay {
    /// The base set shared by every job: registry name, account, region.
    pub fn base(env: &Environment, registry: &RegistryRef) -> Self {
        let mut vars = BTreeMap::new();
        vars.insert(keys::ECR_REPO_NAME.to_string(), registry.name.clone());
        vars.insert(keys::AWS_ACCOUNT_ID.to_string(), env.account.clone());
        vars.insert(keys::AWS_REGION.to_string(), env.region.clone());
        Self(vars)
    }

    /// Derive a new overlay with `key` set to `value`.
    ///
    /// Consumes-and-returns so derivations chain; the receiver is cloned
    /// by the caller when the parent overlay must survive.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Environment;

    fn base() -> EnvOverlay {
        let env = Environment::new("123456789012", "us-east-2");
        let registry = RegistryRef::from_name("arm64_demo").expect("registry");
        EnvOverlay::base(&env, &registry)
    }

    #[test]
    fn test_base_keys() {
        let overlay = base();
        assert_eq!(overlay.len(), 3);
        assert_eq!(overlay.get(keys::ECR_REPO_NAME), Some("arm64_demo"));
        assert_eq!(overlay.get(keys::AWS_ACCOUNT_ID), Some("123456789012"));
        assert_eq!(overlay.get(keys::AWS_REGION), Some("us-east-2"));
    }

    #[test]
    fn test_with_does_not_mutate_parent() {
        let parent = base();
        let child = parent
            .clone()
            .with(keys::PLATFORM, "x86")
            .with(keys::FILES_LOCATION, "native_speed");

        assert_eq!(parent.len(), 3, "parent overlay must be untouched");
        assert!(parent.get(keys::PLATFORM).is_none());
        assert_eq!(child.get(keys::PLATFORM), Some("x86"));
        assert_eq!(child.get(keys::FILES_LOCATION), Some("native_speed"));
    }

    #[test]
    fn test_with_overrides_existing_key() {
        let overlay = base()
            .with(keys::PLATFORM, "x86")
            .with(keys::PLATFORM, "arm64");
        assert_eq!(overlay.get(keys::PLATFORM), Some("arm64"));
    }

    #[test]
    fn test_overlay_deterministic() {
        let a = base().with(keys::PLATFORM, "x86");
        let b = base().with(keys::PLATFORM, "x86");
        assert_eq!(a, b);
        let ja = serde_json::to_string(&a).expect("serialize");
        let jb = serde_json::to_string(&b).expect("serialize");
        assert_eq!(ja, jb, "serialized form must be byte-identical");
    }
}
