//! Template rendering: topology out, deployable JSON in hand.

use archpipe_core::{topology_digest, PipelineTopology, Result};
use serde::{Deserialize, Serialize};

/// The synthesized deployment template: the topology plus a digest of its
/// canonical JSON form. Identical inputs yield identical digests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineTemplate {
    /// SHA-256 hex digest of the canonical topology JSON.
    pub digest: String,

    pub pipeline: PipelineTopology,
}

impl PipelineTemplate {
    /// Render a validated topology into a template.
    pub fn render(pipeline: PipelineTopology) -> Result<Self> {
        pipeline.validate()?;
        let digest = topology_digest(&pipeline)?;
        Ok(Self { digest, pipeline })
    }

    /// Pretty-printed JSON for files and stdout.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}
