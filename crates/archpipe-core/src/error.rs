//! Domain-level error taxonomy for topology construction.

/// Errors produced while building or validating a pipeline topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("invalid resource name: {0}")]
    InvalidResourceName(String),

    #[error("duplicate stage name: {0}")]
    DuplicateStage(String),

    #[error("duplicate build job id: {0}")]
    DuplicateJob(String),

    #[error("duplicate action name {action} in stage {stage}")]
    DuplicateAction { stage: String, action: String },

    #[error("stage {stage} placed after unknown stage: {after}")]
    UnknownPredecessor { stage: String, after: String },

    #[error("action {action} references unknown build job: {job}")]
    UnknownJob { action: String, job: String },

    #[error("stage {stage}: run orders must start at 1 and be contiguous, got {orders:?}")]
    NonContiguousRunOrders { stage: String, orders: Vec<u32> },

    #[error("run order must be >= 1")]
    ZeroRunOrder,

    #[error("empty pipeline: at least a source stage is required")]
    EmptyPipeline,

    #[error("action {action} consumes artifact {actual}, expected shared artifact {expected}")]
    ArtifactMismatch {
        action: String,
        expected: String,
        actual: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;
