//! archpipe-synth - Scenario catalog and stage/action sequencer
//!
//! Turns the static demo catalog into a validated [`PipelineTopology`]
//! and renders it as a deployable JSON template:
//! - `catalog`: the six scenario stages and their build actions
//! - `sequencer`: catalog → topology (jobs, overlays, run orders)
//! - `template`: topology → digest-stamped JSON template
//! - `checks`: topology assertions for `validate`

pub mod catalog;
pub mod checks;
pub mod sequencer;
pub mod template;

pub use catalog::{BuildSpec, CatalogEntry, ScenarioStage, SCENARIO_STAGES};
pub use checks::{evaluate, TopologyReport};
pub use sequencer::{build_topology, PIPELINE_NAME, REPOSITORY_NAME, SOURCE_ARTIFACT};
pub use template::PipelineTemplate;
