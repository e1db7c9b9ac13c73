//! Stagecraft pipeline assembly
//!
//! Turns a set of source repositories into a self-mutating delivery pipeline:
//! - Pulls every repository (self repository first)
//! - Synthesizes the pipeline definition into a compiled-output artifact
//! - Redeploys the pipeline from that output inside a named trust boundary
//! - Archives every repository under one per-assembly path prefix
//! - Appends caller-defined deployment stages

pub mod action;
pub mod assembler;
pub mod build;
pub mod definition;
pub mod stage;

// Re-export key types
pub use action::{template_file, Action, ActionKind, TEMPLATE_DIR};
pub use assembler::{PipelineAssembler, PipelineProps, SELF_MUTATE_ACTION, SYNTH_ACTION};
pub use build::{BuildProject, BuiltinProject, DEFAULT_BUILD_IMAGE};
pub use definition::{PipelineDefinition, PIPELINE_TYPE};
pub use stage::{
    Stage, StageHandle, ARCHIVAL_STAGE, FIXED_STAGES, SELF_MUTATION_STAGE, SOURCE_STAGE,
    SYNTHESIS_STAGE,
};
