//! Structured lifecycle events emitted while a pipeline is assembled.
//!
//! All events carry an `event` field so log pipelines can filter on it.

use tracing::info;

/// RAII guard scoping every log line of one assembly under `pipeline = <name>`.
pub struct AssemblySpan {
    _span: tracing::span::EnteredSpan,
}

impl AssemblySpan {
    pub fn enter(pipeline: &str) -> Self {
        let span = tracing::info_span!("stagecraft.assembly", pipeline = %pipeline);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_assembly_started(pipeline: &str, repositories: usize) {
    info!(event = "assembly.started", pipeline = %pipeline, repositories = repositories);
}

pub fn emit_stage_added(pipeline: &str, stage: &str, actions: usize) {
    info!(event = "assembly.stage_added", pipeline = %pipeline, stage = %stage, actions = actions);
}

/// The archive prefix is fixed for the lifetime of this definition.
pub fn emit_archive_prefix_allocated(pipeline: &str, location: &str) {
    info!(event = "assembly.archive_prefix", pipeline = %pipeline, location = %location);
}

pub fn emit_assembly_finished(pipeline: &str, stages: usize, digest: &str) {
    info!(
        event = "assembly.finished",
        pipeline = %pipeline,
        stages = stages,
        digest = %digest,
    );
}
