//! The assembled pipeline definition and its identity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stagecraft_core::{ConfigurationError, Result};

use crate::stage::{Stage, StageHandle};

/// Execution model requested from the orchestration service.
pub const PIPELINE_TYPE: &str = "V2";

/// A complete pipeline: ordered stages of ordered actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name.
    pub name: String,

    /// Stack that holds the pipeline itself.
    pub stack_name: String,

    pub pipeline_type: String,

    pub stages: Vec<Stage>,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, stack_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_name: stack_name.into(),
            pipeline_type: PIPELINE_TYPE.to_string(),
            stages: Vec::new(),
        }
    }

    /// Append `stage` after every existing stage.
    ///
    /// Rejects a stage without actions, a stage name already in use, and
    /// duplicate action names within the stage.
    pub fn add_stage(&mut self, stage: Stage) -> Result<StageHandle> {
        if stage.actions.is_empty() {
            return Err(ConfigurationError::EmptyStage { stage: stage.name });
        }
        if self.stages.iter().any(|s| s.name == stage.name) {
            return Err(ConfigurationError::DuplicateStage { stage: stage.name });
        }
        let mut seen = HashSet::new();
        for action in &stage.actions {
            if !seen.insert(action.name.as_str()) {
                return Err(ConfigurationError::DuplicateAction {
                    stage: stage.name.clone(),
                    action: action.name.clone(),
                });
            }
        }

        let handle = StageHandle {
            index: self.stages.len(),
            name: stage.name.clone(),
        };
        self.stages.push(stage);
        Ok(handle)
    }

    pub fn stage(&self, handle: &StageHandle) -> Option<&Stage> {
        self.stages
            .get(handle.index)
            .filter(|s| s.name == handle.name)
    }

    pub fn stage_named(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn action_count(&self) -> usize {
        self.stages.iter().map(|s| s.actions.len()).sum()
    }

    /// SHA-256 (hex) of the canonical JSON form.
    ///
    /// Identical inputs, including a pinned clock and suffix source, give
    /// identical digests.
    pub fn digest(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
