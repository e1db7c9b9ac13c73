//! Pipeline stages.
//!
//! Actions inside a stage may run concurrently; a stage starts only after
//! every action of the previous stage succeeded. The executor enforces that,
//! the definition only declares it through stage order.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Stage pulling every repository.
pub const SOURCE_STAGE: &str = "Source";

/// Stage compiling the pipeline's own definition.
pub const SYNTHESIS_STAGE: &str = "Synthesis";

/// Stage redeploying the pipeline from the compiled output.
pub const SELF_MUTATION_STAGE: &str = "Self-Mutation";

/// Stage copying every repository to the archive bucket.
pub const ARCHIVAL_STAGE: &str = "Archival";

/// Stages every pipeline starts with, in order.
pub const FIXED_STAGES: [&str; 4] = [
    SOURCE_STAGE,
    SYNTHESIS_STAGE,
    SELF_MUTATION_STAGE,
    ARCHIVAL_STAGE,
];

/// An ordered group of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Display name, unique within the pipeline.
    pub name: String,

    pub actions: Vec<Action>,
}

impl Stage {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Whether this is one of the four fixed stages.
    pub fn is_fixed(&self) -> bool {
        FIXED_STAGES.contains(&self.name.as_str())
    }
}

/// Reference to a stage added to a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageHandle {
    /// Position in the pipeline, starting at 0.
    pub index: usize,

    pub name: String,
}
