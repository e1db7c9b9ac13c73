//! Configuration error taxonomy for pipeline assembly.
//!
//! Every variant is raised synchronously while the stage graph is being
//! built. None of them are retried; the assembly is abandoned.

/// Errors raised while assembling a pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{context}: `{field}` must not be empty")]
    EmptyField { field: String, context: String },

    #[error("repository {repo} is already registered")]
    DuplicateRepository { repo: String },

    #[error("repository {repo} cannot use artifact slot {slot}: the name is reserved")]
    ReservedSlot { repo: String, slot: String },

    #[error("artifact slot {slot} is already held by {holder}; cannot register {repo}")]
    SlotConflict {
        slot: String,
        holder: String,
        repo: String,
    },

    #[error("repository {repo} has no registered artifact")]
    RepositoryNotFound { repo: String },

    #[error("stage {stage} requires the self repository artifact, but none is registered")]
    MissingSelfRepository { stage: String },

    #[error("stage {stage} already exists in the pipeline")]
    DuplicateStage { stage: String },

    #[error("stage {stage} already contains an action named {action}")]
    DuplicateAction { stage: String, action: String },

    #[error("stage {stage} has no actions")]
    EmptyStage { stage: String },

    #[error("run path suffix length {length} is outside 1..={}", crate::run_path::MAX_SUFFIX_LEN)]
    InvalidSuffixLength { length: usize },
}

/// Result type for assembly operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
