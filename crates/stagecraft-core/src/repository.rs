//! Source repository descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactSlot;
use crate::error::{ConfigurationError, Result};

/// Branch pulled when a repository does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// A source repository that the pipeline pulls on every commit.
///
/// Identity is the `(owner, name, branch)` triple; the connection handle is
/// carried along but does not participate in equality or hashing.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryDescriptor {
    /// Handle of the source-control connection used to pull this repository.
    connection: String,

    /// Repository owner (user or organisation).
    owner: String,

    /// Repository name.
    name: String,

    /// Branch to pull.
    branch: String,
}

impl RepositoryDescriptor {
    /// Create a descriptor, defaulting the branch to [`DEFAULT_BRANCH`].
    pub fn new(
        connection: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
        branch: Option<String>,
    ) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(ConfigurationError::EmptyField {
                field: "owner".to_string(),
                context: format!("repository `{name}`"),
            });
        }
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyField {
                field: "name".to_string(),
                context: format!("repository owned by `{owner}`"),
            });
        }
        let branch = branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Ok(Self {
            connection: connection.into(),
            owner,
            name,
            branch,
        })
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Deterministic name of the pull action for this repository.
    pub fn source_action_name(&self) -> String {
        format!("{}-Source", self.name)
    }

    /// Build the pull action that checks this repository out into `output`.
    pub fn create_pull_action(&self, output: ArtifactSlot) -> PullAction {
        PullAction {
            action_name: self.source_action_name(),
            connection: self.connection.clone(),
            owner: self.owner.clone(),
            repo: self.name.clone(),
            branch: self.branch.clone(),
            output,
        }
    }
}

impl PartialEq for RepositoryDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name && self.branch == other.branch
    }
}

impl Eq for RepositoryDescriptor {}

impl std::hash::Hash for RepositoryDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
        self.branch.hash(state);
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.branch)
    }
}

/// Source-control pull handed to the connector collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullAction {
    /// `<name>-Source`.
    pub action_name: String,

    pub connection: String,

    pub owner: String,

    pub repo: String,

    pub branch: String,

    /// Slot the checked-out tree is written into.
    pub output: ArtifactSlot,
}
