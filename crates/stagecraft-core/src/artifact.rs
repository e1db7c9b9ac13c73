//! Artifact slots and the repository-to-slot registry.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::repository::RepositoryDescriptor;

/// Name of the slot holding the synthesis stage's compiled output.
pub const COMPILED_OUTPUT_SLOT: &str = "CompiledOutput";

/// Handle for the bytes one action produces and later actions consume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactSlot {
    name: String,
}

impl ArtifactSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Slot for the compiled synthesis output.
    pub fn compiled_output() -> Self {
        Self::new(COMPILED_OUTPUT_SLOT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference a file inside this artifact.
    pub fn at_path(&self, path: impl Into<String>) -> ArtifactPath {
        ArtifactPath {
            artifact: self.clone(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A file location inside an artifact, e.g. `CompiledOutput::cdk.out/app.template.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPath {
    pub artifact: ArtifactSlot,
    pub path: String,
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.artifact, self.path)
    }
}

/// Bijective map from each configured repository to its source artifact slot.
///
/// Iteration order is registration order. The assembler registers the self
/// repository first, so it is always the first entry.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    entries: Vec<(RepositoryDescriptor, ArtifactSlot)>,
    index: HashMap<RepositoryDescriptor, usize>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a fresh slot for `repo`.
    ///
    /// The slot is named after the repository. Registering the same
    /// `(owner, name, branch)` twice is an error, as is a slot name already
    /// held by another repository or reserved for the compiled output.
    pub fn register(&mut self, repo: &RepositoryDescriptor) -> Result<ArtifactSlot> {
        if self.index.contains_key(repo) {
            return Err(ConfigurationError::DuplicateRepository {
                repo: repo.to_string(),
            });
        }
        let slot = ArtifactSlot::new(repo.name());
        if slot.name() == COMPILED_OUTPUT_SLOT {
            return Err(ConfigurationError::ReservedSlot {
                repo: repo.to_string(),
                slot: slot.name,
            });
        }
        if let Some((holder, _)) = self.entries.iter().find(|(_, s)| *s == slot) {
            return Err(ConfigurationError::SlotConflict {
                slot: slot.name,
                holder: holder.to_string(),
                repo: repo.to_string(),
            });
        }
        self.index.insert(repo.clone(), self.entries.len());
        self.entries.push((repo.clone(), slot.clone()));
        debug!(repo = %repo, slot = %slot, "registered source artifact");
        Ok(slot)
    }

    /// Slot registered for `repo`.
    pub fn lookup(&self, repo: &RepositoryDescriptor) -> Result<&ArtifactSlot> {
        self.index
            .get(repo)
            .map(|&i| &self.entries[i].1)
            .ok_or_else(|| ConfigurationError::RepositoryNotFound {
                repo: repo.to_string(),
            })
    }

    /// Repositories and slots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&RepositoryDescriptor, &ArtifactSlot)> {
        self.entries.iter().map(|(r, s)| (r, s))
    }

    pub fn repositories(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.entries.iter().map(|(r, _)| r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str) -> RepositoryDescriptor {
        RepositoryDescriptor::new("conn", "acme", name, None).expect("valid")
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = ArtifactRegistry::new();
        for name in ["infra", "api", "web"] {
            registry.register(&repo(name)).expect("register");
        }

        let names: Vec<_> = registry.repositories().map(|r| r.name()).collect();
        assert_eq!(names, vec!["infra", "api", "web"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_register_returns_slot_named_after_repo() {
        let mut registry = ArtifactRegistry::new();
        let slot = registry.register(&repo("api")).expect("register");
        assert_eq!(slot.name(), "api");
        assert_eq!(registry.lookup(&repo("api")).expect("lookup"), &slot);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ArtifactRegistry::new();
        registry.register(&repo("api")).expect("register");
        let err = registry.register(&repo("api")).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateRepository { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_compiled_output_name_reserved() {
        let mut registry = ArtifactRegistry::new();
        let err = registry.register(&repo(COMPILED_OUTPUT_SLOT)).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ReservedSlot {
                repo: "acme/CompiledOutput@main".to_string(),
                slot: COMPILED_OUTPUT_SLOT.to_string(),
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_same_name_other_owner_conflicts() {
        let mut registry = ArtifactRegistry::new();
        registry.register(&repo("api")).expect("register");
        let other = RepositoryDescriptor::new("conn", "other", "api", None).expect("valid");

        let err = registry.register(&other).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::SlotConflict {
                slot: "api".to_string(),
                holder: "acme/api@main".to_string(),
                repo: "other/api@main".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(&other).is_err());
    }

    #[test]
    fn test_lookup_unregistered_fails() {
        let registry = ArtifactRegistry::new();
        let err = registry.lookup(&repo("ghost")).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::RepositoryNotFound {
                repo: "acme/ghost@main".to_string()
            }
        );
    }

    #[test]
    fn test_artifact_path_display() {
        let path = ArtifactSlot::compiled_output().at_path("cdk.out/app.template.json");
        assert_eq!(path.to_string(), "CompiledOutput::cdk.out/app.template.json");
    }
}
