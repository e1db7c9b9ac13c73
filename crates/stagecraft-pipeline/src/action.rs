//! Pipeline actions.

use serde::{Deserialize, Serialize};
use stagecraft_core::{
    ArchivePath, ArtifactPath, ArtifactSlot, BucketName, DeployableUnit, PullAction,
    TrustBoundary,
};

use crate::build::BuildProject;

/// Directory inside the compiled output that holds deployable templates.
pub const TEMPLATE_DIR: &str = "cdk.out";

/// Location of `unit`'s template, relative to the compiled-output artifact root.
pub fn template_file(unit: &str) -> String {
    format!("{TEMPLATE_DIR}/{unit}.template.json")
}

/// What an action does, and the collaborator that runs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Check a repository out through the source-control connector.
    Source(PullAction),

    /// Run a build project on the compute executor.
    Build { project: BuildProject },

    /// Copy an artifact into object storage.
    Archive {
        bucket: BucketName,
        object_key: ArchivePath,
        /// `s3://<bucket>/<object_key>`.
        location: String,
    },

    /// Create or update one deployable unit from its template.
    Deploy {
        stack_name: String,
        template: ArtifactPath,
        admin_permissions: bool,
    },
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Source(_) => "source",
            ActionKind::Build { .. } => "build",
            ActionKind::Archive { .. } => "archive",
            ActionKind::Deploy { .. } => "deploy",
        }
    }
}

/// A single unit of work within a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Name, unique within its stage.
    pub name: String,

    pub kind: ActionKind,

    /// Slots consumed.
    pub inputs: Vec<ArtifactSlot>,

    /// Slots produced.
    pub outputs: Vec<ArtifactSlot>,

    /// Extra authorization granted to the action's execution identity.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trust_boundary: Option<TrustBoundary>,
}

impl Action {
    /// Pull action writing into its own output slot.
    pub fn source(pull: PullAction) -> Self {
        Self {
            name: pull.action_name.clone(),
            outputs: vec![pull.output.clone()],
            inputs: Vec::new(),
            kind: ActionKind::Source(pull),
            trust_boundary: None,
        }
    }

    pub fn build(
        name: impl Into<String>,
        project: BuildProject,
        input: ArtifactSlot,
        outputs: Vec<ArtifactSlot>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ActionKind::Build { project },
            inputs: vec![input],
            outputs,
            trust_boundary: None,
        }
    }

    pub fn archive(
        name: impl Into<String>,
        input: ArtifactSlot,
        bucket: BucketName,
        object_key: ArchivePath,
    ) -> Self {
        let location = stagecraft_core::full_location(&bucket, object_key.as_str());
        Self {
            name: name.into(),
            kind: ActionKind::Archive {
                bucket,
                object_key,
                location,
            },
            inputs: vec![input],
            outputs: Vec::new(),
            trust_boundary: None,
        }
    }

    /// Deploy `unit` from its template inside `compiled_output`, with
    /// authorization scoped to that unit alone.
    pub fn deploy(unit: &DeployableUnit, compiled_output: &ArtifactSlot) -> Self {
        Self {
            name: unit.name().to_string(),
            kind: ActionKind::Deploy {
                stack_name: unit.name().to_string(),
                template: compiled_output.at_path(template_file(unit.name())),
                admin_permissions: true,
            },
            inputs: vec![compiled_output.clone()],
            outputs: Vec::new(),
            trust_boundary: Some(TrustBoundary::deploy_unit(unit.name())),
        }
    }

    pub fn with_trust_boundary(mut self, boundary: TrustBoundary) -> Self {
        self.trust_boundary = Some(boundary);
        self
    }

    /// Template path for deploy actions.
    pub fn template(&self) -> Option<&ArtifactPath> {
        match &self.kind {
            ActionKind::Deploy { template, .. } => Some(template),
            _ => None,
        }
    }
}
