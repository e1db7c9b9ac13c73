//! Build projects run by the compute executor.
//!
//! The build specification is an opaque payload to the assembler; it only
//! decides which project is wired to which artifact slots.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Image every builtin project runs on.
pub const DEFAULT_BUILD_IMAGE: &str = "aws/codebuild/standard:7.0";

/// Projects every pipeline carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinProject {
    /// Compile the pipeline's own definition into deployable templates.
    Synthesis,

    /// Redeploy the pipeline stack from the compiled output.
    SelfMutation,
}

impl BuiltinProject {
    /// Project name for the pipeline called `pipeline`.
    pub fn project_name(&self, pipeline: &str) -> String {
        match self {
            BuiltinProject::Synthesis => format!("{pipeline}-pipeline-synthesis"),
            BuiltinProject::SelfMutation => format!("{pipeline}-pipeline-mutation"),
        }
    }

    /// Install-phase commands.
    pub fn install_commands(&self) -> Vec<String> {
        match self {
            BuiltinProject::Synthesis => {
                vec!["npm install -g aws-cdk".to_string(), "npm ci".to_string()]
            }
            BuiltinProject::SelfMutation => vec!["npm ci".to_string()],
        }
    }

    /// Build-phase commands. `stack` is the stack that holds the pipeline.
    pub fn build_commands(&self, stack: &str) -> Vec<String> {
        match self {
            BuiltinProject::Synthesis => vec!["npx cdk synth".to_string()],
            BuiltinProject::SelfMutation => {
                vec![format!("npx cdk deploy {stack} --require-approval=never")]
            }
        }
    }

    /// Whether the project uploads its working tree as an output artifact.
    pub fn exports_artifacts(&self) -> bool {
        matches!(self, BuiltinProject::Synthesis)
    }

    /// Declarative phase list handed to the executor.
    pub fn build_spec(&self, stack: &str) -> Value {
        let mut spec = json!({
            "version": "0.2",
            "phases": {
                "install": { "commands": self.install_commands() },
                "build": { "commands": self.build_commands(stack) },
            },
        });
        if self.exports_artifacts() {
            spec["artifacts"] = json!({ "files": ["**/*"] });
        }
        spec
    }
}

/// A build project as wired into a pipeline action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildProject {
    /// Project name.
    pub name: String,

    /// Build image.
    pub image: String,

    /// Opaque build specification.
    pub spec: Value,
}

impl BuildProject {
    /// Instantiate a builtin project for `pipeline`, deployed as `stack`.
    pub fn from_builtin(project: BuiltinProject, pipeline: &str, stack: &str) -> Self {
        Self {
            name: project.project_name(pipeline),
            image: DEFAULT_BUILD_IMAGE.to_string(),
            spec: project.build_spec(stack),
        }
    }
}
