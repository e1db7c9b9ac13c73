//! Pipeline configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stagecraft_core::{BucketName, DeployableUnit, DeploymentGroup, RepositoryDescriptor};
use stagecraft_pipeline::{PipelineAssembler, PipelineProps};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub connection: String,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub branch: Option<String>,
}

impl RepositoryConfig {
    fn descriptor(&self) -> stagecraft_core::Result<RepositoryDescriptor> {
        RepositoryDescriptor::new(
            self.connection.clone(),
            self.owner.clone(),
            self.name.clone(),
            self.branch.clone(),
        )
    }
}

/// One deployment stage: a label and the units deployed under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub stage: String,
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub pipeline_name: String,

    #[serde(default)]
    pub stack_name: Option<String>,

    pub archive_bucket: String,

    pub self_repository: RepositoryConfig,

    #[serde(default)]
    pub additional_repositories: Vec<RepositoryConfig>,

    #[serde(default)]
    pub deployments: Vec<DeploymentConfig>,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid pipeline config {}", path.display()))
    }

    pub fn props(&self) -> stagecraft_core::Result<PipelineProps> {
        let mut props = PipelineProps::new(
            self.pipeline_name.clone(),
            self.self_repository.descriptor()?,
            BucketName::new(self.archive_bucket.clone())?,
        );
        props.stack_name = self.stack_name.clone();
        for repo in &self.additional_repositories {
            props = props.with_repository(repo.descriptor()?);
        }
        Ok(props)
    }

    /// Assemble the fixed stages, then every configured deployment stage in order.
    pub fn assemble(&self) -> stagecraft_core::Result<PipelineAssembler> {
        let mut assembler = PipelineAssembler::new(self.props()?)?;
        for deployment in &self.deployments {
            let group = deployment
                .units
                .iter()
                .map(DeployableUnit::new)
                .collect::<stagecraft_core::Result<DeploymentGroup>>()?;
            assembler.add_deployment_stage(&deployment.stage, &group)?;
        }
        Ok(assembler)
    }
}
