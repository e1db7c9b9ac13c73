//! Pipeline assembly.
//!
//! Builds the fixed stage sequence
//! `Source -> Synthesis -> Self-Mutation -> Archival` and lets callers append
//! deployment stages afterwards. Assembly is synchronous and only builds an
//! in-memory graph; nothing here talks to a provider.

use stagecraft_core::{
    emit_archive_prefix_allocated, emit_assembly_started, emit_stage_added, to_title_case,
    ArchiveLocation, ArchivePath, ArtifactRegistry, ArtifactSlot, AssemblySpan, BucketName,
    Clock, ConfigurationError, DeploymentGroup, Environment, RepositoryDescriptor, Result,
    RunPathAllocator, RunPathPrefix, SystemClock, TrustBoundary,
};
use tracing::{debug, info};

use crate::action::Action;
use crate::build::{BuildProject, BuiltinProject};
use crate::definition::PipelineDefinition;
use crate::stage::{
    Stage, StageHandle, ARCHIVAL_STAGE, SELF_MUTATION_STAGE, SOURCE_STAGE, SYNTHESIS_STAGE,
};

/// Name of the synthesis build action.
pub const SYNTH_ACTION: &str = "Synth";

/// Name of the self-mutation build action.
pub const SELF_MUTATE_ACTION: &str = "SelfMutate";

/// Caller-supplied pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineProps {
    /// Pipeline name.
    pub pipeline_name: String,

    /// Stack holding the pipeline. Defaults to the pipeline name.
    pub stack_name: Option<String>,

    /// Repository that defines this pipeline.
    pub self_repository: RepositoryDescriptor,

    /// Further repositories pulled and archived on every run.
    pub additional_repositories: Vec<RepositoryDescriptor>,

    /// Bucket receiving the per-run repository archives.
    pub archive_bucket: BucketName,
}

impl PipelineProps {
    pub fn new(
        pipeline_name: impl Into<String>,
        self_repository: RepositoryDescriptor,
        archive_bucket: BucketName,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            stack_name: None,
            self_repository,
            additional_repositories: Vec::new(),
            archive_bucket,
        }
    }

    pub fn with_repository(mut self, repo: RepositoryDescriptor) -> Self {
        self.additional_repositories.push(repo);
        self
    }

    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    /// Self repository first, then the additional ones in caller order.
    pub fn all_repositories(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        std::iter::once(&self.self_repository).chain(self.additional_repositories.iter())
    }
}

/// Assembles and owns one pipeline definition.
#[derive(Debug)]
pub struct PipelineAssembler {
    self_repository: RepositoryDescriptor,
    registry: ArtifactRegistry,
    compiled_output: ArtifactSlot,
    run_prefix: RunPathPrefix,
    archive: ArchiveLocation,
    definition: PipelineDefinition,
}

impl PipelineAssembler {
    /// Assemble with the wall clock and random UUID suffixes.
    pub fn new(props: PipelineProps) -> Result<Self> {
        Self::with_providers(props, &SystemClock, &RunPathAllocator::default())
    }

    /// Assemble with an injected clock and path allocator.
    ///
    /// The clock is read once and one prefix is allocated; every archival
    /// action of this definition shares it.
    pub fn with_providers(
        props: PipelineProps,
        clock: &dyn Clock,
        allocator: &RunPathAllocator,
    ) -> Result<Self> {
        if props.pipeline_name.trim().is_empty() {
            return Err(ConfigurationError::EmptyField {
                field: "pipeline_name".to_string(),
                context: "pipeline".to_string(),
            });
        }
        let pipeline = props.pipeline_name.clone();
        let _span = AssemblySpan::enter(&pipeline);
        let stack_name = props
            .stack_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| pipeline.clone());

        emit_assembly_started(&pipeline, props.all_repositories().count());

        let mut registry = ArtifactRegistry::new();
        for repo in props.all_repositories() {
            registry.register(repo)?;
        }

        let run_prefix = allocator.allocate(&clock.now());
        let archive = ArchiveLocation::new(
            props.archive_bucket.clone(),
            ArchivePath::from(&run_prefix),
        );
        emit_archive_prefix_allocated(&pipeline, &archive.full_path());

        let mut assembler = Self {
            self_repository: props.self_repository,
            registry,
            compiled_output: ArtifactSlot::compiled_output(),
            run_prefix,
            archive,
            definition: PipelineDefinition::new(pipeline, stack_name),
        };

        let source = assembler.source_stage();
        assembler.push_stage(source)?;
        let synthesis = assembler.synthesis_stage()?;
        assembler.push_stage(synthesis)?;
        let self_mutation = assembler.self_mutation_stage();
        assembler.push_stage(self_mutation)?;
        let archival = assembler.archival_stage()?;
        assembler.push_stage(archival)?;

        info!(
            pipeline = %assembler.definition.name,
            stages = assembler.definition.stages.len(),
            "Assembled fixed pipeline stages"
        );
        Ok(assembler)
    }

    fn source_stage(&self) -> Stage {
        let actions = self
            .registry
            .iter()
            .map(|(repo, slot)| Action::source(repo.create_pull_action(slot.clone())))
            .collect();
        Stage::new(SOURCE_STAGE, actions)
    }

    fn synthesis_stage(&self) -> Result<Stage> {
        let input = self
            .registry
            .lookup(&self.self_repository)
            .map_err(|_| ConfigurationError::MissingSelfRepository {
                stage: SYNTHESIS_STAGE.to_string(),
            })?
            .clone();
        let project = self.builtin_project(BuiltinProject::Synthesis);
        Ok(Stage::new(
            SYNTHESIS_STAGE,
            vec![Action::build(
                SYNTH_ACTION,
                project,
                input,
                vec![self.compiled_output.clone()],
            )],
        ))
    }

    /// The self-mutation action runs inside [`TrustBoundary::self_mutation`].
    /// It redeploys the pipeline's own stack, including the roles the
    /// pipeline runs under.
    fn self_mutation_stage(&self) -> Stage {
        let project = self.builtin_project(BuiltinProject::SelfMutation);
        let action = Action::build(
            SELF_MUTATE_ACTION,
            project,
            self.compiled_output.clone(),
            Vec::new(),
        )
        .with_trust_boundary(TrustBoundary::self_mutation());
        Stage::new(SELF_MUTATION_STAGE, vec![action])
    }

    fn archival_stage(&self) -> Result<Stage> {
        let mut actions = Vec::with_capacity(self.registry.len());
        for repo in self.registry.repositories() {
            let input = self.registry.lookup(repo)?.clone();
            actions.push(Action::archive(
                format!("{}-replication", repo.name()),
                input,
                self.archive.bucket().clone(),
                self.archive.artifact_path().join(repo.name()),
            ));
        }
        Ok(Stage::new(ARCHIVAL_STAGE, actions))
    }

    fn builtin_project(&self, project: BuiltinProject) -> BuildProject {
        BuildProject::from_builtin(project, &self.definition.name, &self.definition.stack_name)
    }

    fn push_stage(&mut self, stage: Stage) -> Result<StageHandle> {
        let actions = stage.actions.len();
        let handle = self.definition.add_stage(stage)?;
        emit_stage_added(&self.definition.name, &handle.name, actions);
        Ok(handle)
    }

    /// Append a deployment stage named after `label` in title case, with one
    /// deploy action per unit of `group`.
    pub fn add_deployment_stage(
        &mut self,
        label: &str,
        group: &DeploymentGroup,
    ) -> Result<StageHandle> {
        let _span = AssemblySpan::enter(&self.definition.name);
        let stage_name = to_title_case(label);
        debug!(stage = %stage_name, units = group.len(), "Adding deployment stage");

        let actions = group
            .units()
            .iter()
            .map(|unit| Action::deploy(unit, &self.compiled_output))
            .collect();
        self.push_stage(Stage::new(stage_name, actions))
    }

    /// [`Self::add_deployment_stage`] labelled after a conventional environment.
    pub fn add_environment_stage(
        &mut self,
        environment: Environment,
        group: &DeploymentGroup,
    ) -> Result<StageHandle> {
        self.add_deployment_stage(environment.label(), group)
    }

    /// Source artifact slot for `repo`.
    pub fn artifact_for(&self, repo: &RepositoryDescriptor) -> Result<&ArtifactSlot> {
        self.registry.lookup(repo)
    }

    pub fn archive_location(&self) -> &ArchiveLocation {
        &self.archive
    }

    pub fn run_prefix(&self) -> &RunPathPrefix {
        &self.run_prefix
    }

    pub fn compiled_output(&self) -> &ArtifactSlot {
        &self.compiled_output
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub fn stage(&self, handle: &StageHandle) -> Option<&Stage> {
        self.definition.stage(handle)
    }

    pub fn into_definition(self) -> PipelineDefinition {
        self.definition
    }
}
