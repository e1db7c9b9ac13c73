//! End-to-end assembly tests with a pinned clock and suffix source.

use chrono::{DateTime, NaiveDate, Utc};
use stagecraft_core::{
    ArtifactSlot, BucketName, ConfigurationError, DeployableUnit, DeploymentGroup, Environment,
    FixedClock, FixedSuffix, RepositoryDescriptor, RunPathAllocator, TrustBoundary,
    COMPILED_OUTPUT_SLOT,
};
use stagecraft_pipeline::{
    ActionKind, PipelineAssembler, PipelineProps, ARCHIVAL_STAGE, FIXED_STAGES, SOURCE_STAGE,
    SYNTHESIS_STAGE, SYNTH_ACTION,
};

const CONNECTION: &str = "arn:aws:codestar-connections:us-east-1:123456789:connection/abc";

fn repo(name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor::new(CONNECTION, "TemplateSoftware", name, None).expect("repo")
}

fn instant() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2023, 1, 24)
        .and_then(|d| d.and_hms_opt(11, 22, 33))
        .expect("valid date")
        .and_utc()
}

fn props_abc() -> PipelineProps {
    PipelineProps::new(
        "orders",
        repo("A"),
        BucketName::new("orders-archive").expect("bucket"),
    )
    .with_repository(repo("B"))
    .with_repository(repo("C"))
}

fn assemble(props: PipelineProps, suffix: &str) -> PipelineAssembler {
    let allocator = RunPathAllocator::new(Box::new(FixedSuffix::new(suffix)), suffix.len())
        .expect("allocator");
    PipelineAssembler::with_providers(props, &FixedClock(instant()), &allocator)
        .expect("assembly failed")
}

fn group(units: &[&str]) -> DeploymentGroup {
    let mut group = DeploymentGroup::new();
    for unit in units {
        group.add_unit(DeployableUnit::new(*unit).expect("unit"));
    }
    group
}

/// Test: fixed stage order and per-stage action order
#[test]
fn test_fixed_stage_sequence() {
    let assembler = assemble(props_abc(), "f00d");
    let def = assembler.definition();

    assert_eq!(def.stage_names(), FIXED_STAGES.to_vec());

    let source = def.stage_named(SOURCE_STAGE).expect("source stage");
    assert_eq!(
        source.action_names(),
        vec!["A-Source", "B-Source", "C-Source"]
    );

    let archival = def.stage_named(ARCHIVAL_STAGE).expect("archival stage");
    assert_eq!(archival.actions.len(), 3);
}

/// Test: registry holds one slot per repository, self repository first
#[test]
fn test_registry_order_and_lookup() {
    let assembler = assemble(props_abc(), "f00d");
    let names: Vec<_> = assembler
        .registry()
        .repositories()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    assert_eq!(
        assembler.artifact_for(&repo("B")).expect("B slot"),
        &ArtifactSlot::new("B")
    );
    assert!(matches!(
        assembler.artifact_for(&repo("Z")),
        Err(ConfigurationError::RepositoryNotFound { .. })
    ));
}

/// Test: synthesis consumes the self repository and produces the compiled output
#[test]
fn test_synthesis_wiring() {
    let assembler = assemble(props_abc(), "f00d");
    let synth = assembler
        .definition()
        .stage_named(SYNTHESIS_STAGE)
        .and_then(|s| s.action(SYNTH_ACTION))
        .expect("synth action");

    assert_eq!(synth.inputs, vec![ArtifactSlot::new("A")]);
    assert_eq!(synth.outputs, vec![assembler.compiled_output().clone()]);
    assert!(synth.trust_boundary.is_none());
}

/// Test: every archival action shares the single run prefix
#[test]
fn test_archival_shares_one_prefix() {
    let assembler = assemble(props_abc(), "f00d");
    let location = assembler.archive_location();

    assert_eq!(location.artifact_path().as_str(), "2023-01-24_11-22-33-f00d");
    assert_eq!(
        location.full_path(),
        "s3://orders-archive/2023-01-24_11-22-33-f00d"
    );

    let archival = assembler
        .definition()
        .stage_named(ARCHIVAL_STAGE)
        .expect("archival stage");
    let expected = ["A", "B", "C"];
    for (action, repo_name) in archival.actions.iter().zip(expected) {
        assert_eq!(action.name, format!("{repo_name}-replication"));
        assert_eq!(action.inputs, vec![ArtifactSlot::new(repo_name)]);
        match &action.kind {
            ActionKind::Archive {
                bucket,
                object_key,
                location,
            } => {
                assert_eq!(bucket.as_str(), "orders-archive");
                assert_eq!(
                    object_key.as_str(),
                    format!("2023-01-24_11-22-33-f00d/{repo_name}")
                );
                assert!(location.starts_with(&assembler.archive_location().full_path()));
            }
            other => panic!("expected archive action, got {other:?}"),
        }
    }
}

/// Test: a deployment stage is title-cased and resolves templates per unit
#[test]
fn test_add_deployment_stage() {
    let mut assembler = assemble(props_abc(), "f00d");
    assert_eq!(assembler.definition().stages.len(), 4);

    let handle = assembler
        .add_deployment_stage("prod", &group(&["network", "database"]))
        .expect("prod stage");
    assert_eq!(handle.name, "Prod");

    let stage = assembler.stage(&handle).expect("stage resolves");
    assert_eq!(stage.action_names(), vec!["network", "database"]);
    for action in &stage.actions {
        let template = action.template().expect("deploy template");
        assert_eq!(template.artifact, *assembler.compiled_output());
        assert_eq!(template.path, format!("cdk.out/{}.template.json", action.name));
        assert_eq!(
            action.trust_boundary,
            Some(TrustBoundary::deploy_unit(&action.name))
        );
        assert!(matches!(
            action.kind,
            ActionKind::Deploy {
                admin_permissions: true,
                ..
            }
        ));
    }
}

/// Test: deployment stages append in call order after the fixed stages
#[test]
fn test_multiple_environment_stages() {
    let mut assembler = assemble(props_abc(), "f00d");
    let units = group(&["network", "compute"]);
    for env in [Environment::Dev, Environment::Beta, Environment::Prod] {
        assembler.add_environment_stage(env, &units).expect("env stage");
    }

    let names = assembler.definition().stage_names();
    assert_eq!(&names[4..], &["Dev", "Beta", "Prod"]);
    assert_eq!(assembler.definition().action_count(), 3 + 1 + 1 + 3 + 6);
}

/// Test: an empty group cannot become a stage
#[test]
fn test_empty_deployment_group_rejected() {
    let mut assembler = assemble(props_abc(), "f00d");
    let err = assembler
        .add_deployment_stage("beta", &DeploymentGroup::new())
        .unwrap_err();
    assert_eq!(err, ConfigurationError::EmptyStage { stage: "Beta".into() });
    assert_eq!(assembler.definition().stages.len(), 4);
}

/// Test: identical inputs produce identical definitions
#[test]
fn test_definition_digest_stable() {
    let a = assemble(props_abc(), "f00d").into_definition();
    let b = assemble(props_abc(), "f00d").into_definition();
    assert_eq!(a, b);
    assert_eq!(a.digest().expect("digest"), b.digest().expect("digest"));

    let c = assemble(props_abc(), "beef").into_definition();
    assert_ne!(a.digest().expect("digest"), c.digest().expect("digest"));
}

/// Test: two repositories with the same name cannot share a source slot
#[test]
fn test_same_name_different_branch_collides() {
    let develop =
        RepositoryDescriptor::new(CONNECTION, "TemplateSoftware", "A", Some("develop".into()))
            .expect("repo");
    let allocator =
        RunPathAllocator::new(Box::new(FixedSuffix::new("f00d")), 4).expect("allocator");
    let err = PipelineAssembler::with_providers(
        props_abc().with_repository(develop),
        &FixedClock(instant()),
        &allocator,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::SlotConflict {
            slot: "A".into(),
            holder: "TemplateSoftware/A@main".into(),
            repo: "TemplateSoftware/A@develop".into(),
        }
    );
}

/// Test: a repository cannot take over the compiled-output slot
#[test]
fn test_repository_named_like_compiled_output_rejected() {
    let props = props_abc().with_repository(repo(COMPILED_OUTPUT_SLOT));
    let allocator =
        RunPathAllocator::new(Box::new(FixedSuffix::new("f00d")), 4).expect("allocator");
    let err = PipelineAssembler::with_providers(props, &FixedClock(instant()), &allocator)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::ReservedSlot { ref slot, .. } if slot == COMPILED_OUTPUT_SLOT
    ));
}

/// Test: every slot in the definition has exactly one producer
#[test]
fn test_each_slot_has_one_producer() {
    let assembler = assemble(props_abc(), "f00d");
    let mut producers = std::collections::HashMap::new();
    for stage in &assembler.definition().stages {
        for action in &stage.actions {
            for slot in &action.outputs {
                *producers.entry(slot.name().to_string()).or_insert(0) += 1;
            }
        }
    }
    assert_eq!(producers.len(), 4);
    assert!(producers.values().all(|&n| n == 1), "{producers:?}");
}

/// Test: the rendered definition carries provider-facing fields
#[test]
fn test_rendered_json_shape() {
    let assembler = assemble(props_abc(), "f00d");
    let json: serde_json::Value =
        serde_json::from_str(&assembler.definition().to_json_pretty().expect("render"))
            .expect("parse");

    assert_eq!(json["name"], "orders");
    assert_eq!(json["pipeline_type"], "V2");
    let first = &json["stages"][0]["actions"][0];
    assert_eq!(first["kind"]["type"], "source");
    assert_eq!(first["kind"]["owner"], "TemplateSoftware");
    assert_eq!(first["kind"]["branch"], "main");
    assert_eq!(first["kind"]["output"], "A");
    let mutate = &json["stages"][2]["actions"][0];
    assert_eq!(mutate["trust_boundary"]["name"], "self-mutation");
}

/// Test: the default providers yield a fresh prefix per assembly
#[test]
fn test_default_providers_allocate_unique_prefixes() {
    let a = PipelineAssembler::new(props_abc()).expect("assemble");
    let b = PipelineAssembler::new(props_abc()).expect("assemble");
    assert_ne!(a.run_prefix(), b.run_prefix());
    assert_eq!(a.run_prefix().suffix().len(), stagecraft_core::DEFAULT_SUFFIX_LEN);
}
