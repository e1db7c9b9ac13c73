//! Stagecraft core library
//!
//! Leaf domain types for assembling a self-mutating delivery pipeline:
//! - `RepositoryDescriptor`: a source repository and its pull action
//! - `ArtifactRegistry`: repository to artifact-slot bindings
//! - `RunPathAllocator`: timestamped, collision-resistant archive prefixes
//! - `ArchiveLocation`: bucket + normalized path, resolved to an object-storage URI
//! - `TrustBoundary`: auditable authorization scopes
//! - `DeploymentGroup`: units deployed together into one environment

pub mod archive;
pub mod artifact;
pub mod environment;
pub mod error;
pub mod grants;
pub mod obs;
pub mod repository;
pub mod run_path;
pub mod telemetry;
pub mod text;

pub use archive::{full_location, ArchiveLocation, ArchivePath, BucketName, OBJECT_STORE_SCHEME};
pub use artifact::{ArtifactPath, ArtifactRegistry, ArtifactSlot, COMPILED_OUTPUT_SLOT};
pub use environment::{DeployableUnit, DeploymentGroup, Environment};
pub use error::{ConfigurationError, Result};
pub use grants::{Grant, TrustBoundary};
pub use obs::{
    emit_archive_prefix_allocated, emit_assembly_finished, emit_assembly_started,
    emit_stage_added, AssemblySpan,
};
pub use repository::{PullAction, RepositoryDescriptor, DEFAULT_BRANCH};
pub use run_path::{
    format_timestamp, normalize, Clock, FixedClock, FixedSuffix, RunPathAllocator, RunPathPrefix,
    SuffixSource, SystemClock, UuidSuffix, DEFAULT_SUFFIX_LEN, MAX_SUFFIX_LEN,
};
pub use telemetry::init_tracing;
pub use text::to_title_case;
