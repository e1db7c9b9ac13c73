//! Stagecraft CLI
//!
//! The `stagecraft` command assembles a self-mutating delivery pipeline from
//! a JSON configuration file.
//!
//! ## Commands
//!
//! - `synth`: assemble and write the pipeline definition as JSON
//! - `validate`: assemble and summarise stages, actions and digest
//! - `archive-location`: resolve a bucket and path to an object-storage URI

mod config;

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stagecraft_core::{emit_assembly_finished, full_location, BucketName, Grant};
use stagecraft_pipeline::PipelineDefinition;
use tracing::{info, Level};

use crate::config::PipelineConfig;

#[derive(Parser)]
#[command(name = "stagecraft")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assemble self-mutating delivery pipelines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the pipeline and write its definition
    Synth {
        /// Pipeline configuration file (JSON)
        #[arg(short, long, env = "STAGECRAFT_CONFIG")]
        config: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble the pipeline and report its shape
    Validate {
        /// Pipeline configuration file (JSON)
        #[arg(short, long, env = "STAGECRAFT_CONFIG")]
        config: PathBuf,
    },

    /// Print the object-storage URI for a bucket and path
    ArchiveLocation {
        /// Bucket name
        #[arg(long)]
        bucket: String,

        /// Key path inside the bucket
        #[arg(long, default_value = "")]
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    stagecraft_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Synth { config, output } => cmd_synth(&config, output.as_deref()),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::ArchiveLocation { bucket, path } => cmd_archive_location(&bucket, &path),
    }
}

fn assemble(config_path: &Path) -> Result<PipelineDefinition> {
    let config = PipelineConfig::load(config_path)?;
    let assembler = config
        .assemble()
        .with_context(|| format!("Failed to assemble pipeline {}", config.pipeline_name))?;
    info!(
        archive = %assembler.archive_location(),
        "Archive prefix fixed for this definition"
    );
    let definition = assembler.into_definition();
    let digest = definition.digest()?;
    emit_assembly_finished(&definition.name, definition.stages.len(), &digest);
    Ok(definition)
}

/// Assemble and write the definition
fn cmd_synth(config_path: &Path, output: Option<&Path>) -> Result<()> {
    let definition = assemble(config_path)?;
    let rendered = definition.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote pipeline definition");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Assemble and summarise
fn cmd_validate(config_path: &Path) -> Result<()> {
    let definition = assemble(config_path)?;
    print!("{}", render_summary(&definition)?);
    Ok(())
}

/// Stage-by-stage summary of an assembled definition.
///
/// Each action is listed with its kind; actions running under a trust
/// boundary show the boundary name, marked `*` when any grant is unscoped.
fn render_summary(definition: &PipelineDefinition) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Pipeline: {}", definition.name)?;
    writeln!(out, "Stack: {}", definition.stack_name)?;
    writeln!(out, "Digest: {}", definition.digest()?)?;
    writeln!(out)?;

    let mut deployments = 0;
    for (index, stage) in definition.stages.iter().enumerate() {
        let origin = if stage.is_fixed() {
            "fixed"
        } else {
            deployments += 1;
            "deployment"
        };
        writeln!(out, "  {}. {} [{}]", index + 1, stage.name, origin)?;
        for action in &stage.actions {
            write!(out, "     - {} ({})", action.name, action.kind.label())?;
            if let Some(boundary) = &action.trust_boundary {
                let marker = if boundary.grants.iter().any(Grant::is_wildcard) {
                    "*"
                } else {
                    ""
                };
                write!(out, " grants: {}{}", boundary.name, marker)?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "✓ {} stages ({} deployment), {} actions",
        definition.stages.len(),
        deployments,
        definition.action_count()
    )?;
    Ok(out)
}

/// Resolve a bucket/path pair
fn cmd_archive_location(bucket: &str, path: &str) -> Result<()> {
    let bucket = BucketName::new(bucket)?;
    println!("{}", full_location(&bucket, path));
    Ok(())
}
