//! archpipe - Multi-architecture CI pipeline synthesizer CLI
//!
//! ## Commands
//!
//! - `synth`: build the demo topology and emit the deployment template
//! - `validate`: re-check every topology assertion and report violations
//! - `describe`: print a human-readable stage/action table

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{info, Level};

use archpipe_core::{ActionKind, Environment, PipelineTopology};
use archpipe_core::resource::{ACCOUNT_PSEUDO_PARAM, REGION_PSEUDO_PARAM};
use archpipe_synth::{build_topology, evaluate, PipelineTemplate};

#[derive(Parser)]
#[command(name = "archpipe")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "x86-vs-arm64 demo pipeline synthesizer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Target account id (platform pseudo-parameter when unset)
    #[arg(long, global = true, env = "CDK_DEFAULT_ACCOUNT")]
    account: Option<String>,

    /// Target region (platform pseudo-parameter when unset)
    #[arg(long, global = true, env = "CDK_DEFAULT_REGION")]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the pipeline template
    Synth {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check all topology assertions against a fresh synthesis
    Validate,

    /// Print the stage/action table
    Describe,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    archpipe_core::init_tracing(cli.json, level);

    let env = resolve_environment(cli.account, cli.region);

    match cli.command {
        Commands::Synth { output } => cmd_synth(&env, output.as_deref()),
        Commands::Validate => cmd_validate(&env),
        Commands::Describe => cmd_describe(&env),
    }
}

/// Resolve the target environment from flags/env vars, falling back to
/// the platform pseudo-parameters the deploy step substitutes.
fn resolve_environment(account: Option<String>, region: Option<String>) -> Environment {
    let account = account
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| ACCOUNT_PSEUDO_PARAM.to_string());
    let region = region
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| REGION_PSEUDO_PARAM.to_string());
    Environment::new(account, region)
}

fn cmd_synth(env: &Environment, output: Option<&std::path::Path>) -> Result<()> {
    let topology = build_topology(env).context("Failed to build pipeline topology")?;
    let template =
        PipelineTemplate::render(topology).context("Failed to render pipeline template")?;
    let json = template
        .to_json_pretty()
        .context("Failed to serialize template")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write template to {}", path.display()))?;
            info!(path = %path.display(), digest = %template.digest, "Template written");
        }
        None => {
            println!("{}", json);
            info!(digest = %template.digest, "Template synthesized");
        }
    }
    Ok(())
}

fn cmd_validate(env: &Environment) -> Result<()> {
    let topology = build_topology(env).context("Failed to build pipeline topology")?;
    let report = evaluate(&topology, env);

    if report.passed {
        println!("PASS: {}", report.message);
        Ok(())
    } else {
        for violation in &report.violations {
            eprintln!("violation: {}", violation);
        }
        bail!("topology validation failed: {}", report.message);
    }
}

fn cmd_describe(env: &Environment) -> Result<()> {
    let topology = build_topology(env).context("Failed to build pipeline topology")?;
    print!("{}", describe_topology(&topology));
    Ok(())
}

/// Render the stage/action table: one block per stage, actions grouped by
/// run order so the barrier structure is visible.
fn describe_topology(topology: &PipelineTopology) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "pipeline: {}", topology.name);
    let _ = writeln!(out, "artifact: {}", topology.source_artifact);
    for (idx, stage) in topology.stages.iter().enumerate() {
        let _ = writeln!(out, "\n[{}] {}", idx + 1, stage.name);
        for (run_order, actions) in stage.concurrency_groups() {
            let _ = writeln!(out, "  run-order {}:", run_order);
            for action in actions {
                match &action.kind {
                    ActionKind::SourceCheckout {
                        repository, branch, ..
                    } => {
                        let _ = writeln!(
                            out,
                            "    {} (checkout {}@{})",
                            action.name, repository, branch
                        );
                    }
                    ActionKind::Build { job, .. } => {
                        let image = topology
                            .job(job)
                            .map(|j| j.image.image_id())
                            .unwrap_or("unknown image");
                        let _ = writeln!(out, "    {} (job {}, image {})", action.name, job, image);
                    }
                }
            }
        }
    }
    out
}
