//! CLI entrypoint for rhizome
//!
//! Wires the store and backend adapters into a rhizome, registers the demo
//! agents, injects any messages as human input, and runs beats to
//! quiescence.

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use rhizome_application::{
    Agent, AgentContext, AgentError, AgentProgram, ArtifactStore, Backend, PredicateRequirement,
    Requirement, Rhizome, ValidationResult, views,
};
use rhizome_domain::util::truncate_chars;
use rhizome_domain::{CompostEntry, SnapshotSection};
use rhizome_infrastructure::{ConfigLoader, GitWorkspace, InMemoryStore, StubBackend};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments for rhizome
#[derive(Parser, Debug)]
#[command(name = "rhizome")]
#[command(version, about = "Precondition-driven multi-agent beat scheduler")]
#[command(long_about = r#"
Rhizome runs agents against a shared compost pile in discrete beats. Each
beat drains human input (killing runnable foreground agents), dispatches
background agents, activates agents whose needs are satisfied, runs
everything pending, checks advisory postconditions, then persists the pile
and commits the workspace.

This binary registers two demo agents: `bootstrap` seeds the pile on the
first beat, and `echo` mirrors the latest human input once one exists.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. RHIZOME_* env vars
3. ./rhizome.toml or ./.rhizome.toml

Example:
  rhizome "Hello, rhizome!"
  rhizome --git --root ./garden -v "plant something"
"#)]
struct Cli {
    /// Human input to inject before the first beat (repeatable)
    message: Vec<String>,

    /// Workspace root (a scratch directory when --git is set without it)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Use the git-backed store instead of the in-memory one
    #[arg(long)]
    git: bool,

    /// Maximum number of beats to run
    #[arg(long, value_name = "N")]
    beats: Option<usize>,

    /// Concurrent action bound per beat (overrides config)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Print the full pile history, superseded entries included
    #[arg(long)]
    history: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Seeds the pile with an initial status entry. Runs on the first beat
/// because it needs nothing.
struct BootstrapProgram;

#[async_trait]
impl AgentProgram for BootstrapProgram {
    async fn run(
        &self,
        rhizome: &Rhizome,
        _backend: &dyn Backend,
        _ctx: AgentContext,
    ) -> Result<(), AgentError> {
        rhizome.compost().add(CompostEntry::new(
            "bootstrap:status",
            "Rhizome initialized. Awaiting human input.",
            "bootstrap",
        ));
        Ok(())
    }
}

/// Mirrors the latest human input into the pile, superseding its own
/// previous echo.
struct EchoProgram;

#[async_trait]
impl AgentProgram for EchoProgram {
    async fn run(
        &self,
        rhizome: &Rhizome,
        _backend: &dyn Backend,
        _ctx: AgentContext,
    ) -> Result<(), AgentError> {
        if let Some(last) = rhizome.humanity_snapshot().last() {
            rhizome.compost().add(
                CompostEntry::new(
                    "echo:last_input",
                    format!("Human said: {}", last.content),
                    "echo",
                )
                .with_supersedes("echo:last_input"),
            );
        }
        Ok(())
    }
}

fn has_human_input() -> Arc<dyn Requirement> {
    Arc::new(PredicateRequirement::new(
        "human input present",
        |snapshot| {
            if snapshot.section(SnapshotSection::Human).is_some() {
                ValidationResult::satisfied()
            } else {
                ValidationResult::unsatisfied("no human input yet")
            }
        },
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting rhizome");

    let file_config = ConfigLoader::load(cli.config.as_deref())?;
    let mut config = file_config.into_rhizome_config(".");

    // Keep the scratch dir alive until the run finishes
    let mut _scratch: Option<tempfile::TempDir> = None;
    if let Some(root) = cli.root {
        config.root = root;
    } else if cli.git {
        let dir = tempfile::tempdir()?;
        config.root = dir.path().to_path_buf();
        _scratch = Some(dir);
    }
    if let Some(n) = cli.concurrency {
        config = config.with_concurrency(n);
    }

    // === Dependency Injection ===
    let backend = Arc::new(StubBackend::new());
    let store: Arc<dyn ArtifactStore> = if cli.git {
        Arc::new(GitWorkspace::open(&config.root).await?)
    } else {
        Arc::new(InMemoryStore::new())
    };

    let rhizome = Rhizome::new(config, backend, store);
    rhizome.initialize().await?;

    rhizome.register(Agent::new("bootstrap", Arc::new(BootstrapProgram)));
    rhizome.register(Agent::new("echo", Arc::new(EchoProgram)).with_need(has_human_input()));

    for message in &cli.message {
        rhizome.human_input(message.clone());
    }

    let records = rhizome.run(cli.beats).await?;

    println!();
    for record in &records {
        println!("--- Beat {} ---", record.beat_number);
        if !record.killed.is_empty() {
            println!("  Killed:    {}", record.killed.join(", "));
        }
        println!("  Activated: {}", record.activated.join(", "));
        println!("  Completed: {}", record.completed.join(", "));
        if !record.failed.is_empty() {
            println!("  Failed:    {}", record.failed.join(", "));
        }
        if !record.postcondition_warnings.is_empty() {
            println!("  Warnings:  {}", record.postcondition_warnings.len());
        }
        if let Some(id) = &record.commit_id {
            println!("  Commit:    {id}");
        }
    }

    println!();
    println!("Compost pile:");
    for entry in rhizome.compost().active_entries() {
        println!(
            "  [{}] {}: {}",
            entry.author,
            entry.key,
            truncate_chars(&entry.content, 80)
        );
    }

    if cli.history {
        println!();
        println!("History:");
        println!("{}", views::anthology(&rhizome).render());
    }

    Ok(())
}
