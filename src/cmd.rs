//! Command implementations for the CLI interface.
//!
//! Each subcommand reads its input sheets, hands them to the allocation core
//! and renders whatever comes back. Errors propagate to `main` as
//! `anyhow::Error` with the offending file named in the context.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::{info, warn};

use crate::config::AllocConfig;
use crate::engine::allocate;
use crate::fields::OutputFormat;
use crate::ingest::{read_tasks, read_team};
use crate::report::*;
use crate::sorter::sort_tasks;
use crate::task::{Task, Worker};
use crate::zones::ZoneAssigner;

#[derive(Subcommand)]
pub enum Commands {
    /// Allocate tasks to the team and print the plan.
    Allocate {
        /// Tasks sheet (columns: id, time, priority, difficulty, zone).
        #[arg(long)]
        tasks: PathBuf,
        /// Team sheet (columns: name, speed).
        #[arg(long)]
        team: PathBuf,
        /// Only show rows for this team member.
        #[arg(long)]
        member: Option<String>,
        /// Output format: table | csv | json.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Also write the plan as CSV to this path (unassigned tasks go to
        /// <stem>_unassigned.csv next to it).
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// JSON config file with run policy overrides.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Per-member time cap in adjusted minutes.
        #[arg(long)]
        capacity: Option<f64>,
        /// Permit zone relock on exhaustion.
        #[arg(long)]
        relock_on_exhaustion: bool,
        /// Disable the novice difficulty guard.
        #[arg(long)]
        no_novice_guard: bool,
    },

    /// Print the order tasks will be processed in.
    Order {
        /// Tasks sheet.
        #[arg(long)]
        tasks: PathBuf,
    },

    /// Validate the input sheets without allocating.
    Check {
        /// Tasks sheet.
        #[arg(long)]
        tasks: PathBuf,
        /// Team sheet.
        #[arg(long)]
        team: PathBuf,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Load the config file if given, then apply CLI overrides on top.
pub fn resolve_config(
    path: Option<&Path>,
    capacity: Option<f64>,
    relock_on_exhaustion: bool,
    no_novice_guard: bool,
) -> Result<AllocConfig> {
    let mut config = match path {
        Some(p) => AllocConfig::load(p)
            .with_context(|| format!("Failed to load config '{}'", p.display()))?,
        None => AllocConfig::default(),
    };
    if let Some(cap) = capacity {
        config.capacity = cap;
    }
    if relock_on_exhaustion {
        config.relock_on_exhaustion = true;
    }
    if no_novice_guard {
        config.novice_guard = false;
    }
    config.validate()?;
    Ok(config)
}

fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    read_tasks(path).with_context(|| format!("Failed to read tasks from '{}'", path.display()))
}

fn load_team(path: &Path) -> Result<Vec<Worker>> {
    read_team(path).with_context(|| format!("Failed to read team from '{}'", path.display()))
}

/// Path of the unassigned export that accompanies `output`.
pub fn unassigned_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("allocation_result");
    output.with_file_name(format!("{stem}_unassigned.csv"))
}

/// Run an allocation and render it.
#[allow(clippy::too_many_arguments)]
pub fn cmd_allocate(
    tasks_path: &Path,
    team_path: &Path,
    member: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    capacity: Option<f64>,
    relock_on_exhaustion: bool,
    no_novice_guard: bool,
) -> Result<()> {
    let config = resolve_config(
        config_path.as_deref(),
        capacity,
        relock_on_exhaustion,
        no_novice_guard,
    )?;
    let tasks = load_tasks(tasks_path)?;
    let team = load_team(team_path)?;

    if let Some(ref name) = member {
        if !team.iter().any(|w| &w.name == name) {
            bail!("No team member named '{}'", name);
        }
    }

    let alloc = allocate(&tasks, team, &config)?;
    let rows = match member {
        Some(ref name) => alloc.rows_for(name),
        None => alloc.rows(),
    };

    match format {
        OutputFormat::Table => print_plan(&rows, &alloc.unassigned),
        OutputFormat::Csv => write_rows_csv(io::stdout().lock(), &rows)?,
        OutputFormat::Json => {
            let doc = PlanDocument::new(&alloc, rows.clone(), &config);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }

    if let Some(path) = output {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create '{}'", path.display()))?;
        write_rows_csv(file, &rows)?;
        info!("wrote {} row(s) to {}", rows.len(), path.display());
        if !alloc.unassigned.is_empty() {
            let extra = unassigned_path(&path);
            let file = File::create(&extra)
                .with_context(|| format!("Failed to create '{}'", extra.display()))?;
            write_unassigned_csv(file, &alloc.unassigned)?;
            info!("wrote {} unassigned task(s) to {}", alloc.unassigned.len(), extra.display());
        }
        eprintln!("Exported {} row(s) to {}", rows.len(), path.display());
    }

    if !alloc.unassigned.is_empty() {
        warn!("{} task(s) could not be assigned", alloc.unassigned.len());
    }
    Ok(())
}

/// Print the processing order for a tasks sheet.
pub fn cmd_order(tasks_path: &Path) -> Result<()> {
    let tasks = load_tasks(tasks_path)?;
    println!(
        "{:<5} {:<10} {:<14} {:<12} {:>4} {:>8}",
        "#", "ID", "Priority", "Zone", "Diff", "Time"
    );
    for (i, t) in sort_tasks(&tasks).iter().enumerate() {
        println!(
            "{:<5} {:<10} {:<14} {:<12} {:>4} {:>8}",
            i + 1,
            truncate(&t.id, 10),
            t.priority.as_str(),
            truncate(if t.zone.is_empty() { "-" } else { t.zone.as_str() }, 12),
            t.difficulty,
            t.time
        );
    }
    Ok(())
}

/// Validate both sheets and report what was found.
pub fn cmd_check(tasks_path: &Path, team_path: &Path) -> Result<()> {
    let tasks = load_tasks(tasks_path)?;
    let team = load_team(team_path)?;
    let zones = ZoneAssigner::from_tasks(&tasks);
    println!(
        "OK: {} task(s), {} team member(s), {} zone(s) in rotation",
        tasks.len(),
        team.len(),
        zones.zones().len()
    );
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
