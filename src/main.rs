//! # talloc - Task Allocator CLI
//!
//! ## Quick Start
//!
//! ```bash
//! # Allocate and print the plan
//! talloc allocate --tasks tasks.csv --team team.csv
//!
//! # One member's rows, exported to CSV
//! talloc allocate --tasks tasks.csv --team team.csv --member Ada -o ada.csv
//!
//! # Check the sheets without allocating
//! talloc check --tasks tasks.csv --team team.csv
//! ```

use clap::Parser;

use task_allocator::cli::Cli;
use task_allocator::cmd::*;

fn init_logging(level: Option<&str>) {
    let mut builder = match level {
        Some(level) => {
            let filter = match level.to_lowercase().as_str() {
                "trace" => log::LevelFilter::Trace,
                "debug" => log::LevelFilter::Debug,
                "info" => log::LevelFilter::Info,
                "error" => log::LevelFilter::Error,
                "off" => log::LevelFilter::Off,
                _ => log::LevelFilter::Warn,
            };
            let mut b = env_logger::Builder::new();
            b.filter_level(filter);
            b
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")),
    };
    builder.format_timestamp(None).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Allocate {
            tasks, team, member, format, output, config, capacity,
            relock_on_exhaustion, no_novice_guard,
        } => cmd_allocate(&tasks, &team, member, format, output, config, capacity,
                          relock_on_exhaustion, no_novice_guard),

        Commands::Order { tasks } => cmd_order(&tasks),

        Commands::Check { tasks, team } => cmd_check(&tasks, &team),

        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
