use clap::Parser;

use crate::cmd::Commands;

/// Balanced, zone-aware task allocation for a team.
/// Reads a tasks sheet and a team sheet (CSV) and prints the plan.
#[derive(Parser)]
#[command(name = "talloc", version, about = "Zone-balanced task allocation CLI")]
pub struct Cli {
    /// Log level: error | warn | info | debug | trace. Falls back to RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
