//! The command line parser of the `ferrum-tables` binary.

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "ferrum-tables")]
#[command(about = "An in-memory relational table store", long_about = None)]
pub struct CliParser {
    // What to run.
    #[arg(required = true)]
    pub mode: Option<CliMode>,

    // Fanout of the primary key index, overrides FERRUM_INDEX_ORDER.
    #[arg(long)]
    pub order: Option<usize>,

    // Print the final table as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, ValueEnum)]
pub enum CliMode {
    // Run a short scripted session against an in-memory table.
    Demo,

    // Print the effective engine configuration.
    Config,
}
