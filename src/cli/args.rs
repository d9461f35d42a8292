//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, init::InitArgs, part::PartCommands, product::ProductCommands,
    report::ReportCommands,
};

#[derive(Parser)]
#[command(name = "invman")]
#[command(author, version, about = "Inventory Manager")]
#[command(long_about = "Track in-house and outsourced parts and the products assembled from them.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .invman/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Acting user id recorded on changes (overrides config)
    #[arg(long, global = true, env = "INVMAN_USER_ID")]
    pub user: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new inventory project
    Init(InitArgs),

    /// Part management (in-house and outsourced)
    #[command(subcommand)]
    Part(PartCommands),

    /// Product management (products and their associated parts)
    #[command(subcommand)]
    Product(ProductCommands),

    /// Inventory reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for lists, details for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
