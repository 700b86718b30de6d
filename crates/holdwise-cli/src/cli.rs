//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{
    ActivityArgs, BiggestArgs, BuysArgs, ConsensusArgs, ExitsArgs, HistoryArgs, InsightsArgs,
    OwnedArgs, PortfolioArgs, ScoreboardArgs, SectorsArgs,
};

/// Holdwise - Institutional holdings analytics CLI
#[derive(Parser)]
#[command(name = "holdwise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Holdings dataset (JSON: security master plus investors)
    #[arg(short, long, env = "HOLDWISE_DATASET")]
    pub dataset: PathBuf,

    /// Engine configuration file (TOML)
    #[arg(short, long, env = "HOLDWISE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show an investor's latest portfolio with changes and allocation
    Portfolio(PortfolioArgs),

    /// Show an investor's ownership of one security over time
    History(HistoryArgs),

    /// Rank investors by recent significant trading activity
    Activity(ActivityArgs),

    /// Rank investors by quarter-over-quarter portfolio value change
    Scoreboard(ScoreboardArgs),

    /// List consensus and contrarian holdings
    Consensus(ConsensusArgs),

    /// Rank securities by number of investors buying them
    Buys(BuysArgs),

    /// Rank securities by number of investors holding them
    Owned(OwnedArgs),

    /// Rank securities by aggregate value held
    Biggest(BiggestArgs),

    /// Track positions investors sold out of
    Exits(ExitsArgs),

    /// Show sector exposure and net sector flows
    Sectors(SectorsArgs),

    /// Show new discoveries, momentum shifts and buy/sell balance
    Insights(InsightsArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (first row only)
    Minimal,
}
