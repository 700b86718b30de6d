//! Scoreboard command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::output::{format_change, format_value, print_header, print_output};

/// Arguments for the scoreboard command.
#[derive(Args, Debug)]
pub struct ScoreboardArgs {
    /// Maximum number of investors to show
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// A scoreboard row.
#[derive(Debug, Serialize, Tabled)]
pub struct ScoreboardRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Investor")]
    pub investor: String,
    #[tabled(rename = "Period")]
    pub period: String,
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[tabled(rename = "Current")]
    pub current: String,
    #[tabled(rename = "Change")]
    pub change: String,
}

/// Execute the scoreboard command.
pub fn execute(args: ScoreboardArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let board = context.engine.scoreboard(&context.investors);
    let rows: Vec<ScoreboardRow> = board
        .iter()
        .take(args.limit.unwrap_or(board.len()))
        .enumerate()
        .map(|(i, entry)| ScoreboardRow {
            rank: i + 1,
            investor: entry.name.clone(),
            period: entry.period.to_string(),
            previous: format_value(entry.previous_total),
            current: format_value(entry.current_total),
            change: format_change(entry.change_pct * 100.0),
        })
        .collect();

    if format == OutputFormat::Table {
        print_header("Portfolio Scoreboard");
    }
    print_output(&rows, format)
}
