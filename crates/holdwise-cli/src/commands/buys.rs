//! Buys command implementation.
//!
//! Ranks securities by the number of investors opening or adding to them.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use holdwise_analytics::aggregate::{Ranking, SecurityCount};

use crate::cli::OutputFormat;
use crate::commands::{describe_selection, Context, PeriodArgs};
use crate::output::{print_header, print_info, print_output};

/// Arguments for the buys command.
#[derive(Args, Debug)]
pub struct BuysArgs {
    #[command(flatten)]
    pub periods: PeriodArgs,

    /// Maximum number of securities to show
    #[arg(short, long, default_value = "25")]
    pub limit: usize,
}

/// A security count row.
#[derive(Debug, Serialize, Tabled)]
pub struct CountRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Investors")]
    pub investors: usize,
}

/// Converts a count ranking to rows.
pub fn count_rows(ranking: &Ranking<SecurityCount>) -> Vec<CountRow> {
    ranking
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| CountRow {
            rank: i + 1,
            ticker: entry.security.key().to_string(),
            name: entry.security.name.clone(),
            investors: entry.count,
        })
        .collect()
}

/// Execute the buys command.
pub fn execute(args: BuysArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let selection = args.periods.selection(context)?;
    let ranking = context
        .engine
        .buys(&context.investors, &selection)
        .top(args.limit);

    if format == OutputFormat::Table {
        print_header(&format!("Most Bought ({})", describe_selection(&selection)));
        print_info(&format!("{} securities bought", ranking.unique_securities));
    }
    print_output(&count_rows(&ranking), format)
}
