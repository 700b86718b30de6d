//! Biggest command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::{describe_selection, Context, PeriodArgs};
use crate::output::{format_value, print_header, print_info, print_output};

/// Arguments for the biggest command.
#[derive(Args, Debug)]
pub struct BiggestArgs {
    #[command(flatten)]
    pub periods: PeriodArgs,

    /// Maximum number of securities to show
    #[arg(short, long, default_value = "25")]
    pub limit: usize,
}

/// An aggregate value row.
#[derive(Debug, Serialize, Tabled)]
pub struct ValueRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Holders")]
    pub holders: usize,
}

/// Execute the biggest command.
pub fn execute(args: BiggestArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let selection = args.periods.selection(context)?;
    let ranking = context
        .engine
        .biggest(&context.investors, &selection)
        .top(args.limit);

    let rows: Vec<ValueRow> = ranking
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| ValueRow {
            rank: i + 1,
            ticker: entry.security.key().to_string(),
            name: entry.security.name.clone(),
            value: format_value(entry.value),
            holders: entry.holders,
        })
        .collect();

    if format == OutputFormat::Table {
        print_header(&format!(
            "Largest Aggregate Positions ({})",
            describe_selection(&selection)
        ));
        print_info(&format!("{} securities held", ranking.unique_securities));
    }
    print_output(&rows, format)
}
