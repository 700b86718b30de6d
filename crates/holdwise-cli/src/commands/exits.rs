//! Exits command implementation.
//!
//! Tracks positions investors sold out of in their latest filing.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::{describe_selection, Context, PeriodArgs};
use crate::output::{format_value, print_header, print_output};

/// Arguments for the exits command.
#[derive(Args, Debug)]
pub struct ExitsArgs {
    #[command(flatten)]
    pub periods: PeriodArgs,

    /// Maximum number of securities to show
    #[arg(short, long, default_value = "25")]
    pub limit: usize,
}

/// An exit row.
#[derive(Debug, Serialize, Tabled)]
pub struct ExitRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Exits")]
    pub exits: usize,
    #[tabled(rename = "Avg Held (qtrs)")]
    pub avg_held: String,
    #[tabled(rename = "Value Exited")]
    pub value: String,
    #[tabled(rename = "Exited By")]
    pub exited_by: String,
}

/// Execute the exits command.
pub fn execute(args: ExitsArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let selection = args.periods.selection(context)?;
    let exits = context.engine.exits(&context.investors, &selection);

    let rows: Vec<ExitRow> = exits
        .iter()
        .take(args.limit)
        .map(|e| ExitRow {
            ticker: e.security.key().to_string(),
            name: e.security.name.clone(),
            exits: e.exited_by.len(),
            avg_held: format!("{:.1}", e.avg_holding_period),
            value: format_value(e.total_value_exited),
            exited_by: e.exited_by.join(", "),
        })
        .collect();

    if format == OutputFormat::Table {
        print_header(&format!("Exits ({})", describe_selection(&selection)));
    }
    print_output(&rows, format)
}
