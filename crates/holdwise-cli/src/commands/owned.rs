//! Owned command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::OutputFormat;
use crate::commands::buys::count_rows;
use crate::commands::{describe_selection, Context, PeriodArgs};
use crate::output::{print_header, print_info, print_output};

/// Arguments for the owned command.
#[derive(Args, Debug)]
pub struct OwnedArgs {
    #[command(flatten)]
    pub periods: PeriodArgs,

    /// Maximum number of securities to show
    #[arg(short, long, default_value = "25")]
    pub limit: usize,
}

/// Execute the owned command.
pub fn execute(args: OwnedArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let selection = args.periods.selection(context)?;
    let ranking = context
        .engine
        .owned(&context.investors, &selection)
        .top(args.limit);

    if format == OutputFormat::Table {
        print_header(&format!("Most Owned ({})", describe_selection(&selection)));
        print_info(&format!("{} securities held", ranking.unique_securities));
    }
    print_output(&count_rows(&ranking), format)
}
