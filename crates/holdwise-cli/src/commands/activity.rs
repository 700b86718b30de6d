//! Activity command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use holdwise_analytics::activity::ActivityView;

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::output::{print_header, print_output};

/// Arguments for the activity command.
#[derive(Args, Debug)]
pub struct ActivityArgs {
    /// Maximum number of investors to show
    #[arg(short, long, default_value = "25")]
    pub limit: usize,
}

/// An activity row.
#[derive(Debug, Serialize, Tabled)]
pub struct ActivityRow {
    #[tabled(rename = "Investor")]
    pub investor: String,
    #[tabled(rename = "Changes")]
    pub changes: usize,
    #[tabled(rename = "Increases")]
    pub increases: usize,
    #[tabled(rename = "Decreases")]
    pub decreases: usize,
    #[tabled(rename = "Latest Filing")]
    pub last_filing: String,
}

impl From<&ActivityView> for ActivityRow {
    fn from(v: &ActivityView) -> Self {
        Self {
            investor: v.name.clone(),
            changes: v.changes,
            increases: v.increases,
            decreases: v.decreases,
            last_filing: v
                .last_comparison
                .map_or_else(|| "-".to_string(), |d| d.to_string()),
        }
    }
}

/// Execute the activity command.
pub fn execute(args: ActivityArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let ranking = context.engine.activity_ranking(&context.investors);
    let rows: Vec<ActivityRow> = ranking.iter().take(args.limit).map(Into::into).collect();

    if format == OutputFormat::Table {
        print_header(&format!(
            "Most Active Investors (last {} comparisons)",
            context.engine.config().activity_comparisons
        ));
    }
    print_output(&rows, format)
}
