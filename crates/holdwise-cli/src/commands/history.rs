//! History command implementation.
//!
//! Shows an investor's ownership of one security across every filing.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use holdwise_analytics::history::OwnershipPoint;

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::output::{format_pct, format_shares, format_value, print_header, print_output};

/// Arguments for the history command.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Investor slug
    pub investor: String,

    /// Ticker or identifier of the security
    pub security: String,
}

/// One filing's ownership row.
#[derive(Debug, Serialize, Tabled)]
pub struct HistoryRow {
    #[tabled(rename = "Period")]
    pub period: String,
    #[tabled(rename = "Filed")]
    pub filed: String,
    #[tabled(rename = "Shares")]
    pub shares: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Weight")]
    pub weight: String,
}

impl From<&OwnershipPoint> for HistoryRow {
    fn from(p: &OwnershipPoint) -> Self {
        let (shares, value, weight) = if p.held {
            (
                format_shares(p.shares),
                format_value(p.value),
                format_pct(p.weight_pct),
            )
        } else {
            ("-".to_string(), "-".to_string(), "-".to_string())
        };
        Self {
            period: p.period.to_string(),
            filed: p.filing_date.to_string(),
            shares,
            value,
            weight,
        }
    }
}

/// Execute the history command.
pub fn execute(args: HistoryArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let investor = context.investor(&args.investor)?;
    let points = context.engine.ownership_history(investor, &args.security);
    let rows: Vec<HistoryRow> = points.iter().map(Into::into).collect();

    if format == OutputFormat::Table {
        print_header(&format!("{} in {}", args.security.to_uppercase(), investor.name));
    }
    print_output(&rows, format)
}
