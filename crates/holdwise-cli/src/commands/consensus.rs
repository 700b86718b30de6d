//! Consensus command implementation.
//!
//! Lists securities many investors hold at meaningful weight, and securities
//! very few investors hold heavily.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use holdwise_analytics::consensus::ConsensusRecord;

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::output::{format_pct, format_value, print_header, print_json_value, print_output};

/// Arguments for the consensus command.
#[derive(Args, Debug)]
pub struct ConsensusArgs {
    /// Maximum number of securities per list
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Only show the contrarian list
    #[arg(long, conflicts_with = "consensus_only")]
    pub contrarian_only: bool,

    /// Only show the consensus list
    #[arg(long)]
    pub consensus_only: bool,
}

/// A consensus or contrarian row.
#[derive(Debug, Serialize, Tabled)]
pub struct ConsensusRow {
    #[tabled(rename = "List")]
    pub list: String,
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Investors")]
    pub investors: usize,
    #[tabled(rename = "Max Weight")]
    pub max_weight: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Held By")]
    pub held_by: String,
}

fn rows(list: &str, records: &[ConsensusRecord]) -> Vec<ConsensusRow> {
    records
        .iter()
        .map(|r| ConsensusRow {
            list: list.to_string(),
            ticker: r.security.key().to_string(),
            name: r.security.name.clone(),
            investors: r.investor_count,
            max_weight: format_pct(r.max_weight * 100.0),
            value: format_value(r.total_value),
            held_by: r
                .weights
                .iter()
                .map(|w| w.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

/// Execute the consensus command.
pub fn execute(args: ConsensusArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let mut view = context.engine.consensus(&context.investors);
    if args.contrarian_only {
        view.consensus.clear();
    }
    if args.consensus_only {
        view.contrarian.clear();
    }
    view.consensus.truncate(args.limit);
    view.contrarian.truncate(args.limit);

    let consensus = rows("consensus", &view.consensus);
    let contrarian = rows("contrarian", &view.contrarian);

    match format {
        OutputFormat::Table => {
            if !args.contrarian_only {
                print_header("Consensus Holdings");
                print_output(&consensus, format)?;
            }
            if !args.consensus_only {
                print_header("Contrarian Holdings");
                print_output(&contrarian, format)?;
            }
        }
        OutputFormat::Json => print_json_value(&view)?,
        OutputFormat::Csv | OutputFormat::Minimal => {
            let all: Vec<ConsensusRow> = consensus.into_iter().chain(contrarian).collect();
            print_output(&all, format)?;
        }
    }
    Ok(())
}
