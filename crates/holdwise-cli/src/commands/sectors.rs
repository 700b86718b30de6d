//! Sectors command implementation.
//!
//! Shows sector and geography exposure across every investor's latest filing,
//! plus net money flow per sector between the last two selected filings.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::portfolio::BucketRow;
use crate::commands::{describe_selection, Context, PeriodArgs};
use crate::output::{format_value, print_header, print_json_value, print_output};

/// Arguments for the sectors command.
#[derive(Args, Debug)]
pub struct SectorsArgs {
    // Sector flows default to every period, comparing each investor's last two filings
    #[command(flatten)]
    pub periods: PeriodArgs,
}

/// A sector flow row.
#[derive(Debug, Serialize, Tabled)]
pub struct FlowRow {
    #[tabled(rename = "Sector")]
    pub sector: String,
    #[tabled(rename = "Net Flow")]
    pub net_flow: String,
}

#[derive(Serialize)]
struct SectorsOutput<'a> {
    exposure: &'a holdwise_analytics::insights::ExposureView,
    flows: &'a [holdwise_analytics::insights::SectorFlow],
}

/// Execute the sectors command.
pub fn execute(args: SectorsArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let selection = if args.periods.periods.is_empty() {
        holdwise_core::PeriodSelection::all()
    } else {
        args.periods.selection(context)?
    };

    let exposure = context.engine.exposure(&context.investors);
    let flows = context.engine.sector_flows(&context.investors, &selection);

    let sectors: Vec<BucketRow> = exposure.sectors.iter().map(Into::into).collect();
    let flow_rows: Vec<FlowRow> = flows
        .iter()
        .map(|f| FlowRow {
            sector: f.sector.clone(),
            net_flow: format_value(f.net_flow),
        })
        .collect();

    match format {
        OutputFormat::Table => {
            print_header(&format!(
                "Sector Exposure ({} total)",
                format_value(exposure.total_value)
            ));
            print_output(&sectors, format)?;

            print_header("Geographic Exposure");
            let geography: Vec<BucketRow> = exposure.geography.iter().map(Into::into).collect();
            print_output(&geography, format)?;

            print_header(&format!(
                "Sector Net Flows ({})",
                describe_selection(&selection)
            ));
            print_output(&flow_rows, format)?;
        }
        OutputFormat::Json => print_json_value(&SectorsOutput {
            exposure: &exposure,
            flows: &flows,
        })?,
        OutputFormat::Csv | OutputFormat::Minimal => print_output(&sectors, format)?,
    }
    Ok(())
}
