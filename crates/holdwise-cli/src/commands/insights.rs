//! Insights command implementation.
//!
//! New discoveries, momentum shifts and the buy/sell balance per period.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use holdwise_analytics::aggregate::DataCoverage;
use holdwise_analytics::insights::{BuySellBalance, DiscoveryRecord, MomentumRecord};

use crate::cli::OutputFormat;
use crate::commands::{describe_selection, Context, PeriodArgs};
use crate::output::{
    format_shares, format_value, print_header, print_info, print_json_value, print_output,
};

/// Arguments for the insights command.
#[derive(Args, Debug)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub periods: PeriodArgs,

    /// Maximum number of securities per section
    #[arg(short, long, default_value = "15")]
    pub limit: usize,
}

/// A discovery row.
#[derive(Debug, Serialize, Tabled)]
pub struct DiscoveryRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Investors")]
    pub investors: usize,
    #[tabled(rename = "Total Value")]
    pub total: String,
    #[tabled(rename = "Avg Position")]
    pub average: String,
}

impl From<&DiscoveryRecord> for DiscoveryRow {
    fn from(d: &DiscoveryRecord) -> Self {
        Self {
            ticker: d.security.key().to_string(),
            name: d.security.name.clone(),
            investors: d.discovered_by.len(),
            total: format_value(d.total_value),
            average: format_value(d.avg_position),
        }
    }
}

/// A momentum row.
#[derive(Debug, Serialize, Tabled)]
pub struct MomentumRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Investors")]
    pub investors: usize,
    #[tabled(rename = "From")]
    pub from: String,
    #[tabled(rename = "To")]
    pub to: String,
}

impl From<&MomentumRecord> for MomentumRow {
    fn from(m: &MomentumRecord) -> Self {
        Self {
            ticker: m.security.key().to_string(),
            investors: m.investors.len(),
            from: format_shares(m.from_shares),
            to: format_shares(m.to_shares),
        }
    }
}

/// A buy/sell balance row.
#[derive(Debug, Serialize, Tabled)]
pub struct BalanceRow {
    #[tabled(rename = "Period")]
    pub period: String,
    #[tabled(rename = "Buys")]
    pub buys: String,
    #[tabled(rename = "Sells")]
    pub sells: String,
    #[tabled(rename = "Net")]
    pub net: String,
    #[tabled(rename = "Sentiment")]
    pub sentiment: String,
}

impl From<&BuySellBalance> for BalanceRow {
    fn from(b: &BuySellBalance) -> Self {
        Self {
            period: b.period.to_string(),
            buys: format!("{} ({})", format_value(b.total_buys), b.buys_count),
            sells: format!("{} ({})", format_value(b.total_sells), b.sells_count),
            net: format_value(b.net_flow),
            sentiment: b.sentiment.to_string(),
        }
    }
}

#[derive(Serialize)]
struct InsightsOutput {
    coverage: DataCoverage,
    discoveries: Vec<DiscoveryRecord>,
    momentum: Vec<MomentumRecord>,
    balance: Vec<BuySellBalance>,
}

/// Execute the insights command.
pub fn execute(args: InsightsArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let selection = args.periods.selection(context)?;
    let engine = &context.engine;

    let mut output = InsightsOutput {
        coverage: engine.coverage(&context.investors, &selection),
        discoveries: engine.discoveries(&context.investors, &selection),
        momentum: engine.momentum(&context.investors, &selection),
        balance: engine.buy_sell_balance(&context.investors, &selection),
    };
    output.discoveries.truncate(args.limit);
    output.momentum.truncate(args.limit);

    let discoveries: Vec<DiscoveryRow> = output.discoveries.iter().map(Into::into).collect();
    let balance: Vec<BalanceRow> = output.balance.iter().map(Into::into).collect();

    match format {
        OutputFormat::Table => {
            let scope = describe_selection(&selection);
            let coverage = &output.coverage;
            print_info(&format!(
                "{} of {} investors filed for {scope} ({} of {} filings, last filed {})",
                coverage.investors_with_data,
                coverage.total_investors,
                coverage.filings_in_period,
                coverage.total_filings,
                coverage
                    .last_updated
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
            ));
            print_header(&format!("New Discoveries ({scope})"));
            print_output(&discoveries, format)?;

            print_header(&format!("Momentum Shifts ({scope})"));
            let momentum: Vec<MomentumRow> = output.momentum.iter().map(Into::into).collect();
            print_output(&momentum, format)?;

            print_header("Buy/Sell Balance");
            print_output(&balance, format)?;
        }
        OutputFormat::Json => print_json_value(&output)?,
        OutputFormat::Csv | OutputFormat::Minimal => print_output(&balance, format)?,
    }
    Ok(())
}
