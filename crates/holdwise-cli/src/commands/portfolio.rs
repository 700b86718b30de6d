//! Portfolio command implementation.
//!
//! Shows one investor's latest filing: top positions, changes against the
//! previous filing, allocation and concentration.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use holdwise_analytics::allocation::AllocationBucket;
use holdwise_analytics::delta::{DeltaClass, PositionDelta};
use holdwise_analytics::view::{AnnotatedPosition, EnhancedPortfolioView};

use crate::cli::OutputFormat;
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{
    format_change, format_pct, format_shares, format_value, print_header, print_json_value,
    print_output, KeyValue,
};

/// Arguments for the portfolio command.
#[derive(Args, Debug)]
pub struct PortfolioArgs {
    /// Investor slug
    pub investor: String,

    /// Number of top positions to show (defaults to the configured count)
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Also list every new, increased, decreased and closed position
    #[arg(long)]
    pub changes: bool,
}

/// A position row.
#[derive(Debug, Serialize, Tabled)]
pub struct PositionRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Shares")]
    pub shares: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Weight")]
    pub weight: String,
    #[tabled(rename = "Change")]
    pub change: String,
}

impl From<&AnnotatedPosition> for PositionRow {
    fn from(p: &AnnotatedPosition) -> Self {
        let change = match (p.delta.class, p.delta.percent_change) {
            (DeltaClass::Increased | DeltaClass::Decreased, Some(pct)) => {
                format!("{} ({})", p.delta.class, format_change(pct))
            }
            (class, _) => class.to_string(),
        };
        Self {
            ticker: p.security.key().to_string(),
            name: p.security.name.clone(),
            shares: format_shares(p.position.shares),
            value: format_value(p.position.value),
            weight: format_pct(p.weight_pct),
            change,
        }
    }
}

/// A position change row.
#[derive(Debug, Serialize, Tabled)]
pub struct ChangeRow {
    #[tabled(rename = "Ticker")]
    pub ticker: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Change")]
    pub class: String,
    #[tabled(rename = "Before")]
    pub before: String,
    #[tabled(rename = "After")]
    pub after: String,
    #[tabled(rename = "Shares %")]
    pub percent: String,
    #[tabled(rename = "Significant")]
    pub significant: String,
}

impl From<&PositionDelta> for ChangeRow {
    fn from(d: &PositionDelta) -> Self {
        Self {
            ticker: d.security.key().to_string(),
            name: d.security.name.clone(),
            class: d.class.to_string(),
            before: format_shares(d.previous_shares),
            after: format_shares(d.current_shares),
            percent: d.percent_change.map_or_else(|| "-".to_string(), format_change),
            significant: if d.significant { "yes" } else { "" }.to_string(),
        }
    }
}

/// An allocation bucket row.
#[derive(Debug, Serialize, Tabled)]
pub struct BucketRow {
    #[tabled(rename = "Bucket")]
    pub label: String,
    #[tabled(rename = "Positions")]
    pub count: usize,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Weight")]
    pub weight: String,
}

impl From<&AllocationBucket> for BucketRow {
    fn from(b: &AllocationBucket) -> Self {
        Self {
            label: b.label.clone(),
            count: b.count,
            value: format_value(b.value),
            weight: format_pct(b.weight_pct),
        }
    }
}

fn summary(view: &EnhancedPortfolioView) -> Vec<KeyValue> {
    let c = &view.concentration;
    let s = &view.summary;
    vec![
        KeyValue::new("Period", view.latest.period.to_string()),
        KeyValue::new("Filed", view.latest.filing_date.to_string()),
        KeyValue::new(
            "Previous",
            view.previous
                .as_ref()
                .map_or_else(|| "-".to_string(), |p| p.period.to_string()),
        ),
        KeyValue::new("Total Value", format_value(view.total_value)),
        KeyValue::new("Positions", c.position_count.to_string()),
        KeyValue::new(
            "Changes",
            format!(
                "{} new, {} increased, {} decreased, {} closed",
                s.new_count, s.increased_count, s.decreased_count, s.closed_count
            ),
        ),
        KeyValue::new("Value Change", format_value(s.total_value_change)),
        KeyValue::new("Herfindahl Index", format!("{:.4}", c.herfindahl_index)),
        KeyValue::new("Concentration", c.band.to_string()),
        KeyValue::new("Top 3 Weight", format_pct(c.top3_weight * 100.0)),
        KeyValue::new("Top 10 Weight", format_pct(c.top10_weight * 100.0)),
        KeyValue::new(
            "Avg Holding Period",
            format!("{:.1} quarters", view.stats.avg_holding_period_quarters),
        ),
        KeyValue::new("Avg Turnover", format_pct(view.stats.avg_turnover_pct)),
    ]
}

/// Execute the portfolio command.
pub fn execute(args: PortfolioArgs, context: &Context, format: OutputFormat) -> Result<()> {
    let investor = context.investor(&args.investor)?;
    let view = context
        .engine
        .portfolio(investor)
        .ok_or_else(|| CliError::NoSnapshots(investor.slug.clone()))?;

    let top = args.top.unwrap_or(view.top_positions.len());
    let rows: Vec<PositionRow> = view.top_positions.iter().take(top).map(Into::into).collect();

    match format {
        OutputFormat::Table => {
            print_header(&format!("{} ({})", view.name, view.latest.period));
            print_output(&summary(&view), format)?;

            print_header("Top Positions");
            print_output(&rows, format)?;

            print_header("Sector Allocation");
            let sectors: Vec<BucketRow> = view.sectors.iter().map(Into::into).collect();
            print_output(&sectors, format)?;

            print_header("Geography");
            let geography: Vec<BucketRow> = view.geography.iter().map(Into::into).collect();
            print_output(&geography, format)?;

            if args.changes {
                for (title, deltas) in [
                    ("New Positions", &view.new_positions),
                    ("Increased", &view.increased),
                    ("Decreased", &view.decreased),
                    ("Closed", &view.closed),
                ] {
                    print_header(title);
                    let changes: Vec<ChangeRow> = deltas.iter().map(Into::into).collect();
                    print_output(&changes, format)?;
                }
            }
        }
        OutputFormat::Json => print_json_value(&view)?,
        OutputFormat::Csv | OutputFormat::Minimal => print_output(&rows, format)?,
    }

    Ok(())
}
