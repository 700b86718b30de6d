//! CLI command implementations.

pub mod activity;
pub mod biggest;
pub mod buys;
pub mod consensus;
pub mod exits;
pub mod history;
pub mod insights;
pub mod owned;
pub mod portfolio;
pub mod scoreboard;
pub mod sectors;

// Re-export submodules for convenience
pub use activity::ActivityArgs;
pub use biggest::BiggestArgs;
pub use buys::BuysArgs;
pub use consensus::ConsensusArgs;
pub use exits::ExitsArgs;
pub use history::HistoryArgs;
pub use insights::InsightsArgs;
pub use owned::OwnedArgs;
pub use portfolio::PortfolioArgs;
pub use scoreboard::ScoreboardArgs;
pub use sectors::SectorsArgs;

use std::path::Path;

use clap::Args;
use holdwise_analytics::{EngineConfig, HoldingsEngine};
use holdwise_core::{collect_investors, Dataset, Investor, Period, PeriodSelection};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};

/// Loaded dataset plus a configured engine.
pub struct Context {
    /// Analytics engine over the dataset's tables.
    pub engine: HoldingsEngine,
    /// Investors in slug order.
    pub investors: Vec<Investor>,
}

impl Context {
    /// Reads the dataset and optional TOML configuration.
    pub fn load(dataset_path: &Path, config_path: Option<&Path>) -> CliResult<Self> {
        let dataset_error = |message: String| CliError::Dataset {
            path: dataset_path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(dataset_path)
            .map_err(|e| dataset_error(e.to_string()))?;
        let dataset: Dataset =
            serde_json::from_str(&content).map_err(|e| dataset_error(e.to_string()))?;
        dataset.validate().map_err(|e| dataset_error(e.to_string()))?;

        let config = match config_path {
            Some(path) => {
                debug!("loading engine configuration from {}", path.display());
                EngineConfig::from_file(path)?
            }
            None => EngineConfig::default(),
        };

        let engine = HoldingsEngine::from_dataset(&dataset, config)?;
        let investors = collect_investors(&dataset);
        info!(
            "loaded {} investors and {} securities",
            investors.len(),
            dataset.securities.len()
        );

        Ok(Self { engine, investors })
    }

    /// Finds an investor by slug.
    pub fn investor(&self, slug: &str) -> CliResult<&Investor> {
        self.investors
            .iter()
            .find(|i| i.slug == slug)
            .ok_or_else(|| CliError::UnknownInvestor(slug.to_string()))
    }
}

/// Period filter shared by the cross-investor commands.
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Reporting period to include, e.g. "Q4 2024" (repeatable).
    /// Defaults to the latest period filed by enough investors.
    #[arg(short, long = "period", value_name = "PERIOD")]
    pub periods: Vec<String>,

    /// Include every period in the dataset
    #[arg(long, conflicts_with = "periods")]
    pub all: bool,
}

impl PeriodArgs {
    /// Resolves the arguments to a period selection.
    pub fn selection(&self, context: &Context) -> CliResult<PeriodSelection> {
        if self.all {
            return Ok(PeriodSelection::all());
        }
        if !self.periods.is_empty() {
            let periods = self
                .periods
                .iter()
                .map(|label| parse_period(label))
                .collect::<CliResult<Vec<_>>>()?;
            return Ok(PeriodSelection::only(periods));
        }

        Ok(match context.engine.latest_covered_period(&context.investors) {
            Some(period) => {
                debug!("defaulting to period {period}");
                PeriodSelection::single(period)
            }
            None => PeriodSelection::all(),
        })
    }
}

/// Parses a period label ("Q4 2024" or "2024-Q4").
pub fn parse_period(label: &str) -> CliResult<Period> {
    label
        .parse()
        .map_err(|_| CliError::InvalidPeriod(label.to_string()))
}

/// Describes a selection for section headers.
pub fn describe_selection(selection: &PeriodSelection) -> String {
    match selection.periods() {
        None => "all periods".to_string(),
        Some(periods) => periods
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}
