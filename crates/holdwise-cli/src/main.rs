//! Holdwise CLI - Command-line interface for institutional holdings analytics.
//!
//! # Usage
//!
//! ```bash
//! # One investor's latest filing
//! holdwise --dataset holdings.json portfolio berkshire-hathaway
//!
//! # Investors ranked by quarter-over-quarter value change
//! holdwise --dataset holdings.json scoreboard
//!
//! # Most bought securities in a quarter, as JSON
//! holdwise --dataset holdings.json --format json buys --period "Q4 2024"
//!
//! # Custom thresholds
//! holdwise --dataset holdings.json --config holdwise.toml consensus
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holdwise=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("holdwise=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;
    let context = commands::Context::load(&cli.dataset, cli.config.as_deref())?;

    match cli.command {
        Commands::Portfolio(args) => commands::portfolio::execute(args, &context, format)?,
        Commands::History(args) => commands::history::execute(args, &context, format)?,
        Commands::Activity(args) => commands::activity::execute(args, &context, format)?,
        Commands::Scoreboard(args) => commands::scoreboard::execute(args, &context, format)?,
        Commands::Consensus(args) => commands::consensus::execute(args, &context, format)?,
        Commands::Buys(args) => commands::buys::execute(args, &context, format)?,
        Commands::Owned(args) => commands::owned::execute(args, &context, format)?,
        Commands::Biggest(args) => commands::biggest::execute(args, &context, format)?,
        Commands::Exits(args) => commands::exits::execute(args, &context, format)?,
        Commands::Sectors(args) => commands::sectors::execute(args, &context, format)?,
        Commands::Insights(args) => commands::insights::execute(args, &context, format)?,
    }

    Ok(())
}
