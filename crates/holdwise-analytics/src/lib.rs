//! # Holdwise Analytics
//!
//! Comparative analytics over institutional holdings filings.
//!
//! This crate turns investors' quarterly snapshots into:
//! - **Resolution & merging**: Canonical securities and one position per identifier
//! - **Deltas**: Period-over-period classification with significance flags
//! - **Concentration**: Herfindahl index, top-N weights, sector and geography buckets
//! - **Cross-investor views**: Consensus, contrarian, buys, ownership, biggest positions
//! - **Rankings**: Scoreboard and activity
//! - **Insights**: Exits, discoveries, momentum, sector flows, buy/sell balance
//!
//! ## Architecture
//!
//! `holdwise-analytics` depends on `holdwise-core` for the domain types. All
//! analytics are pure functions over read-only inputs; the security master,
//! reference tables and thresholds are injected. [`HoldingsEngine`] bundles
//! those collaborators for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use holdwise_analytics::prelude::*;
//! use holdwise_core::prelude::*;
//!
//! let period: Period = "Q4 2024".parse().unwrap();
//! let filed = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
//! let snapshot = Snapshot::new(period, filed).with_position(
//!     Position::builder()
//!         .name("APPLE INC")
//!         .identifier("037833100")
//!         .ticker("AAPL")
//!         .shares(dec!(100))
//!         .value(dec!(25000))
//!         .build()
//!         .unwrap(),
//! );
//! let investor = Investor::new("fund", "Example Fund", vec![snapshot]);
//!
//! let engine = HoldingsEngine::new(
//!     MasterResolver::default(),
//!     ReferenceData::default(),
//!     EngineConfig::default(),
//! )
//! .unwrap();
//!
//! let view = engine.portfolio(&investor).unwrap();
//! assert_eq!(view.new_positions.len(), 1);
//! assert_eq!(view.sectors[0].label, "Technology");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;

pub use error::{AnalyticsError, AnalyticsResult};

// ============================================================================
// MODULES
// ============================================================================

// Configuration and execution
pub mod config;
pub mod parallel;

// Resolution and merging
pub mod merger;
pub mod resolver;

// Single-snapshot analytics
pub mod allocation;
pub mod concentration;
pub mod delta;

// Per-investor views
pub mod activity;
pub mod history;
pub mod stats;
pub mod view;

// Cross-investor analytics
pub mod aggregate;
pub mod consensus;
pub mod insights;
pub mod scoreboard;

// Facade
pub mod engine;

pub use config::{
    ConcentrationBands, ConsensusThresholds, EngineConfig, InsightThresholds,
    SignificanceThresholds,
};
pub use engine::HoldingsEngine;
pub use resolver::{MasterResolver, SecurityResolver};

/// Prelude module for convenient imports.
///
/// ```rust
/// use holdwise_analytics::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{AnalyticsError, AnalyticsResult};

    // Configuration
    pub use crate::config::{
        ConcentrationBands, ConsensusThresholds, EngineConfig, InsightThresholds,
        SignificanceThresholds,
    };

    // Resolution and merging
    pub use crate::merger::{merge_positions, merge_snapshot, MergedSnapshot};
    pub use crate::resolver::{MasterResolver, SecurityResolver};

    // Single snapshot
    pub use crate::allocation::{
        calculate_geography_allocation, calculate_sector_allocation, AllocationBucket,
    };
    pub use crate::concentration::{
        calculate_concentration, ConcentrationBand, ConcentrationMetric,
    };
    pub use crate::delta::{
        compute_deltas, diff_snapshots, history_deltas, DeltaClass, DeltaReport, DeltaSummary,
        PositionDelta,
    };

    // Per investor
    pub use crate::activity::{activity_ranking, calculate_activity, ActivityView};
    pub use crate::history::{ownership_history, OwnershipPoint};
    pub use crate::stats::{calculate_portfolio_stats, PortfolioStats};
    pub use crate::view::{portfolio_view, AnnotatedPosition, EnhancedPortfolioView};

    // Cross investor
    pub use crate::aggregate::{
        aggregate_biggest, aggregate_buys, aggregate_owned, data_coverage, latest_covered_period,
        AggregatedBuys, BiggestInvestments, DataCoverage, Ranking, SecurityCount, SecurityValue,
        TopOwned,
    };
    pub use crate::consensus::{
        calculate_consensus, ConsensusRecord, ContrarianRecord, ConsensusView, InvestorWeight,
    };
    pub use crate::insights::{
        buy_sell_balance, cross_investor_exposure, exit_tracker, momentum_shifts,
        new_discoveries, sector_net_flows, BuySellBalance, DiscoveryRecord, ExitRecord,
        ExposureView, MomentumRecord, SectorFlow, Sentiment,
    };
    pub use crate::scoreboard::{calculate_scoreboard, ScoreboardEntry, ScoreboardView};

    pub use crate::engine::HoldingsEngine;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_compiles() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.top_positions, 20);
    }
}
