//! Holdings analytics engine.
//!
//! [`HoldingsEngine`] bundles the injected collaborators (security resolver,
//! reference tables and configuration) so callers do not have to thread them
//! through every analytic by hand. Every method is a thin wrapper around the
//! free function of the same concern.

use holdwise_core::reference::ReferenceData;
use holdwise_core::source::Dataset;
use holdwise_core::types::{Investor, Period, PeriodSelection};

use crate::activity::{activity_ranking, calculate_activity, ActivityView};
use crate::aggregate::{
    aggregate_biggest, aggregate_buys, aggregate_owned, data_coverage, latest_covered_period,
    AggregatedBuys, BiggestInvestments, DataCoverage, TopOwned,
};
use crate::config::EngineConfig;
use crate::consensus::{calculate_consensus, ConsensusView};
use crate::delta::{compute_deltas, DeltaReport};
use crate::error::AnalyticsResult;
use crate::history::{ownership_history, OwnershipPoint};
use crate::insights::{
    buy_sell_balance, cross_investor_exposure, exit_tracker, momentum_shifts, new_discoveries,
    sector_net_flows, BuySellBalance, DiscoveryRecord, ExitRecord, ExposureView, MomentumRecord,
    SectorFlow,
};
use crate::merger::merge_snapshot;
use crate::resolver::{MasterResolver, SecurityResolver};
use crate::scoreboard::{calculate_scoreboard, ScoreboardView};
use crate::stats::{calculate_portfolio_stats, PortfolioStats};
use crate::view::{portfolio_view, EnhancedPortfolioView};

/// Stateless analytics engine over injected tables and configuration.
pub struct HoldingsEngine {
    resolver: Box<dyn SecurityResolver>,
    reference: ReferenceData,
    config: EngineConfig,
}

impl std::fmt::Debug for HoldingsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldingsEngine")
            .field("reference", &self.reference)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HoldingsEngine {
    /// Creates an engine after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidConfig` if a threshold is out of range.
    pub fn new(
        resolver: impl SecurityResolver + 'static,
        reference: ReferenceData,
        config: EngineConfig,
    ) -> AnalyticsResult<Self> {
        config.validate()?;
        Ok(Self {
            resolver: Box::new(resolver),
            reference,
            config,
        })
    }

    /// Creates an engine from a dataset's security master and reference tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset fails validation or the configuration
    /// is invalid.
    pub fn from_dataset(dataset: &Dataset, config: EngineConfig) -> AnalyticsResult<Self> {
        dataset.validate()?;
        Self::new(
            MasterResolver::new(dataset.securities.clone()),
            dataset.reference_data(),
            config,
        )
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reference tables.
    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Security resolver.
    #[must_use]
    pub fn resolver(&self) -> &dyn SecurityResolver {
        self.resolver.as_ref()
    }

    // =========================================================================
    // SINGLE INVESTOR
    // =========================================================================

    /// Deltas between an investor's latest and previous snapshots.
    #[must_use]
    pub fn latest_deltas(&self, investor: &Investor) -> Option<DeltaReport> {
        let current = merge_snapshot(investor.latest()?);
        let previous = investor.previous().map(merge_snapshot);
        Some(compute_deltas(
            &current,
            previous.as_ref(),
            self.resolver(),
            &self.config.significance,
        ))
    }

    /// Enhanced view of an investor's latest filing.
    #[must_use]
    pub fn portfolio(&self, investor: &Investor) -> Option<EnhancedPortfolioView> {
        portfolio_view(investor, self.resolver(), &self.reference, &self.config)
    }

    /// Significant activity over the investor's recent filings.
    #[must_use]
    pub fn activity(&self, investor: &Investor) -> ActivityView {
        calculate_activity(investor, self.resolver(), &self.config)
    }

    /// Holding period and turnover statistics.
    #[must_use]
    pub fn stats(&self, investor: &Investor) -> PortfolioStats {
        calculate_portfolio_stats(investor, self.resolver(), &self.config.significance)
    }

    /// Ownership of one security across the investor's filings.
    #[must_use]
    pub fn ownership_history(&self, investor: &Investor, security_key: &str) -> Vec<OwnershipPoint> {
        ownership_history(investor, security_key, self.resolver())
    }

    // =========================================================================
    // CROSS INVESTOR
    // =========================================================================

    /// Investors with significant changes, most active first.
    #[must_use]
    pub fn activity_ranking(&self, investors: &[Investor]) -> Vec<ActivityView> {
        activity_ranking(investors, self.resolver(), &self.config)
    }

    /// Investors ranked by total value change.
    #[must_use]
    pub fn scoreboard(&self, investors: &[Investor]) -> ScoreboardView {
        calculate_scoreboard(investors, &self.config)
    }

    /// Consensus and contrarian holdings.
    #[must_use]
    pub fn consensus(&self, investors: &[Investor]) -> ConsensusView {
        calculate_consensus(investors, self.resolver(), &self.config)
    }

    /// Securities bought in the selected periods.
    #[must_use]
    pub fn buys(&self, investors: &[Investor], selection: &PeriodSelection) -> AggregatedBuys {
        aggregate_buys(investors, selection, self.resolver(), &self.config)
    }

    /// Securities by number of holders.
    #[must_use]
    pub fn owned(&self, investors: &[Investor], selection: &PeriodSelection) -> TopOwned {
        aggregate_owned(investors, selection, self.resolver(), &self.config)
    }

    /// Securities by aggregate value.
    #[must_use]
    pub fn biggest(&self, investors: &[Investor], selection: &PeriodSelection) -> BiggestInvestments {
        aggregate_biggest(investors, selection, self.resolver(), &self.config)
    }

    /// Most recent period filed by enough investors.
    #[must_use]
    pub fn latest_covered_period(&self, investors: &[Investor]) -> Option<Period> {
        latest_covered_period(investors, self.config.insights.period_coverage)
    }

    /// Investors and filings behind a period selection.
    #[must_use]
    pub fn coverage(&self, investors: &[Investor], selection: &PeriodSelection) -> DataCoverage {
        data_coverage(investors, selection)
    }

    // =========================================================================
    // INSIGHTS
    // =========================================================================

    /// Tracked exits.
    #[must_use]
    pub fn exits(&self, investors: &[Investor], selection: &PeriodSelection) -> Vec<ExitRecord> {
        exit_tracker(investors, selection, self.resolver(), &self.config)
    }

    /// Shared new discoveries.
    #[must_use]
    pub fn discoveries(
        &self,
        investors: &[Investor],
        selection: &PeriodSelection,
    ) -> Vec<DiscoveryRecord> {
        new_discoveries(investors, selection, self.resolver(), &self.config)
    }

    /// Shared momentum shifts.
    #[must_use]
    pub fn momentum(&self, investors: &[Investor], selection: &PeriodSelection) -> Vec<MomentumRecord> {
        momentum_shifts(investors, selection, self.resolver(), &self.config)
    }

    /// Net money flow per sector.
    #[must_use]
    pub fn sector_flows(&self, investors: &[Investor], selection: &PeriodSelection) -> Vec<SectorFlow> {
        sector_net_flows(
            investors,
            selection,
            self.resolver(),
            &self.reference,
            &self.config,
        )
    }

    /// Buy/sell balance per period.
    #[must_use]
    pub fn buy_sell_balance(
        &self,
        investors: &[Investor],
        selection: &PeriodSelection,
    ) -> Vec<BuySellBalance> {
        buy_sell_balance(investors, selection, self.resolver(), &self.config)
    }

    /// Sector and geography exposure across latest filings.
    #[must_use]
    pub fn exposure(&self, investors: &[Investor]) -> ExposureView {
        cross_investor_exposure(investors, self.resolver(), &self.reference, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use chrono::NaiveDate;
    use holdwise_core::types::{Position, SecurityMaster, SecurityRecord, Snapshot};
    use rust_decimal_macros::dec;

    fn dataset() -> Dataset {
        let snapshot = Snapshot::new(
            "Q4 2024".parse().unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
        )
        .with_positions(vec![Position {
            name: "APPLE INC".to_string(),
            identifier: "037833100".to_string(),
            shares: dec!(10),
            value: dec!(2500),
            ticker: None,
        }]);
        Dataset::new(
            SecurityMaster::new(vec![
                SecurityRecord::new("037833100", "AAPL", "Apple Inc.").with_sector("Hardware")
            ]),
            vec![Investor::new("fund", "Fund", vec![snapshot])],
        )
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig::default().with_top_positions(0);
        let err = HoldingsEngine::new(MasterResolver::default(), ReferenceData::default(), config)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_dataset() {
        let dataset = dataset();
        let engine = HoldingsEngine::from_dataset(&dataset, EngineConfig::sequential()).unwrap();

        let view = engine.portfolio(&dataset.investors[0]).unwrap();
        assert_eq!(view.top_positions[0].security.key(), "AAPL");
        assert_eq!(view.new_positions.len(), 1);

        // the default table wins over master sectors
        assert_eq!(engine.reference().sector_for(Some("AAPL")), "Technology");

        let report = engine.latest_deltas(&dataset.investors[0]).unwrap();
        assert_eq!(report.deltas.len(), 1);
    }

    #[test]
    fn test_from_dataset_rejects_duplicates() {
        let mut dataset = dataset();
        dataset.investors.push(dataset.investors[0].clone());
        let err = HoldingsEngine::from_dataset(&dataset, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, AnalyticsError::Data(_)));
    }
}
