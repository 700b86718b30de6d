//! Single-investor portfolio view.

use holdwise_core::reference::ReferenceData;
use holdwise_core::types::{Investor, MergedPosition, SecurityRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{
    calculate_geography_allocation, calculate_sector_allocation, AllocationBucket,
};
use crate::concentration::{calculate_concentration, ConcentrationMetric};
use crate::config::EngineConfig;
use crate::delta::{compute_deltas, DeltaSummary, PositionDelta};
use crate::merger::{merge_snapshot, MergedSnapshot};
use crate::resolver::SecurityResolver;
use crate::stats::{calculate_portfolio_stats, PortfolioStats};

/// A merged position annotated with its weight and change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPosition {
    /// Resolved security.
    pub security: SecurityRef,
    /// Merged position.
    pub position: MergedPosition,
    /// Weight as percentage of the portfolio (0-100).
    pub weight_pct: f64,
    /// Change against the previous snapshot.
    pub delta: PositionDelta,
}

/// Everything shown for one investor's latest filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedPortfolioView {
    /// Investor slug.
    pub investor: String,
    /// Investor display name.
    pub name: String,
    /// Latest snapshot, merged.
    pub latest: MergedSnapshot,
    /// Previous snapshot, merged.
    pub previous: Option<MergedSnapshot>,
    /// Total value of the latest snapshot.
    pub total_value: Decimal,
    /// Largest positions, heaviest first.
    pub top_positions: Vec<AnnotatedPosition>,
    /// Positions opened.
    pub new_positions: Vec<PositionDelta>,
    /// Positions added to.
    pub increased: Vec<PositionDelta>,
    /// Positions trimmed.
    pub decreased: Vec<PositionDelta>,
    /// Positions closed.
    pub closed: Vec<PositionDelta>,
    /// Delta counts and totals.
    pub summary: DeltaSummary,
    /// Sector allocation.
    pub sectors: Vec<AllocationBucket>,
    /// Geography allocation.
    pub geography: Vec<AllocationBucket>,
    /// Concentration metrics.
    pub concentration: ConcentrationMetric,
    /// History-wide statistics.
    pub stats: PortfolioStats,
}

/// Builds the portfolio view for an investor's latest snapshot.
///
/// Returns `None` for an investor that has never filed.
pub fn portfolio_view(
    investor: &Investor,
    resolver: &dyn SecurityResolver,
    reference: &ReferenceData,
    config: &EngineConfig,
) -> Option<EnhancedPortfolioView> {
    let latest = merge_snapshot(investor.latest()?);
    let previous = investor.previous().map(merge_snapshot);
    let report = compute_deltas(&latest, previous.as_ref(), resolver, &config.significance);

    let mut ranked: Vec<&MergedPosition> = latest.positions.iter().collect();
    ranked.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.identifier.cmp(&b.identifier))
    });
    let top_positions = ranked
        .into_iter()
        .take(config.top_positions)
        .filter_map(|position| {
            let delta = report.get(&position.identifier)?.clone();
            Some(AnnotatedPosition {
                security: delta.security.clone(),
                position: position.clone(),
                weight_pct: latest.weight_of(position.value) * 100.0,
                delta,
            })
        })
        .collect();

    let cloned = |deltas: Vec<&PositionDelta>| deltas.into_iter().cloned().collect::<Vec<_>>();

    Some(EnhancedPortfolioView {
        investor: investor.slug.clone(),
        name: investor.name.clone(),
        total_value: latest.total_value,
        top_positions,
        new_positions: cloned(report.new_positions()),
        increased: cloned(report.increased()),
        decreased: cloned(report.decreased()),
        closed: cloned(report.closed()),
        summary: report.summary(),
        sectors: calculate_sector_allocation(&latest, resolver, reference),
        geography: calculate_geography_allocation(&latest, resolver, reference),
        concentration: calculate_concentration(&latest, &config.concentration),
        stats: calculate_portfolio_stats(investor, resolver, &config.significance),
        latest,
        previous,
    })
}
