//! Holding period and turnover statistics over an investor's history.

use holdwise_core::types::Investor;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SignificanceThresholds;
use crate::delta::{history_deltas, DeltaReport};
use crate::merger::{merge_snapshot, MergedSnapshot};
use crate::resolver::SecurityResolver;

/// History-wide statistics for one investor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Number of snapshots considered.
    pub snapshot_count: usize,
    /// Mean span, in snapshots, between first and last appearance of each
    /// security (inclusive). Zero with fewer than two snapshots.
    pub avg_holding_period_quarters: f64,
    /// Mean quarterly turnover as a percentage. Zero with fewer than two
    /// snapshots.
    pub avg_turnover_pct: f64,
}

/// Computes holding period and turnover statistics.
#[must_use]
pub fn calculate_portfolio_stats(
    investor: &Investor,
    resolver: &dyn SecurityResolver,
    thresholds: &SignificanceThresholds,
) -> PortfolioStats {
    let merged: Vec<MergedSnapshot> = investor.snapshots.iter().map(merge_snapshot).collect();
    let reports = history_deltas(&merged, resolver, thresholds);
    PortfolioStats {
        snapshot_count: merged.len(),
        avg_holding_period_quarters: average_holding_period(&merged),
        avg_turnover_pct: average_turnover_pct(&reports),
    }
}

/// Average inclusive first-to-last appearance span per identifier.
#[must_use]
pub fn average_holding_period(snapshots: &[MergedSnapshot]) -> f64 {
    if snapshots.len() < 2 {
        return 0.0;
    }

    let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, snapshot) in snapshots.iter().enumerate() {
        for position in &snapshot.positions {
            seen.entry(position.identifier.as_str())
                .and_modify(|span| span.1 = index)
                .or_insert((index, index));
        }
    }

    if seen.is_empty() {
        return 0.0;
    }
    let total: usize = seen.values().map(|(first, last)| last - first + 1).sum();
    total as f64 / seen.len() as f64
}

/// Turnover of one comparison as a fraction of the two snapshots' average
/// total: half the summed absolute value changes.
///
/// Returns `None` when both totals are zero.
#[must_use]
pub fn period_turnover(report: &DeltaReport) -> Option<f64> {
    let average_total = (report.current_total + report.previous_total) / Decimal::TWO;
    if average_total <= Decimal::ZERO {
        return None;
    }

    let traded: Decimal = report.deltas.iter().map(|d| d.value_delta().abs()).sum();
    (traded / Decimal::TWO / average_total).to_f64()
}

/// Mean of [`period_turnover`] over the given comparisons, as a percentage.
#[must_use]
pub fn average_turnover_pct(reports: &[DeltaReport]) -> f64 {
    let turnovers: Vec<f64> = reports.iter().filter_map(period_turnover).collect();
    if turnovers.is_empty() {
        return 0.0;
    }
    turnovers.iter().sum::<f64>() / turnovers.len() as f64 * 100.0
}
