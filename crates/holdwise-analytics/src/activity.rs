//! Trading activity over an investor's most recent filings.

use chrono::NaiveDate;
use holdwise_core::types::Investor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::delta::compute_deltas;
use crate::merger::merge_snapshot;
use crate::parallel::maybe_parallel_map;
use crate::resolver::SecurityResolver;

/// Significant changes over the last few snapshot comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityView {
    /// Investor slug.
    pub investor: String,
    /// Investor display name.
    pub name: String,
    /// Significant deltas counted.
    pub changes: usize,
    /// Significant deltas with more shares.
    pub increases: usize,
    /// Significant deltas with fewer shares.
    pub decreases: usize,
    /// Comparisons actually made (fewer than configured for short histories).
    pub comparisons: usize,
    /// Filing date of the most recent compared snapshot.
    pub last_comparison: Option<NaiveDate>,
}

/// Counts significant deltas across the last `activity_comparisons` pairs of
/// adjacent snapshots.
///
/// With the default of two comparisons the last three snapshots are used. An
/// investor with fewer than two snapshots has no comparisons.
pub fn calculate_activity(
    investor: &Investor,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> ActivityView {
    let mut view = ActivityView {
        investor: investor.slug.clone(),
        name: investor.name.clone(),
        changes: 0,
        increases: 0,
        decreases: 0,
        comparisons: 0,
        last_comparison: None,
    };

    let count = investor.snapshots.len();
    let first = count.saturating_sub(config.activity_comparisons).max(1);
    let mut previous = investor.snapshot_before(first).map(merge_snapshot);

    for snapshot in investor.snapshots.iter().skip(first) {
        let current = merge_snapshot(snapshot);
        let report = compute_deltas(&current, previous.as_ref(), resolver, &config.significance);
        for delta in report.significant() {
            view.changes += 1;
            if delta.share_delta > Decimal::ZERO {
                view.increases += 1;
            } else if delta.share_delta < Decimal::ZERO {
                view.decreases += 1;
            }
        }
        view.comparisons += 1;
        view.last_comparison = Some(snapshot.filing_date);
        previous = Some(current);
    }

    view
}

/// Investors with at least one significant change, most active first.
///
/// Ties are ordered by slug.
pub fn activity_ranking(
    investors: &[Investor],
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> Vec<ActivityView> {
    let mut views: Vec<ActivityView> =
        maybe_parallel_map(investors, config, |investor| {
            calculate_activity(investor, resolver, config)
        })
        .into_iter()
        .filter(|v| v.changes > 0)
        .collect();
    views.sort_by(|a, b| {
        b.changes
            .cmp(&a.changes)
            .then_with(|| a.investor.cmp(&b.investor))
    });
    views
}
