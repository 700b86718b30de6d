//! Portfolio scoreboard: investors ranked by period-over-period value change.

use holdwise_core::types::{Investor, Period};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::EngineConfig;
use crate::merger::merge_snapshot;
use crate::parallel::maybe_parallel_filter_map;

/// One investor's total-value change between its last two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    /// Investor slug.
    pub investor: String,
    /// Investor display name.
    pub name: String,
    /// Period of the latest snapshot.
    pub period: Period,
    /// Merged total of the previous snapshot (zero if none).
    pub previous_total: Decimal,
    /// Merged total of the latest snapshot.
    pub current_total: Decimal,
    /// Change as a fraction (0.1 = +10%); zero without a usable previous total.
    pub change_pct: f64,
}

/// Scoreboard entries, best performer first.
pub type ScoreboardView = Vec<ScoreboardEntry>;

/// Relative change, or zero when `previous` is not positive.
#[must_use]
pub fn value_change_pct(previous: Decimal, current: Decimal) -> f64 {
    if previous <= Decimal::ZERO {
        return 0.0;
    }
    ((current - previous) / previous).to_f64().unwrap_or(0.0)
}

fn scoreboard_entry(investor: &Investor) -> Option<ScoreboardEntry> {
    let latest = merge_snapshot(investor.latest()?);
    let previous_total = investor
        .previous()
        .map_or(Decimal::ZERO, |s| merge_snapshot(s).total_value);

    Some(ScoreboardEntry {
        investor: investor.slug.clone(),
        name: investor.name.clone(),
        period: latest.period,
        previous_total,
        current_total: latest.total_value,
        change_pct: value_change_pct(previous_total, latest.total_value),
    })
}

/// Ranks investors by value change, descending, ties by slug.
///
/// Investors without any snapshot are left out.
pub fn calculate_scoreboard(investors: &[Investor], config: &EngineConfig) -> ScoreboardView {
    let mut entries = maybe_parallel_filter_map(investors, config, scoreboard_entry);
    entries.sort_by(|a, b| {
        b.change_pct
            .partial_cmp(&a.change_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.investor.cmp(&b.investor))
    });
    entries
}
