//! Period-over-period position deltas.
//!
//! One engine serves every consumer: portfolio views, activity counts, buy
//! aggregation, turnover and the pairwise insights all classify changes
//! through [`compute_deltas`].

use holdwise_core::types::{Period, SecurityRef, Snapshot};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::SignificanceThresholds;
use crate::merger::{merge_snapshot, MergedSnapshot};
use crate::resolver::SecurityResolver;

/// How a security's holding changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaClass {
    /// Not held before, held now.
    New,
    /// Held before, more shares now.
    Increased,
    /// Fewer shares now.
    Decreased,
    /// Same share count.
    Unchanged,
    /// Held before, no shares now.
    Closed,
}

impl DeltaClass {
    /// Classifies a share change.
    #[must_use]
    pub fn classify(previous: Decimal, current: Decimal) -> Self {
        if previous.is_zero() && current > Decimal::ZERO {
            Self::New
        } else if previous > Decimal::ZERO && current.is_zero() {
            Self::Closed
        } else if current > previous {
            Self::Increased
        } else if current < previous {
            Self::Decreased
        } else {
            Self::Unchanged
        }
    }

    /// Returns true for new and increased positions.
    #[must_use]
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::New | Self::Increased)
    }
}

impl fmt::Display for DeltaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Increased => "increased",
            Self::Decreased => "decreased",
            Self::Unchanged => "unchanged",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// Change in one security between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDelta {
    /// Resolved security.
    pub security: SecurityRef,
    /// Raw identifier the snapshots were matched on.
    pub identifier: String,
    /// Shares in the previous snapshot (zero if absent).
    pub previous_shares: Decimal,
    /// Shares in the current snapshot (zero if absent).
    pub current_shares: Decimal,
    /// `current_shares - previous_shares`.
    pub share_delta: Decimal,
    /// Percentage share change; 100 for new, -100 for closed.
    pub percent_change: Option<f64>,
    /// Classification.
    pub class: DeltaClass,
    /// Value in the previous snapshot.
    pub previous_value: Decimal,
    /// Value in the current snapshot.
    pub current_value: Decimal,
    /// Weight change in percentage points, when both totals are positive.
    pub weight_change_pct: Option<f64>,
    /// Whether the change passes the significance thresholds.
    pub significant: bool,
}

impl PositionDelta {
    /// `current_value - previous_value`.
    #[must_use]
    pub fn value_delta(&self) -> Decimal {
        self.current_value - self.previous_value
    }
}

fn percent_change(class: DeltaClass, previous: Decimal, delta: Decimal) -> Option<f64> {
    match class {
        DeltaClass::New => Some(100.0),
        DeltaClass::Closed => Some(-100.0),
        _ if previous > Decimal::ZERO => (delta / previous * Decimal::ONE_HUNDRED).to_f64(),
        _ => None,
    }
}

/// Counts and value totals for a delta report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaSummary {
    /// New positions.
    pub new_count: usize,
    /// Increased positions.
    pub increased_count: usize,
    /// Decreased positions.
    pub decreased_count: usize,
    /// Unchanged positions.
    pub unchanged_count: usize,
    /// Closed positions.
    pub closed_count: usize,
    /// Significant changes.
    pub significant_count: usize,
    /// Previous snapshot total (zero on a first filing).
    pub previous_total: Decimal,
    /// Current snapshot total.
    pub current_total: Decimal,
    /// `current_total - previous_total`.
    pub total_value_change: Decimal,
}

/// All deltas between a snapshot and its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    /// Period of the current snapshot.
    pub period: Period,
    /// Period of the previous snapshot, if there was one.
    pub previous_period: Option<Period>,
    /// Previous snapshot total.
    pub previous_total: Decimal,
    /// Current snapshot total.
    pub current_total: Decimal,
    /// Current snapshot order first, then closed positions in previous order.
    pub deltas: Vec<PositionDelta>,
}

impl DeltaReport {
    fn of_class(&self, class: DeltaClass) -> Vec<&PositionDelta> {
        self.deltas.iter().filter(|d| d.class == class).collect()
    }

    /// New positions.
    #[must_use]
    pub fn new_positions(&self) -> Vec<&PositionDelta> {
        self.of_class(DeltaClass::New)
    }

    /// Increased positions.
    #[must_use]
    pub fn increased(&self) -> Vec<&PositionDelta> {
        self.of_class(DeltaClass::Increased)
    }

    /// Decreased positions.
    #[must_use]
    pub fn decreased(&self) -> Vec<&PositionDelta> {
        self.of_class(DeltaClass::Decreased)
    }

    /// Closed positions.
    #[must_use]
    pub fn closed(&self) -> Vec<&PositionDelta> {
        self.of_class(DeltaClass::Closed)
    }

    /// Significant deltas.
    #[must_use]
    pub fn significant(&self) -> Vec<&PositionDelta> {
        self.deltas.iter().filter(|d| d.significant).collect()
    }

    /// Delta for a raw identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&PositionDelta> {
        self.deltas.iter().find(|d| d.identifier == identifier)
    }

    /// Counts by class and value totals.
    #[must_use]
    pub fn summary(&self) -> DeltaSummary {
        let mut summary = DeltaSummary {
            previous_total: self.previous_total,
            current_total: self.current_total,
            total_value_change: self.current_total - self.previous_total,
            ..DeltaSummary::default()
        };
        for delta in &self.deltas {
            match delta.class {
                DeltaClass::New => summary.new_count += 1,
                DeltaClass::Increased => summary.increased_count += 1,
                DeltaClass::Decreased => summary.decreased_count += 1,
                DeltaClass::Unchanged => summary.unchanged_count += 1,
                DeltaClass::Closed => summary.closed_count += 1,
            }
            if delta.significant {
                summary.significant_count += 1;
            }
        }
        summary
    }
}

/// Compares a snapshot with its predecessor.
///
/// `previous` is `None` for an investor's first filing, in which case every
/// held position is new and weight changes are null. Every identifier in
/// either snapshot yields exactly one delta.
pub fn compute_deltas(
    current: &MergedSnapshot,
    previous: Option<&MergedSnapshot>,
    resolver: &dyn SecurityResolver,
    thresholds: &SignificanceThresholds,
) -> DeltaReport {
    let previous_total = previous.map_or(Decimal::ZERO, |p| p.total_value);
    let weights_comparable = previous.is_some()
        && previous_total > Decimal::ZERO
        && current.total_value > Decimal::ZERO;

    let previous_by_id: HashMap<&str, (Decimal, Decimal)> = previous
        .map(|p| {
            p.positions
                .iter()
                .map(|pos| (pos.identifier.as_str(), (pos.shares, pos.value)))
                .collect()
        })
        .unwrap_or_default();

    let build = |security: SecurityRef,
                 identifier: &str,
                 (prev_shares, prev_value): (Decimal, Decimal),
                 (cur_shares, cur_value): (Decimal, Decimal)| {
        let share_delta = cur_shares - prev_shares;
        let class = DeltaClass::classify(prev_shares, cur_shares);
        let weight_change_pct = weights_comparable.then(|| {
            (current.weight_of(cur_value)
                - crate::merger::weight_fraction(prev_value, previous_total))
                * 100.0
        });
        PositionDelta {
            security,
            identifier: identifier.to_string(),
            previous_shares: prev_shares,
            current_shares: cur_shares,
            share_delta,
            percent_change: percent_change(class, prev_shares, share_delta),
            class,
            previous_value: prev_value,
            current_value: cur_value,
            weight_change_pct,
            significant: thresholds.is_significant(share_delta, weight_change_pct),
        }
    };

    let mut deltas = Vec::with_capacity(current.positions.len() + previous_by_id.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(current.positions.len());

    for position in &current.positions {
        seen.insert(position.identifier.as_str());
        let prev = previous_by_id
            .get(position.identifier.as_str())
            .copied()
            .unwrap_or((Decimal::ZERO, Decimal::ZERO));
        deltas.push(build(
            resolver.resolve_merged(position),
            &position.identifier,
            prev,
            (position.shares, position.value),
        ));
    }

    if let Some(previous) = previous {
        for position in &previous.positions {
            if seen.contains(position.identifier.as_str()) {
                continue;
            }
            deltas.push(build(
                resolver.resolve_merged(position),
                &position.identifier,
                (position.shares, position.value),
                (Decimal::ZERO, Decimal::ZERO),
            ));
        }
    }

    DeltaReport {
        period: current.period,
        previous_period: previous.map(|p| p.period),
        previous_total,
        current_total: current.total_value,
        deltas,
    }
}

/// Merges two raw filings and compares them.
#[must_use]
pub fn diff_snapshots(
    current: &Snapshot,
    previous: &Snapshot,
    resolver: &dyn SecurityResolver,
    thresholds: &SignificanceThresholds,
) -> DeltaReport {
    compute_deltas(
        &merge_snapshot(current),
        Some(&merge_snapshot(previous)),
        resolver,
        thresholds,
    )
}

/// Reports for each adjacent pair of snapshots, oldest pair first.
#[must_use]
pub fn history_deltas(
    snapshots: &[MergedSnapshot],
    resolver: &dyn SecurityResolver,
    thresholds: &SignificanceThresholds,
) -> Vec<DeltaReport> {
    snapshots
        .windows(2)
        .map(|pair| compute_deltas(&pair[1], Some(&pair[0]), resolver, thresholds))
        .collect()
}
