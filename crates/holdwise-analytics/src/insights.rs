//! Cross-investor insights: exits, discoveries, momentum, flows, exposure.
//!
//! Insights comparing two filings read the [`DeltaReport`] of that pair, so
//! they classify changes exactly as the portfolio views and rankings do.
//! Results are grouped by resolved security key.

use holdwise_core::reference::ReferenceData;
use holdwise_core::types::{Investor, Period, PeriodSelection, SecurityRef, Snapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::allocation::AllocationBucket;
use crate::config::EngineConfig;
use crate::delta::{diff_snapshots, DeltaReport, PositionDelta};
use crate::merger::{merge_snapshot, weight_fraction};
use crate::parallel::maybe_parallel_map;
use crate::resolver::SecurityResolver;

// =============================================================================
// HELPERS
// =============================================================================

#[derive(Debug, Clone)]
struct KeyedHolding {
    security: SecurityRef,
    shares: Decimal,
    value: Decimal,
}

/// Snapshot positions grouped by security key.
fn holdings_by_key(
    snapshot: &Snapshot,
    resolver: &dyn SecurityResolver,
) -> BTreeMap<String, KeyedHolding> {
    let mut grouped: BTreeMap<String, KeyedHolding> = BTreeMap::new();
    for position in &merge_snapshot(snapshot).positions {
        let security = resolver.resolve_merged(position);
        let entry = grouped
            .entry(security.key().to_string())
            .or_insert_with(|| KeyedHolding {
                security,
                shares: Decimal::ZERO,
                value: Decimal::ZERO,
            });
        entry.shares += position.shares;
        entry.value += position.value;
    }
    grouped
}

/// The investor's last two snapshots whose periods are selected.
fn last_two_selected<'a>(
    investor: &'a Investor,
    selection: &PeriodSelection,
) -> Option<(&'a Snapshot, &'a Snapshot)> {
    let mut selected = investor
        .snapshots
        .iter()
        .filter(|s| selection.contains(&s.period))
        .rev();
    let newer = selected.next()?;
    let older = selected.next()?;
    Some((older, newer))
}

/// Delta report between the investor's last two selected snapshots.
fn last_two_report(
    investor: &Investor,
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> Option<DeltaReport> {
    let (older, newer) = last_two_selected(investor, selection)?;
    Some(diff_snapshots(newer, older, resolver, &config.significance))
}

fn sort_records<T, F>(records: &mut [T], key: F)
where
    F: Fn(&T) -> (usize, Decimal, String),
{
    records.sort_by(|a, b| {
        let (ca, va, ka) = key(a);
        let (cb, vb, kb) = key(b);
        cb.cmp(&ca).then_with(|| vb.cmp(&va)).then_with(|| ka.cmp(&kb))
    });
}

// =============================================================================
// EXIT TRACKER
// =============================================================================

/// A security several investors sold out of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRecord {
    /// Resolved security.
    pub security: SecurityRef,
    /// Names of investors who exited.
    pub exited_by: Vec<String>,
    /// Mean number of consecutive snapshots the security was held before exit.
    pub avg_holding_period: f64,
    /// Sum of the exited positions' previous values.
    pub total_value_exited: Decimal,
}

/// Positions [`diff_snapshots`] classifies as closed between an investor's
/// previous and latest snapshots.
///
/// Only investors whose latest snapshot is in a selected period count, and
/// only closed positions whose previous value exceeds
/// `insights.min_exit_value`. Closed positions are grouped by security key;
/// an investor counts once per key. Sorted by number of exiting investors,
/// then value exited.
pub fn exit_tracker(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> Vec<ExitRecord> {
    let min_value = config.insights.min_exit_value;

    let per_investor = maybe_parallel_map(investors, config, |investor| {
        let count = investor.snapshots.len();
        let (Some(latest), Some(previous)) = (investor.latest(), investor.previous()) else {
            return Vec::new();
        };
        if !selection.contains(&latest.period) {
            return Vec::new();
        }

        let report = diff_snapshots(latest, previous, resolver, &config.significance);
        let history: Vec<HashSet<String>> = investor.snapshots[..count - 2]
            .iter()
            .map(|s| {
                merge_snapshot(s)
                    .positions
                    .into_iter()
                    .filter(|p| p.shares > Decimal::ZERO)
                    .map(|p| p.identifier)
                    .collect()
            })
            .collect();

        let mut closed: BTreeMap<String, (SecurityRef, Decimal, usize)> = BTreeMap::new();
        for delta in report.closed() {
            if delta.previous_value <= min_value {
                continue;
            }
            let earlier = history
                .iter()
                .rev()
                .take_while(|held| held.contains(&delta.identifier))
                .count();
            let entry = closed
                .entry(delta.security.key().to_string())
                .or_insert_with(|| (delta.security.clone(), Decimal::ZERO, 0));
            entry.1 += delta.previous_value;
            entry.2 = entry.2.max(earlier + 1);
        }

        closed
            .into_iter()
            .map(|(key, (security, value, held_for))| {
                (key, security, value, investor.name.clone(), held_for)
            })
            .collect::<Vec<_>>()
    });

    let mut exits: BTreeMap<String, (SecurityRef, Vec<String>, Vec<usize>, Decimal)> =
        BTreeMap::new();
    for (key, security, value, name, held_for) in per_investor.into_iter().flatten() {
        let entry = exits
            .entry(key)
            .or_insert_with(|| (security, Vec::new(), Vec::new(), Decimal::ZERO));
        entry.1.push(name);
        entry.2.push(held_for);
        entry.3 += value;
    }

    let mut records: Vec<ExitRecord> = exits
        .into_values()
        .map(|(security, exited_by, periods, total_value_exited)| ExitRecord {
            avg_holding_period: periods.iter().sum::<usize>() as f64 / periods.len() as f64,
            security,
            exited_by,
            total_value_exited,
        })
        .collect();
    sort_records(&mut records, |r| {
        (
            r.exited_by.len(),
            r.total_value_exited,
            r.security.key().to_string(),
        )
    });
    records
}

// =============================================================================
// NEW DISCOVERIES
// =============================================================================

/// A security newly bought by several investors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// Resolved security.
    pub security: SecurityRef,
    /// Names of investors holding it for the first time.
    pub discovered_by: Vec<String>,
    /// Combined value of the new positions.
    pub total_value: Decimal,
    /// Mean value per discovering investor.
    pub avg_position: Decimal,
}

/// Securities in an investor's latest selected snapshot never held before.
///
/// Positions must exceed `insights.min_discovery_value`, and at least
/// `insights.min_discovery_investors` investors must share the discovery.
pub fn new_discoveries(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> Vec<DiscoveryRecord> {
    let thresholds = &config.insights;

    let per_investor = maybe_parallel_map(investors, config, |investor| {
        let Some(index) = investor.latest_index_in(selection) else {
            return Vec::new();
        };
        let seen_before: BTreeSet<String> = investor.snapshots[..index]
            .iter()
            .flat_map(|s| holdings_by_key(s, resolver).into_keys())
            .collect();

        holdings_by_key(&investor.snapshots[index], resolver)
            .into_iter()
            .filter(|(key, held)| {
                held.value > thresholds.min_discovery_value && !seen_before.contains(key)
            })
            .map(|(key, held)| (key, held, investor.name.clone()))
            .collect::<Vec<_>>()
    });

    let mut found: BTreeMap<String, (SecurityRef, Vec<String>, Decimal)> = BTreeMap::new();
    for (key, held, name) in per_investor.into_iter().flatten() {
        let entry = found
            .entry(key)
            .or_insert_with(|| (held.security, Vec::new(), Decimal::ZERO));
        entry.1.push(name);
        entry.2 += held.value;
    }

    let mut records: Vec<DiscoveryRecord> = found
        .into_values()
        .filter(|(_, by, _)| by.len() >= thresholds.min_discovery_investors)
        .map(|(security, discovered_by, total_value)| DiscoveryRecord {
            avg_position: total_value / Decimal::from(discovered_by.len()),
            security,
            discovered_by,
            total_value,
        })
        .collect();
    sort_records(&mut records, |r| {
        (
            r.discovered_by.len(),
            r.total_value,
            r.security.key().to_string(),
        )
    });
    records
}

// =============================================================================
// MOMENTUM SHIFTS
// =============================================================================

/// A security several investors sharply added to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumRecord {
    /// Resolved security.
    pub security: SecurityRef,
    /// Names of investors whose share count jumped.
    pub investors: Vec<String>,
    /// Combined shares before.
    pub from_shares: Decimal,
    /// Combined shares after.
    pub to_shares: Decimal,
    /// `to_shares - from_shares`.
    pub total_shift: Decimal,
}

/// Deltas whose share count grew by more than `insights.momentum_factor`
/// between an investor's last two selected snapshots. New positions qualify.
///
/// Reported when at least `insights.min_momentum_investors` investors did so.
pub fn momentum_shifts(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> Vec<MomentumRecord> {
    let thresholds = &config.insights;
    let factor = Decimal::try_from(thresholds.momentum_factor).unwrap_or(Decimal::ONE);

    let per_investor = maybe_parallel_map(investors, config, |investor| {
        let Some(report) = last_two_report(investor, selection, resolver, config) else {
            return Vec::new();
        };
        let mut grouped: BTreeMap<String, (SecurityRef, Decimal, Decimal)> = BTreeMap::new();
        for delta in report
            .deltas
            .iter()
            .filter(|d| d.current_shares > d.previous_shares * factor)
        {
            let entry = grouped
                .entry(delta.security.key().to_string())
                .or_insert_with(|| (delta.security.clone(), Decimal::ZERO, Decimal::ZERO));
            entry.1 += delta.previous_shares;
            entry.2 += delta.current_shares;
        }
        grouped
            .into_iter()
            .map(|(key, (security, from, to))| (key, security, from, to, investor.name.clone()))
            .collect::<Vec<_>>()
    });

    let mut shifts: BTreeMap<String, (SecurityRef, Vec<String>, Decimal, Decimal)> =
        BTreeMap::new();
    for (key, security, from, to, name) in per_investor.into_iter().flatten() {
        let entry = shifts
            .entry(key)
            .or_insert_with(|| (security, Vec::new(), Decimal::ZERO, Decimal::ZERO));
        entry.1.push(name);
        entry.2 += from;
        entry.3 += to;
    }

    let mut records: Vec<MomentumRecord> = shifts
        .into_values()
        .filter(|(_, names, _, _)| names.len() >= thresholds.min_momentum_investors)
        .map(|(security, investors, from_shares, to_shares)| MomentumRecord {
            security,
            investors,
            from_shares,
            to_shares,
            total_shift: to_shares - from_shares,
        })
        .collect();
    sort_records(&mut records, |r| {
        (r.investors.len(), r.total_shift, r.security.key().to_string())
    });
    records
}

// =============================================================================
// SECTOR NET FLOWS
// =============================================================================

/// Net value moved into (or out of) a sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorFlow {
    /// Sector name.
    pub sector: String,
    /// Newer minus older sector value, summed over investors.
    pub net_flow: Decimal,
}

/// Sector value change between each investor's last two selected snapshots.
///
/// Sorted by net flow, largest inflow first.
pub fn sector_net_flows(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    reference: &ReferenceData,
    config: &EngineConfig,
) -> Vec<SectorFlow> {
    let per_investor = maybe_parallel_map(investors, config, |investor| {
        let mut flows: BTreeMap<String, Decimal> = BTreeMap::new();
        if let Some(report) = last_two_report(investor, selection, resolver, config) {
            for delta in &report.deltas {
                let sector = reference.sector_for(delta.security.ticker.as_deref());
                *flows.entry(sector.to_string()).or_insert(Decimal::ZERO) += delta.value_delta();
            }
        }
        flows
    });

    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (sector, flow) in per_investor.into_iter().flatten() {
        *totals.entry(sector).or_insert(Decimal::ZERO) += flow;
    }

    let mut flows: Vec<SectorFlow> = totals
        .into_iter()
        .map(|(sector, net_flow)| SectorFlow { sector, net_flow })
        .collect();
    flows.sort_by(|a, b| {
        b.net_flow
            .cmp(&a.net_flow)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    flows
}

// =============================================================================
// BUY / SELL BALANCE
// =============================================================================

/// Direction of net money flow in a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    /// Net buying above 10% of buys.
    Bullish,
    /// Net selling beyond 10% of sells.
    Bearish,
    /// Neither.
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Money flow across investors for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuySellBalance {
    /// Period.
    pub period: Period,
    /// Sum of value increases.
    pub total_buys: Decimal,
    /// Sum of value decreases (positive).
    pub total_sells: Decimal,
    /// `total_buys - total_sells`.
    pub net_flow: Decimal,
    /// Number of increases counted.
    pub buys_count: usize,
    /// Number of decreases counted.
    pub sells_count: usize,
    /// Sentiment label.
    pub sentiment: Sentiment,
}

impl Sentiment {
    /// Bullish if net flow exceeds 10% of buys, bearish if it is below
    /// -10% of sells.
    #[must_use]
    pub fn from_flows(total_buys: Decimal, total_sells: Decimal) -> Self {
        let net = total_buys - total_sells;
        let tenth = Decimal::new(1, 1);
        if net > total_buys * tenth {
            Self::Bullish
        } else if net < -(total_sells * tenth) {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

/// Value bought and sold per selected period, newest period first.
///
/// For each period, every investor with snapshots for both the period and the
/// quarter before contributes the value changes of its deltas whose magnitude
/// exceeds `insights.min_flow_value`. With [`PeriodSelection::All`] every
/// period present in the data is reported.
pub fn buy_sell_balance(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> Vec<BuySellBalance> {
    let min_flow = config.insights.min_flow_value;
    let mut periods: Vec<Period> = selection.periods().unwrap_or_else(|| {
        investors
            .iter()
            .flat_map(|i| i.snapshots.iter().map(|s| s.period))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    });
    periods.sort_by(|a, b| b.cmp(a));

    periods
        .into_iter()
        .map(|period| {
            let per_investor = maybe_parallel_map(investors, config, |investor| {
                let mut flows = (Decimal::ZERO, Decimal::ZERO, 0usize, 0usize);
                let (Some(current), Some(previous)) = (
                    investor.snapshot_for(&period),
                    investor.snapshot_for(&period.previous()),
                ) else {
                    return flows;
                };
                let report = diff_snapshots(current, previous, resolver, &config.significance);
                for change in report.deltas.iter().map(PositionDelta::value_delta) {
                    if change.abs() > min_flow {
                        if change > Decimal::ZERO {
                            flows.0 += change;
                            flows.2 += 1;
                        } else {
                            flows.1 += change.abs();
                            flows.3 += 1;
                        }
                    }
                }
                flows
            });

            let (total_buys, total_sells, buys_count, sells_count) = per_investor.into_iter().fold(
                (Decimal::ZERO, Decimal::ZERO, 0, 0),
                |acc, f| (acc.0 + f.0, acc.1 + f.1, acc.2 + f.2, acc.3 + f.3),
            );

            BuySellBalance {
                period,
                total_buys,
                total_sells,
                net_flow: total_buys - total_sells,
                buys_count,
                sells_count,
                sentiment: Sentiment::from_flows(total_buys, total_sells),
            }
        })
        .collect()
}

// =============================================================================
// CROSS-INVESTOR EXPOSURE
// =============================================================================

/// Sector and geography totals across every investor's latest snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureView {
    /// Sector buckets, largest first.
    pub sectors: Vec<AllocationBucket>,
    /// US / International buckets, largest first.
    pub geography: Vec<AllocationBucket>,
    /// Combined value of all latest snapshots.
    pub total_value: Decimal,
}

/// Aggregates sector and geography exposure over latest snapshots.
pub fn cross_investor_exposure(
    investors: &[Investor],
    resolver: &dyn SecurityResolver,
    reference: &ReferenceData,
    config: &EngineConfig,
) -> ExposureView {
    let per_investor = maybe_parallel_map(investors, config, |investor| {
        investor
            .latest()
            .map(|latest| {
                holdings_by_key(latest, resolver)
                    .into_values()
                    .map(|held| {
                        let ticker = held.security.ticker.as_deref();
                        (
                            reference.sector_for(ticker).to_string(),
                            reference.geography_of(ticker).to_string(),
                            held.value,
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    });

    let mut sectors: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();
    let mut geography: BTreeMap<String, (usize, Decimal)> = BTreeMap::new();
    let mut total_value = Decimal::ZERO;
    for (sector, region, value) in per_investor.into_iter().flatten() {
        let s = sectors.entry(sector).or_insert((0, Decimal::ZERO));
        s.0 += 1;
        s.1 += value;
        let g = geography.entry(region).or_insert((0, Decimal::ZERO));
        g.0 += 1;
        g.1 += value;
        total_value += value;
    }

    let buckets = |map: BTreeMap<String, (usize, Decimal)>| {
        let mut result: Vec<AllocationBucket> = map
            .into_iter()
            .map(|(label, (count, value))| AllocationBucket {
                label,
                count,
                value,
                weight_pct: weight_fraction(value, total_value) * 100.0,
            })
            .collect();
        result.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        result
    };

    ExposureView {
        sectors: buckets(sectors),
        geography: buckets(geography),
        total_value,
    }
}
