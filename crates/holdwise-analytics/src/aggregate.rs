//! Cross-investor aggregation: most bought, most owned, largest positions.
//!
//! Each ranking is an explicit fold of per-investor partial maps followed by
//! an associative, commutative merge, so the result is the same whether the
//! investors are processed sequentially or in parallel.

use chrono::NaiveDate;
use holdwise_core::types::{Investor, Period, PeriodSelection, SecurityRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::EngineConfig;
use crate::delta::compute_deltas;
use crate::merger::merge_snapshot;
use crate::parallel::maybe_parallel_fold;
use crate::resolver::SecurityResolver;

// =============================================================================
// RESULT TYPES
// =============================================================================

/// A security with an investor count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityCount {
    /// Resolved security.
    pub security: SecurityRef,
    /// Number of distinct investors.
    pub count: usize,
}

/// A security with an aggregate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityValue {
    /// Resolved security.
    pub security: SecurityRef,
    /// Summed value across investors.
    pub value: Decimal,
    /// Number of investors contributing to the value.
    pub holders: usize,
}

/// A ranked list plus the number of distinct securities seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking<T> {
    /// Ranked entries, best first.
    pub entries: Vec<T>,
    /// Distinct securities seen while aggregating.
    pub unique_securities: usize,
}

impl<T> Ranking<T> {
    /// Keeps only the first `n` entries.
    #[must_use]
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Securities ranked by number of investors buying them.
pub type AggregatedBuys = Ranking<SecurityCount>;
/// Securities ranked by number of investors holding them.
pub type TopOwned = Ranking<SecurityCount>;
/// Securities ranked by aggregate value held.
pub type BiggestInvestments = Ranking<SecurityValue>;

// =============================================================================
// FOLD / REDUCE
// =============================================================================

/// Partial aggregate: security key → (security, value).
type Partial<V> = HashMap<String, (SecurityRef, V)>;

/// Deterministic choice between two refs for the same key.
fn pick_ref(a: SecurityRef, b: SecurityRef) -> SecurityRef {
    if (&b.identifier, &b.name) < (&a.identifier, &a.name) {
        b
    } else {
        a
    }
}

fn merge_partials<V, C>(mut a: Partial<V>, b: Partial<V>, combine: &C) -> Partial<V>
where
    C: Fn(V, V) -> V,
{
    for (key, (security, value)) in b {
        let merged = match a.remove(&key) {
            Some((existing, acc)) => (pick_ref(existing, security), combine(acc, value)),
            None => (security, value),
        };
        a.insert(key, merged);
    }
    a
}

fn fold_investors<V, P, C>(
    investors: &[Investor],
    config: &EngineConfig,
    per_investor: P,
    combine: C,
) -> Partial<V>
where
    V: Send + Sync + Clone,
    P: Fn(&Investor) -> Partial<V> + Sync + Send,
    C: Fn(V, V) -> V + Sync + Send,
{
    maybe_parallel_fold(
        investors,
        config,
        HashMap::new(),
        |acc, investor| merge_partials(acc, per_investor(investor), &combine),
        |a, b| merge_partials(a, b, &combine),
    )
}

// =============================================================================
// RANKINGS
// =============================================================================

fn rank_counts(partial: Partial<usize>) -> Ranking<SecurityCount> {
    let unique_securities = partial.len();
    let mut entries: Vec<SecurityCount> = partial
        .into_values()
        .map(|(security, count)| SecurityCount { security, count })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.security.key().cmp(b.security.key()))
    });
    Ranking {
        entries,
        unique_securities,
    }
}

/// Securities bought (new or increased) in the selected periods.
///
/// Each selected snapshot is compared with the investor's immediately
/// preceding snapshot; a first filing counts every position as new. An
/// investor counts once per security however many selected periods it bought.
pub fn aggregate_buys(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> AggregatedBuys {
    let partial = fold_investors(
        investors,
        config,
        |investor| {
            let mut bought: Partial<usize> = HashMap::new();
            for (i, snapshot) in investor.snapshots.iter().enumerate() {
                if !selection.contains(&snapshot.period) {
                    continue;
                }
                let current = merge_snapshot(snapshot);
                let previous = investor.snapshot_before(i).map(merge_snapshot);
                let report =
                    compute_deltas(&current, previous.as_ref(), resolver, &config.significance);
                for delta in report.deltas.into_iter().filter(|d| d.class.is_buy()) {
                    bought
                        .entry(delta.security.key().to_string())
                        .or_insert((delta.security, 1));
                }
            }
            bought
        },
        |a, b| a + b,
    );
    rank_counts(partial)
}

/// Securities held in each investor's latest selected snapshot, by holder count.
pub fn aggregate_owned(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> TopOwned {
    let partial = fold_investors(
        investors,
        config,
        |investor| {
            let mut held: Partial<usize> = HashMap::new();
            if let Some(snapshot) = investor.latest_in(selection) {
                for position in merge_snapshot(snapshot)
                    .positions
                    .iter()
                    .filter(|p| p.shares > Decimal::ZERO)
                {
                    let security = resolver.resolve_merged(position);
                    held.entry(security.key().to_string())
                        .or_insert((security, 1));
                }
            }
            held
        },
        |a, b| a + b,
    );
    rank_counts(partial)
}

/// Securities by total value across each investor's latest selected snapshot.
pub fn aggregate_biggest(
    investors: &[Investor],
    selection: &PeriodSelection,
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> BiggestInvestments {
    let partial = fold_investors(
        investors,
        config,
        |investor| {
            let mut values: Partial<(Decimal, usize)> = HashMap::new();
            if let Some(snapshot) = investor.latest_in(selection) {
                for position in &merge_snapshot(snapshot).positions {
                    let security = resolver.resolve_merged(position);
                    let (_, (value, _)) = values
                        .entry(security.key().to_string())
                        .or_insert((security, (Decimal::ZERO, 1)));
                    *value += position.value;
                }
            }
            values
        },
        |(va, ha), (vb, hb)| (va + vb, ha + hb),
    );

    let unique_securities = partial.len();
    let mut entries: Vec<SecurityValue> = partial
        .into_values()
        .map(|(security, (value, holders))| SecurityValue {
            security,
            value,
            holders,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.security.key().cmp(b.security.key()))
    });
    Ranking {
        entries,
        unique_securities,
    }
}

// =============================================================================
// PERIOD COVERAGE
// =============================================================================

/// Most recent period filed by enough of the active investors.
///
/// At least `ceil(active × min_coverage)` investors with any snapshot must
/// have filed for the period. Falls back to the most recent period seen, and
/// returns `None` when there are no snapshots at all.
#[must_use]
pub fn latest_covered_period(investors: &[Investor], min_coverage: f64) -> Option<Period> {
    let mut filers: BTreeMap<Period, HashSet<&str>> = BTreeMap::new();
    let mut active = 0usize;
    for investor in investors {
        if investor.has_snapshots() {
            active += 1;
        }
        for snapshot in &investor.snapshots {
            filers
                .entry(snapshot.period)
                .or_default()
                .insert(investor.slug.as_str());
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let required = ((active as f64) * min_coverage).ceil().max(1.0) as usize;

    filers
        .iter()
        .rev()
        .find(|(_, slugs)| slugs.len() >= required)
        .or_else(|| filers.iter().next_back())
        .map(|(period, _)| *period)
}

/// How much of the dataset a period selection covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCoverage {
    /// Investors in the dataset, filers or not.
    pub total_investors: usize,
    /// Investors with at least one filing in a selected period.
    pub investors_with_data: usize,
    /// Filings across all periods.
    pub total_filings: usize,
    /// Filings in a selected period.
    pub filings_in_period: usize,
    /// Most recent filing date in the dataset.
    pub last_updated: Option<NaiveDate>,
}

/// Counts investors and filings behind a period selection.
#[must_use]
pub fn data_coverage(investors: &[Investor], selection: &PeriodSelection) -> DataCoverage {
    let mut coverage = DataCoverage {
        total_investors: investors.len(),
        investors_with_data: 0,
        total_filings: 0,
        filings_in_period: 0,
        last_updated: None,
    };

    for investor in investors {
        let in_period = investor
            .snapshots
            .iter()
            .filter(|s| selection.contains(&s.period))
            .count();
        if in_period > 0 {
            coverage.investors_with_data += 1;
        }
        coverage.filings_in_period += in_period;
        coverage.total_filings += investor.snapshots.len();
        coverage.last_updated = investor
            .snapshots
            .iter()
            .map(|s| s.filing_date)
            .chain(coverage.last_updated)
            .max();
    }
    coverage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MasterResolver;
    use holdwise_core::types::{Position, Snapshot};
    use rust_decimal_macros::dec;

    fn snap(period: &str, holdings: &[(&str, Decimal, Decimal)]) -> Snapshot {
        let period: Period = period.parse().unwrap();
        let filed = period.next();
        let date = NaiveDate::from_ymd_opt(filed.year(), u32::from(filed.quarter()) * 3 - 1, 14)
            .unwrap();
        Snapshot::new(period, date).with_positions(
            holdings
                .iter()
                .map(|(t, shares, value)| Position {
                    name: (*t).to_string(),
                    identifier: format!("{t}-ID"),
                    shares: *shares,
                    value: *value,
                    ticker: Some((*t).to_string()),
                })
                .collect(),
        )
    }

    fn fixture() -> Vec<Investor> {
        vec![
            Investor::new(
                "alpha",
                "Alpha",
                vec![
                    snap("Q3 2024", &[("AAPL", dec!(100), dec!(1000))]),
                    snap(
                        "Q4 2024",
                        &[("AAPL", dec!(150), dec!(1500)), ("KO", dec!(10), dec!(100))],
                    ),
                ],
            ),
            Investor::new(
                "beta",
                "Beta",
                vec![
                    snap("Q3 2024", &[("AAPL", dec!(100), dec!(1000))]),
                    snap("Q4 2024", &[("AAPL", dec!(50), dec!(500))]),
                ],
            ),
            Investor::new(
                "gamma",
                "Gamma",
                vec![snap("Q4 2024", &[("KO", dec!(5), dec!(2000))])],
            ),
            Investor::new("empty", "Empty", vec![]),
        ]
    }

    fn q4() -> PeriodSelection {
        PeriodSelection::single("Q4 2024".parse().unwrap())
    }

    #[test]
    fn test_buys_in_period() {
        let buys = aggregate_buys(
            &fixture(),
            &q4(),
            &MasterResolver::default(),
            &EngineConfig::sequential(),
        );
        // KO: new for alpha and gamma (first filing); AAPL: increased for alpha only
        assert_eq!(buys.entries[0].security.key(), "KO");
        assert_eq!(buys.entries[0].count, 2);
        assert_eq!(buys.entries[1].security.key(), "AAPL");
        assert_eq!(buys.entries[1].count, 1);
        assert_eq!(buys.unique_securities, 2);
    }

    #[test]
    fn test_buys_deduplicated_across_periods() {
        let buys = aggregate_buys(
            &fixture(),
            &PeriodSelection::All,
            &MasterResolver::default(),
            &EngineConfig::sequential(),
        );
        let aapl = buys
            .entries
            .iter()
            .find(|e| e.security.key() == "AAPL")
            .unwrap();
        // alpha new+increased counts once; beta new in Q3
        assert_eq!(aapl.count, 2);
    }

    #[test]
    fn test_owned_and_biggest() {
        let investors = fixture();
        let resolver = MasterResolver::default();
        let config = EngineConfig::sequential();

        let owned = aggregate_owned(&investors, &q4(), &resolver, &config);
        assert_eq!(owned.entries[0].security.key(), "AAPL");
        assert_eq!(owned.entries[0].count, 2);
        assert_eq!(owned.entries[1].security.key(), "KO");
        assert_eq!(owned.entries[1].count, 2);

        let biggest = aggregate_biggest(&investors, &q4(), &resolver, &config);
        assert_eq!(biggest.entries[0].security.key(), "KO");
        assert_eq!(biggest.entries[0].value, dec!(2100));
        assert_eq!(biggest.entries[0].holders, 2);
        assert_eq!(biggest.entries[1].value, dec!(2000));
        assert_eq!(biggest.top(1).entries.len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let investors = fixture();
        let resolver = MasterResolver::default();
        let sequential = aggregate_owned(&investors, &q4(), &resolver, &EngineConfig::sequential());
        let parallel = aggregate_owned(
            &investors,
            &q4(),
            &resolver,
            &EngineConfig::default().with_threshold(1),
        );
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_latest_covered_period() {
        let investors = fixture();
        // 3 active investors, all filed Q4 2024
        assert_eq!(
            latest_covered_period(&investors, 0.3),
            Some("Q4 2024".parse().unwrap())
        );

        let mut sparse = fixture();
        sparse.push(Investor::new(
            "late",
            "Late",
            vec![snap("Q1 2025", &[("X", dec!(1), dec!(1))])],
        ));
        // 4 active, 0.5 coverage needs 2 filers; Q1 2025 has only 1
        assert_eq!(
            latest_covered_period(&sparse, 0.5),
            Some("Q4 2024".parse().unwrap())
        );
        // a lone active investor covers its own latest period
        assert_eq!(
            latest_covered_period(&sparse[3..], 1.0),
            Some("Q1 2025".parse().unwrap())
        );
        assert_eq!(latest_covered_period(&[], 0.3), None);
    }

    #[test]
    fn test_data_coverage() {
        let coverage = data_coverage(&fixture(), &q4());
        assert_eq!(coverage.total_investors, 4);
        assert_eq!(coverage.investors_with_data, 3);
        assert_eq!(coverage.total_filings, 5);
        assert_eq!(coverage.filings_in_period, 3);
        assert_eq!(coverage.last_updated, NaiveDate::from_ymd_opt(2025, 2, 14));

        let q3 = data_coverage(
            &fixture(),
            &PeriodSelection::single("Q3 2024".parse().unwrap()),
        );
        assert_eq!(q3.investors_with_data, 2);
        assert_eq!(q3.filings_in_period, 2);

        let empty = data_coverage(&[], &PeriodSelection::all());
        assert_eq!(empty.total_investors, 0);
        assert_eq!(empty.last_updated, None);
    }
}
