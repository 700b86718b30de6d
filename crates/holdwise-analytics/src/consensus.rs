//! Cross-investor consensus and contrarian classification.
//!
//! Works on each investor's latest snapshot. Positions are grouped by resolved
//! security key within an investor, so two share classes that resolve to the
//! same ticker count once.

use holdwise_core::types::{Investor, SecurityRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::{ConsensusThresholds, EngineConfig};
use crate::merger::{merge_snapshot, weight_fraction};
use crate::parallel::maybe_parallel_map;
use crate::resolver::SecurityResolver;

/// One investor's holding of a security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorWeight {
    /// Investor slug.
    pub investor: String,
    /// Investor display name.
    pub name: String,
    /// Weight as a fraction of the investor's portfolio.
    pub weight: f64,
    /// Position value.
    pub value: Decimal,
}

/// A security held across investors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRecord {
    /// Resolved security.
    pub security: SecurityRef,
    /// Per-investor weights, heaviest first.
    pub weights: Vec<InvestorWeight>,
    /// Number of investors listed in `weights`.
    pub investor_count: usize,
    /// Highest single-investor weight.
    pub max_weight: f64,
    /// Sum of listed position values.
    pub total_value: Decimal,
}

/// Contrarian records share the consensus layout; `weights` lists every holder.
pub type ContrarianRecord = ConsensusRecord;

/// Consensus and contrarian lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusView {
    /// Securities held at meaningful weight by several investors.
    pub consensus: Vec<ConsensusRecord>,
    /// Securities held heavily by very few investors.
    pub contrarian: Vec<ContrarianRecord>,
}

struct Holding {
    security: SecurityRef,
    weight: InvestorWeight,
}

/// Latest-snapshot holdings of one investor, grouped by security key.
fn investor_holdings(investor: &Investor, resolver: &dyn SecurityResolver) -> Vec<Holding> {
    let Some(latest) = investor.latest() else {
        return Vec::new();
    };
    let merged = merge_snapshot(latest);

    let mut by_key: BTreeMap<String, (SecurityRef, Decimal, bool)> = BTreeMap::new();
    for position in &merged.positions {
        let security = resolver.resolve_merged(position);
        let held = position.shares > Decimal::ZERO || position.value > Decimal::ZERO;
        let entry = by_key
            .entry(security.key().to_string())
            .or_insert_with(|| (security, Decimal::ZERO, false));
        entry.1 += position.value;
        entry.2 |= held;
    }

    by_key
        .into_values()
        .filter(|(_, _, held)| *held)
        .map(|(security, value, _)| Holding {
            security,
            weight: InvestorWeight {
                investor: investor.slug.clone(),
                name: investor.name.clone(),
                weight: weight_fraction(value, merged.total_value),
                value,
            },
        })
        .collect()
}

fn record(security: SecurityRef, mut weights: Vec<InvestorWeight>) -> ConsensusRecord {
    weights.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.investor.cmp(&b.investor))
    });
    ConsensusRecord {
        investor_count: weights.len(),
        max_weight: weights.first().map_or(0.0, |w| w.weight),
        total_value: weights.iter().map(|w| w.value).sum(),
        security,
        weights,
    }
}

/// Orders by max weight desc, then total value desc, then security key asc.
fn rank(records: &mut [ConsensusRecord]) {
    records.sort_by(|a, b| {
        b.max_weight
            .partial_cmp(&a.max_weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_value.cmp(&a.total_value))
            .then_with(|| a.security.key().cmp(b.security.key()))
    });
}

/// Classifies securities across every investor's latest snapshot.
///
/// - Consensus: at least `min_investors` investors hold it at `min_weight` or
///   more. Only those investors are listed.
/// - Contrarian: at most `contrarian_max_investors` hold it at all, and one
///   of them at `contrarian_min_weight` or more. Every holder is listed.
///
/// A security can appear in both lists when thresholds overlap.
pub fn calculate_consensus(
    investors: &[Investor],
    resolver: &dyn SecurityResolver,
    config: &EngineConfig,
) -> ConsensusView {
    let thresholds: &ConsensusThresholds = &config.consensus;
    let per_investor = maybe_parallel_map(investors, config, |investor| {
        investor_holdings(investor, resolver)
    });

    let mut by_key: BTreeMap<String, (SecurityRef, Vec<InvestorWeight>)> = BTreeMap::new();
    for holding in per_investor.into_iter().flatten() {
        by_key
            .entry(holding.security.key().to_string())
            .or_insert_with(|| (holding.security, Vec::new()))
            .1
            .push(holding.weight);
    }

    let mut view = ConsensusView::default();
    for (security, holders) in by_key.into_values() {
        let max_weight = holders.iter().map(|h| h.weight).fold(0.0_f64, f64::max);
        if holders.len() <= thresholds.contrarian_max_investors
            && max_weight >= thresholds.contrarian_min_weight
        {
            view.contrarian.push(record(security.clone(), holders.clone()));
        }

        let contributors: Vec<InvestorWeight> = holders
            .into_iter()
            .filter(|h| h.weight >= thresholds.min_weight)
            .collect();
        if contributors.len() >= thresholds.min_investors {
            view.consensus.push(record(security, contributors));
        }
    }

    rank(&mut view.consensus);
    rank(&mut view.contrarian);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MasterResolver;
    use chrono::NaiveDate;
    use holdwise_core::types::{Position, Snapshot};
    use rust_decimal_macros::dec;

    fn investor(slug: &str, holdings: &[(&str, Decimal)]) -> Investor {
        let positions = holdings
            .iter()
            .map(|(ticker, value)| Position {
                name: (*ticker).to_string(),
                identifier: format!("{ticker}-ID"),
                shares: dec!(10),
                value: *value,
                ticker: Some((*ticker).to_string()),
            })
            .collect();
        Investor::new(
            slug,
            slug.to_uppercase(),
            vec![Snapshot::new(
                "Q4 2024".parse().unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            )
            .with_positions(positions)],
        )
    }

    fn run(investors: &[Investor]) -> ConsensusView {
        calculate_consensus(investors, &MasterResolver::default(), &EngineConfig::sequential())
    }

    #[test]
    fn test_consensus_needs_two_meaningful_holders() {
        // Z at 5%, 5%, 1%
        let investors = vec![
            investor("a", &[("Z", dec!(5)), ("FILL", dec!(95))]),
            investor("b", &[("Z", dec!(5)), ("FILLB", dec!(95))]),
            investor("c", &[("Z", dec!(1)), ("FILLC", dec!(99))]),
        ];
        let view = run(&investors);

        let z = view
            .consensus
            .iter()
            .find(|r| r.security.key() == "Z")
            .unwrap();
        assert_eq!(z.investor_count, 2);
        assert!((z.max_weight - 0.05).abs() < 1e-12);
        assert_eq!(z.total_value, dec!(10));
        assert!(view.contrarian.iter().all(|r| r.security.key() != "Z"));
    }

    #[test]
    fn test_single_heavy_holder_is_contrarian() {
        let investors = vec![
            investor("a", &[("Y", dec!(6)), ("FILL", dec!(94))]),
            investor("b", &[("FILLB", dec!(100))]),
        ];
        let view = run(&investors);

        let y = view
            .contrarian
            .iter()
            .find(|r| r.security.key() == "Y")
            .unwrap();
        assert_eq!(y.investor_count, 1);
        assert!((y.max_weight - 0.06).abs() < 1e-12);
        assert!(view.consensus.iter().all(|r| r.security.key() != "Y"));
    }

    #[test]
    fn test_three_holders_not_contrarian() {
        let investors = vec![
            investor("a", &[("Y", dec!(50)), ("F1", dec!(50))]),
            investor("b", &[("Y", dec!(1)), ("F2", dec!(99))]),
            investor("c", &[("Y", dec!(1)), ("F3", dec!(99))]),
        ];
        let view = run(&investors);
        assert!(view.contrarian.iter().all(|r| r.security.key() != "Y"));
    }

    #[test]
    fn test_tie_break_by_value_then_key() {
        // B and A both held at exactly 50% by two investors; B has more value
        let investors = vec![
            investor("a", &[("A", dec!(50)), ("B", dec!(50))]),
            investor("b", &[("A", dec!(100)), ("B", dec!(100))]),
            investor("c", &[("C", dec!(1)), ("D", dec!(1))]),
            investor("d", &[("C", dec!(1)), ("D", dec!(1))]),
        ];
        let view = run(&investors);
        let keys: Vec<&str> = view.consensus.iter().map(|r| r.security.key()).collect();
        // all at 50%: A and B (value 150) before C and D (value 2), then by key
        assert_eq!(keys, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_empty_investors_are_skipped() {
        let investors = vec![Investor::new("none", "None", vec![])];
        let view = run(&investors);
        assert!(view.consensus.is_empty());
        assert!(view.contrarian.is_empty());
    }

    #[test]
    fn test_same_key_summed_within_investor() {
        // two identifiers, same ticker: 2% + 2% = 4% -> contrarian
        let positions = vec![
            Position {
                name: "Q".into(),
                identifier: "Q-A".into(),
                shares: dec!(1),
                value: dec!(2),
                ticker: Some("Q".into()),
            },
            Position {
                name: "Q".into(),
                identifier: "Q-B".into(),
                shares: dec!(1),
                value: dec!(2),
                ticker: Some("Q".into()),
            },
            Position {
                name: "F".into(),
                identifier: "F".into(),
                shares: dec!(1),
                value: dec!(96),
                ticker: Some("F".into()),
            },
        ];
        let investors = vec![Investor::new(
            "a",
            "A",
            vec![Snapshot::new(
                "Q4 2024".parse().unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            )
            .with_positions(positions)],
        )];
        let view = run(&investors);
        let q = view.contrarian.iter().find(|r| r.security.key() == "Q").unwrap();
        assert!((q.max_weight - 0.04).abs() < 1e-12);
    }
}
