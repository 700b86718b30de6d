//! Multi-lot position merging.

use chrono::NaiveDate;
use holdwise_core::types::{MergedPosition, Period, Position, Snapshot};
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Relative gap between filed and computed totals that gets logged.
const TOTAL_DIVERGENCE_TOLERANCE: Decimal = dec!(0.01);

/// A snapshot after merging repeated lots.
///
/// `total_value` is the sum of merged position values, so weights computed
/// against it sum to one. The total stated on the filing is kept separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSnapshot {
    /// Reporting period.
    pub period: Period,
    /// Filing date.
    pub filing_date: NaiveDate,
    /// Filing form type.
    pub form: String,
    /// Filing accession identifier.
    pub accession: String,
    /// Total stated on the filing.
    pub reported_total: Decimal,
    /// Sum of merged position values.
    pub total_value: Decimal,
    /// One record per identifier, in first-encounter order.
    pub positions: Vec<MergedPosition>,
}

impl MergedSnapshot {
    /// Portfolio weight of a value as a fraction. Zero when the total is zero.
    #[must_use]
    pub fn weight_of(&self, value: Decimal) -> f64 {
        weight_fraction(value, self.total_value)
    }

    /// Finds the merged position for an identifier.
    #[must_use]
    pub fn position(&self, identifier: &str) -> Option<&MergedPosition> {
        self.positions.iter().find(|p| p.identifier == identifier)
    }

    /// Number of distinct securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// `value / total` as `f64`, or zero when `total` is not positive.
#[must_use]
pub fn weight_fraction(value: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    (value / total).to_f64().unwrap_or(0.0)
}

/// Collapses lots sharing an identifier.
///
/// Shares and values are summed; name and explicit ticker come from the first
/// lot. Output keeps first-encounter order.
#[must_use]
pub fn merge_positions(positions: &[Position]) -> Vec<MergedPosition> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(positions.len());
    let mut merged: Vec<MergedPosition> = Vec::with_capacity(positions.len());

    for lot in positions {
        match index.get(lot.identifier.as_str()) {
            Some(&i) => merged[i].absorb(lot),
            None => {
                index.insert(lot.identifier.as_str(), merged.len());
                merged.push(MergedPosition::from_lot(lot));
            }
        }
    }

    merged
}

/// Merges a snapshot's positions and carries its metadata.
#[must_use]
pub fn merge_snapshot(snapshot: &Snapshot) -> MergedSnapshot {
    let positions = merge_positions(&snapshot.positions);
    let total_value: Decimal = positions.iter().map(|p| p.value).sum();

    if snapshot.total_value > Decimal::ZERO {
        let gap = (snapshot.total_value - total_value).abs() / snapshot.total_value;
        if gap > TOTAL_DIVERGENCE_TOLERANCE {
            warn!(
                "{} filing {}: reported total {} differs from position sum {}",
                snapshot.period, snapshot.accession, snapshot.total_value, total_value
            );
        }
    }

    MergedSnapshot {
        period: snapshot.period,
        filing_date: snapshot.filing_date,
        form: snapshot.form.clone(),
        accession: snapshot.accession.clone(),
        reported_total: snapshot.total_value,
        total_value,
        positions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(name: &str, id: &str, shares: Decimal, value: Decimal) -> Position {
        Position {
            name: name.to_string(),
            identifier: id.to_string(),
            shares,
            value,
            ticker: None,
        }
    }

    #[test]
    fn test_merge_sums_lots() {
        let merged = merge_positions(&[
            lot("APPLE INC", "037833100", dec!(100), dec!(1000)),
            lot("COCA COLA", "191216100", dec!(50), dec!(300)),
            lot("APPLE INC CL", "037833100", dec!(25), dec!(250)),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].identifier, "037833100");
        assert_eq!(merged[0].shares, dec!(125));
        assert_eq!(merged[0].value, dec!(1250));
        assert_eq!(merged[0].name, "APPLE INC");
        assert_eq!(merged[0].lots, 2);
        assert_eq!(merged[1].identifier, "191216100");
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_positions(&[]).is_empty());
    }

    #[test]
    fn test_merge_snapshot_total() {
        let snapshot = Snapshot::new(
            "Q4 2024".parse().unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
        )
        .with_total_value(dec!(5000))
        .with_positions(vec![
            lot("A", "A1", dec!(10), dec!(600)),
            lot("A", "A1", dec!(10), dec!(400)),
            lot("B", "B1", dec!(10), dec!(1000)),
        ]);

        let merged = merge_snapshot(&snapshot);
        assert_eq!(merged.total_value, dec!(2000));
        assert_eq!(merged.reported_total, dec!(5000));
        assert_eq!(merged.len(), 2);
        assert!((merged.weight_of(dec!(1000)) - 0.5).abs() < 1e-12);
        assert_eq!(merged.position("B1").unwrap().value, dec!(1000));
    }

    #[test]
    fn test_weight_zero_total() {
        assert_eq!(weight_fraction(dec!(100), Decimal::ZERO), 0.0);
    }
}
