//! Portfolio concentration metrics.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::config::ConcentrationBands;
use crate::merger::MergedSnapshot;

/// Concentration band derived from the Herfindahl index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationBand {
    /// Few positions dominate.
    Concentrated,
    /// Between concentrated and diversified.
    Balanced,
    /// Weight spread widely.
    Diversified,
}

impl ConcentrationBand {
    /// Band for a Herfindahl index.
    #[must_use]
    pub fn from_index(herfindahl: f64, bands: &ConcentrationBands) -> Self {
        if herfindahl > bands.concentrated_above {
            Self::Concentrated
        } else if herfindahl > bands.balanced_above {
            Self::Balanced
        } else {
            Self::Diversified
        }
    }
}

impl fmt::Display for ConcentrationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concentrated => write!(f, "concentrated"),
            Self::Balanced => write!(f, "balanced"),
            Self::Diversified => write!(f, "diversified"),
        }
    }
}

/// Concentration of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationMetric {
    /// Sum of squared weight fractions, in `[1/N, 1]` for a positive total.
    pub herfindahl_index: f64,
    /// Combined weight of the 3 largest positions (fraction).
    pub top3_weight: f64,
    /// Combined weight of the 10 largest positions (fraction).
    pub top10_weight: f64,
    /// Number of merged positions.
    pub position_count: usize,
    /// Band for the index.
    pub band: ConcentrationBand,
}

/// Computes concentration over merged positions.
///
/// A zero total gives zero weights, so the index is 0 and the band diversified.
#[must_use]
pub fn calculate_concentration(
    snapshot: &MergedSnapshot,
    bands: &ConcentrationBands,
) -> ConcentrationMetric {
    let mut weights: Vec<f64> = snapshot
        .positions
        .iter()
        .map(|p| snapshot.weight_of(p.value))
        .collect();
    weights.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let herfindahl_index: f64 = weights.iter().map(|w| w * w).sum();
    let top3_weight: f64 = weights.iter().take(3).sum();
    let top10_weight: f64 = weights.iter().take(10).sum();

    ConcentrationMetric {
        herfindahl_index,
        top3_weight,
        top10_weight,
        position_count: weights.len(),
        band: ConcentrationBand::from_index(herfindahl_index, bands),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::merge_snapshot;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use holdwise_core::types::{Position, Snapshot};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn snapshot(values: &[Decimal]) -> MergedSnapshot {
        let positions = values
            .iter()
            .enumerate()
            .map(|(i, v)| Position {
                name: format!("P{i}"),
                identifier: format!("ID{i}"),
                shares: dec!(1),
                value: *v,
                ticker: None,
            })
            .collect();
        merge_snapshot(
            &Snapshot::new(
                "Q4 2024".parse().unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
            )
            .with_positions(positions),
        )
    }

    #[test]
    fn test_equal_weights() {
        let metric = calculate_concentration(&snapshot(&[dec!(10); 4]), &ConcentrationBands::default());
        assert_relative_eq!(metric.herfindahl_index, 0.25, epsilon = 1e-12);
        assert_relative_eq!(metric.top3_weight, 0.75, epsilon = 1e-12);
        assert_relative_eq!(metric.top10_weight, 1.0, epsilon = 1e-12);
        assert_eq!(metric.position_count, 4);
        assert_eq!(metric.band, ConcentrationBand::Concentrated);
    }

    #[test]
    fn test_single_position() {
        let metric = calculate_concentration(&snapshot(&[dec!(123)]), &ConcentrationBands::default());
        assert_relative_eq!(metric.herfindahl_index, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bands() {
        let bands = ConcentrationBands::default();
        // 8 equal -> 0.125
        let balanced = calculate_concentration(&snapshot(&[dec!(1); 8]), &bands);
        assert_eq!(balanced.band, ConcentrationBand::Balanced);
        // 20 equal -> 0.05
        let diversified = calculate_concentration(&snapshot(&[dec!(1); 20]), &bands);
        assert_eq!(diversified.band, ConcentrationBand::Diversified);
        // boundary is exclusive
        assert_eq!(
            ConcentrationBand::from_index(0.20, &bands),
            ConcentrationBand::Balanced
        );
        assert_eq!(
            ConcentrationBand::from_index(0.10, &bands),
            ConcentrationBand::Diversified
        );
    }

    #[test]
    fn test_top_weights_use_largest() {
        let metric = calculate_concentration(
            &snapshot(&[dec!(10), dec!(50), dec!(20), dec!(20)]),
            &ConcentrationBands::default(),
        );
        assert_relative_eq!(metric.top3_weight, 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_total() {
        let metric = calculate_concentration(&snapshot(&[dec!(0), dec!(0)]), &ConcentrationBands::default());
        assert_eq!(metric.herfindahl_index, 0.0);
        assert_eq!(metric.band, ConcentrationBand::Diversified);
        assert_eq!(metric.position_count, 2);
    }

    #[test]
    fn test_empty() {
        let metric = calculate_concentration(&snapshot(&[]), &ConcentrationBands::default());
        assert_eq!(metric.position_count, 0);
        assert_eq!(metric.top3_weight, 0.0);
    }
}
