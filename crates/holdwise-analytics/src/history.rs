//! Per-security ownership time series for one investor.

use chrono::NaiveDate;
use holdwise_core::types::{Investor, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::merger::merge_snapshot;
use crate::resolver::SecurityResolver;

/// One point of an ownership history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipPoint {
    /// Reporting period.
    pub period: Period,
    /// Filing date.
    pub filing_date: NaiveDate,
    /// Shares held (zero when not held).
    pub shares: Decimal,
    /// Value held.
    pub value: Decimal,
    /// Weight as percentage of the snapshot total (0-100).
    pub weight_pct: f64,
    /// Whether the security was held.
    pub held: bool,
}

/// Ownership of one security across every snapshot of an investor.
///
/// `security_key` matches a resolved ticker or normalized identifier, ignoring
/// case. Positions resolving to the same key are summed. Snapshots without the
/// security produce a point with `held == false`.
pub fn ownership_history(
    investor: &Investor,
    security_key: &str,
    resolver: &dyn SecurityResolver,
) -> Vec<OwnershipPoint> {
    let wanted = security_key.trim();

    investor
        .snapshots
        .iter()
        .map(|snapshot| {
            let merged = merge_snapshot(snapshot);
            let (shares, value) = merged
                .positions
                .iter()
                .filter(|p| {
                    let security = resolver.resolve_merged(p);
                    security.key().eq_ignore_ascii_case(wanted)
                        || security.identifier.eq_ignore_ascii_case(wanted)
                })
                .fold((Decimal::ZERO, Decimal::ZERO), |(s, v), p| {
                    (s + p.shares, v + p.value)
                });
            OwnershipPoint {
                period: merged.period,
                filing_date: merged.filing_date,
                shares,
                value,
                weight_pct: merged.weight_of(value) * 100.0,
                held: shares > Decimal::ZERO,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MasterResolver;
    use approx::assert_relative_eq;
    use holdwise_core::types::{Position, SecurityMaster, SecurityRecord, Snapshot};
    use rust_decimal_macros::dec;

    fn snap(month: u32, holdings: &[(&str, Decimal, Decimal)]) -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2024, month, 14).unwrap();
        Snapshot::new(Period::from_filing_date(date), date).with_positions(
            holdings
                .iter()
                .map(|(id, shares, value)| Position {
                    name: String::new(),
                    identifier: (*id).to_string(),
                    shares: *shares,
                    value: *value,
                    ticker: None,
                })
                .collect(),
        )
    }

    #[test]
    fn test_history_by_ticker() {
        let resolver = MasterResolver::new(SecurityMaster::new(vec![SecurityRecord::new(
            "037833100",
            "AAPL",
            "Apple Inc.",
        )]));
        let investor = Investor::new(
            "a",
            "A",
            vec![
                snap(2, &[("037833100", dec!(10), dec!(250)), ("X", dec!(1), dec!(750))]),
                snap(5, &[("X", dec!(1), dec!(750))]),
                snap(8, &[("037833100", dec!(20), dec!(500))]),
            ],
        );

        let history = ownership_history(&investor, "aapl", &resolver);
        assert_eq!(history.len(), 3);
        assert!(history[0].held);
        assert_relative_eq!(history[0].weight_pct, 25.0, epsilon = 1e-9);
        assert!(!history[1].held);
        assert_eq!(history[1].shares, Decimal::ZERO);
        assert_eq!(history[2].shares, dec!(20));
        assert_relative_eq!(history[2].weight_pct, 100.0, epsilon = 1e-9);

        // identifier also matches
        let by_id = ownership_history(&investor, "037833100", &resolver);
        assert_eq!(by_id, history);
    }
}
