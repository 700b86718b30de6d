//! Investors and their snapshot history.

use serde::{Deserialize, Serialize};

use super::{Period, PeriodSelection, Snapshot};

/// An institutional investor with its disclosure history.
///
/// Snapshots are held oldest first, including after deserializing. The
/// engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "InvestorRecord")]
pub struct Investor {
    /// Stable identifier (e.g. `"berkshire-hathaway"`).
    pub slug: String,

    /// Display name.
    pub name: String,

    /// Snapshots ordered by filing date, oldest first.
    pub snapshots: Vec<Snapshot>,
}

/// Investor as written in a dataset, snapshots in any order.
#[derive(Deserialize)]
struct InvestorRecord {
    slug: String,
    name: String,
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

impl From<InvestorRecord> for Investor {
    fn from(record: InvestorRecord) -> Self {
        Self::new(record.slug, record.name, record.snapshots)
    }
}

impl Investor {
    /// Creates an investor. Snapshots are put in filing-date order.
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>, mut snapshots: Vec<Snapshot>) -> Self {
        snapshots.sort_by_key(|s| (s.filing_date, s.period));
        Self {
            slug: slug.into(),
            name: name.into(),
            snapshots,
        }
    }

    /// Returns true if the investor has filed at least once.
    #[must_use]
    pub fn has_snapshots(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Snapshot immediately before the latest.
    #[must_use]
    pub fn previous(&self) -> Option<&Snapshot> {
        self.snapshot_before(self.snapshots.len().checked_sub(1)?)
    }

    /// Snapshot immediately before the one at `index`.
    #[must_use]
    pub fn snapshot_before(&self, index: usize) -> Option<&Snapshot> {
        index.checked_sub(1).and_then(|i| self.snapshots.get(i))
    }

    /// Index of the most recent snapshot whose period is selected.
    #[must_use]
    pub fn latest_index_in(&self, selection: &PeriodSelection) -> Option<usize> {
        self.snapshots
            .iter()
            .rposition(|s| selection.contains(&s.period))
    }

    /// Most recent snapshot whose period is selected.
    #[must_use]
    pub fn latest_in(&self, selection: &PeriodSelection) -> Option<&Snapshot> {
        self.latest_index_in(selection)
            .and_then(|i| self.snapshots.get(i))
    }

    /// Snapshot reporting `period`, if one was filed.
    ///
    /// When amendments produce several snapshots for one period the latest
    /// filing wins.
    #[must_use]
    pub fn snapshot_for(&self, period: &Period) -> Option<&Snapshot> {
        self.snapshots.iter().rev().find(|s| &s.period == period)
    }

    /// Distinct periods filed, oldest first.
    #[must_use]
    pub fn periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = self.snapshots.iter().map(|s| s.period).collect();
        periods.sort();
        periods.dedup();
        periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snap(period: &str, y: i32, m: u32) -> Snapshot {
        Snapshot::new(
            period.parse().unwrap(),
            NaiveDate::from_ymd_opt(y, m, 14).unwrap(),
        )
    }

    #[test]
    fn test_new_sorts_by_filing_date() {
        let investor = Investor::new(
            "fund-a",
            "Fund A",
            vec![snap("Q4 2024", 2025, 2), snap("Q2 2024", 2024, 8), snap("Q3 2024", 2024, 11)],
        );
        let labels: Vec<String> = investor
            .snapshots
            .iter()
            .map(|s| s.period.to_string())
            .collect();
        assert_eq!(labels, vec!["Q2 2024", "Q3 2024", "Q4 2024"]);
        assert_eq!(investor.latest().unwrap().period.to_string(), "Q4 2024");
        assert_eq!(investor.previous().unwrap().period.to_string(), "Q3 2024");
    }

    #[test]
    fn test_empty_investor() {
        let investor = Investor::new("empty", "Empty", vec![]);
        assert!(!investor.has_snapshots());
        assert!(investor.latest().is_none());
        assert!(investor.previous().is_none());
        assert!(investor.latest_in(&PeriodSelection::All).is_none());
    }

    #[test]
    fn test_single_snapshot_has_no_previous() {
        let investor = Investor::new("one", "One", vec![snap("Q4 2024", 2025, 2)]);
        assert!(investor.previous().is_none());
        assert!(investor.snapshot_before(0).is_none());
    }

    #[test]
    fn test_latest_in_selection() {
        let investor = Investor::new(
            "fund-a",
            "Fund A",
            vec![snap("Q2 2024", 2024, 8), snap("Q3 2024", 2024, 11), snap("Q4 2024", 2025, 2)],
        );
        let q3: Period = "Q3 2024".parse().unwrap();
        let selection = PeriodSelection::single(q3);
        assert_eq!(investor.latest_in(&selection).unwrap().period, q3);
        assert_eq!(investor.latest_index_in(&selection), Some(1));
        assert_eq!(
            investor.latest_in(&PeriodSelection::All).unwrap().period.to_string(),
            "Q4 2024"
        );

        let missing = PeriodSelection::single("Q1 2020".parse().unwrap());
        assert!(investor.latest_in(&missing).is_none());
        assert_eq!(investor.snapshot_for(&q3).unwrap().period, q3);
        assert_eq!(investor.periods().len(), 3);
    }

    #[test]
    fn test_deserialize_sorts_snapshots() {
        let json = r#"{
            "slug": "fund",
            "name": "Fund",
            "snapshots": [
                {"period": "Q4 2024", "filing_date": "2025-02-14", "positions": []},
                {"period": "Q2 2024", "filing_date": "2024-08-14", "positions": []},
                {"period": "Q3 2024", "filing_date": "2024-11-14", "positions": []}
            ]
        }"#;
        let investor: Investor = serde_json::from_str(json).unwrap();

        assert_eq!(investor.latest().unwrap().period.to_string(), "Q4 2024");
        assert_eq!(investor.previous().unwrap().period.to_string(), "Q3 2024");
        assert_eq!(investor.snapshots[0].period.to_string(), "Q2 2024");
    }

    #[test]
    fn test_deserialize_without_snapshots() {
        let investor: Investor =
            serde_json::from_str(r#"{"slug": "idle", "name": "Idle"}"#).unwrap();
        assert!(!investor.has_snapshots());
    }
}
