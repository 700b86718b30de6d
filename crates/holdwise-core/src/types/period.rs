//! Disclosure periods (calendar quarters).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A calendar quarter identifying one disclosure period.
///
/// Periods order chronologically and are displayed as `"Q3 2024"`. Both
/// `"Q3 2024"` and `"2024-Q3"` parse.
///
/// # Example
///
/// ```rust
/// use holdwise_core::types::Period;
///
/// let period: Period = "Q4 2024".parse().unwrap();
/// assert_eq!(period.next().to_string(), "Q1 2025");
/// assert!(period < "2025-Q1".parse().unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    quarter: u8,
}

impl Period {
    /// Creates a period from a year and a quarter number (1-4).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPeriod` if the quarter is outside 1-4.
    pub fn new(year: i32, quarter: u8) -> CoreResult<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(CoreError::invalid_period(format!("Q{quarter} {year}")));
        }
        Ok(Self { year, quarter })
    }

    /// Returns the calendar quarter containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: quarter_of_month(date.month()),
        }
    }

    /// Returns the period reported by a filing made on `date`.
    ///
    /// Filings are made in the quarter after the one they report, so a filing
    /// dated in Q1 2025 reports Q4 2024.
    #[must_use]
    pub fn from_filing_date(date: NaiveDate) -> Self {
        Self::containing(date).previous()
    }

    /// Returns the year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the quarter number (1-4).
    #[must_use]
    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// Returns the preceding quarter.
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.quarter == 1 {
            Self {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }

    /// Returns the following quarter.
    #[must_use]
    pub fn next(&self) -> Self {
        if self.quarter == 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }
}

fn quarter_of_month(month: u32) -> u8 {
    // month is 1-12 so the result is 1-4
    ((month - 1) / 3 + 1) as u8
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let invalid = || CoreError::invalid_period(s);

        let (quarter_part, year_part) = if let Some((q, y)) = label.split_once(' ') {
            (q.trim(), y.trim())
        } else if let Some((y, q)) = label.split_once('-') {
            (q.trim(), y.trim())
        } else {
            return Err(invalid());
        };

        let quarter = quarter_part
            .strip_prefix('Q')
            .or_else(|| quarter_part.strip_prefix('q'))
            .ok_or_else(invalid)?
            .parse::<u8>()
            .map_err(|_| invalid())?;
        let year = year_part.parse::<i32>().map_err(|_| invalid())?;

        Self::new(year, quarter).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Period {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Which disclosure periods an aggregate view should consider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSelection {
    /// Every period is selected.
    #[default]
    All,
    /// Only the listed periods are selected.
    Only(BTreeSet<Period>),
}

impl PeriodSelection {
    /// Selects every period.
    #[must_use]
    pub fn all() -> Self {
        Self::All
    }

    /// Selects the given periods.
    #[must_use]
    pub fn only(periods: impl IntoIterator<Item = Period>) -> Self {
        Self::Only(periods.into_iter().collect())
    }

    /// Selects a single period.
    #[must_use]
    pub fn single(period: Period) -> Self {
        Self::only([period])
    }

    /// Returns true if `period` is selected.
    #[must_use]
    pub fn contains(&self, period: &Period) -> bool {
        match self {
            Self::All => true,
            Self::Only(periods) => periods.contains(period),
        }
    }

    /// Returns the explicitly selected periods, oldest first.
    ///
    /// Returns `None` for [`PeriodSelection::All`].
    #[must_use]
    pub fn periods(&self) -> Option<Vec<Period>> {
        match self {
            Self::All => None,
            Self::Only(periods) => Some(periods.iter().copied().collect()),
        }
    }
}
