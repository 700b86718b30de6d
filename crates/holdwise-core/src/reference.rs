//! Reference tables for sector and geography classification.
//!
//! These are injected into the engine. [`ReferenceData::default`] carries a
//! small built-in table covering the most widely held US large caps; callers
//! with better data should supply their own.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::types::SecurityMaster;

/// Sector assigned to tickers missing from the sector table.
pub const OTHER_SECTOR: &str = "Other";

/// Coarse geographic bucket.
///
/// This is a ticker heuristic, not country-of-incorporation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Geography {
    /// Listed in the United States.
    #[serde(rename = "US")]
    Us,
    /// Listed elsewhere or a known foreign issuer.
    International,
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Us => write!(f, "US"),
            Self::International => write!(f, "International"),
        }
    }
}

const DEFAULT_SECTORS: &[(&str, &str)] = &[
    ("AAPL", "Technology"),
    ("MSFT", "Technology"),
    ("NVDA", "Technology"),
    ("AVGO", "Technology"),
    ("ORCL", "Technology"),
    ("CRM", "Technology"),
    ("ADBE", "Technology"),
    ("TSM", "Technology"),
    ("ASML", "Technology"),
    ("SAP", "Technology"),
    ("GOOGL", "Communication Services"),
    ("GOOG", "Communication Services"),
    ("META", "Communication Services"),
    ("NFLX", "Communication Services"),
    ("DIS", "Communication Services"),
    ("CHTR", "Communication Services"),
    ("TCEHY", "Communication Services"),
    ("AMZN", "Consumer Discretionary"),
    ("TSLA", "Consumer Discretionary"),
    ("HD", "Consumer Discretionary"),
    ("MCD", "Consumer Discretionary"),
    ("NKE", "Consumer Discretionary"),
    ("BABA", "Consumer Discretionary"),
    ("KO", "Consumer Staples"),
    ("PEP", "Consumer Staples"),
    ("PG", "Consumer Staples"),
    ("COST", "Consumer Staples"),
    ("WMT", "Consumer Staples"),
    ("KHC", "Consumer Staples"),
    ("UL", "Consumer Staples"),
    ("NESN", "Consumer Staples"),
    ("JPM", "Financials"),
    ("BAC", "Financials"),
    ("WFC", "Financials"),
    ("C", "Financials"),
    ("AXP", "Financials"),
    ("V", "Financials"),
    ("MA", "Financials"),
    ("MCO", "Financials"),
    ("BRK.B", "Financials"),
    ("BRK.A", "Financials"),
    ("JNJ", "Health Care"),
    ("UNH", "Health Care"),
    ("LLY", "Health Care"),
    ("PFE", "Health Care"),
    ("ABBV", "Health Care"),
    ("MRK", "Health Care"),
    ("NVO", "Health Care"),
    ("XOM", "Energy"),
    ("CVX", "Energy"),
    ("OXY", "Energy"),
    ("COP", "Energy"),
    ("CAT", "Industrials"),
    ("GE", "Industrials"),
    ("UNP", "Industrials"),
    ("HON", "Industrials"),
    ("LIN", "Materials"),
    ("NEE", "Utilities"),
    ("AMT", "Real Estate"),
];

const DEFAULT_NON_US_ISSUERS: &[&str] = &[
    "ASML", "TSM", "NESN", "BABA", "TCEHY", "UL", "NVO", "NVSEF", "SAP",
];

const DEFAULT_NON_US_SUFFIXES: &[&str] = &[
    ".L", ".DE", ".PA", ".AS", ".SW", ".T", ".HK", ".TO", ".MI", ".MC", ".ST", ".CO", ".OL",
    ".HE", ".AX",
];

/// Injected lookup tables used for allocation and exposure analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    /// Ticker (upper-case) → sector name.
    pub sectors: HashMap<String, String>,

    /// Tickers of known non-US issuers.
    pub non_us_issuers: BTreeSet<String>,

    /// Ticker suffixes of non-US exchanges (e.g. `".L"`).
    pub non_us_suffixes: Vec<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            sectors: DEFAULT_SECTORS
                .iter()
                .map(|(t, s)| ((*t).to_string(), (*s).to_string()))
                .collect(),
            non_us_issuers: DEFAULT_NON_US_ISSUERS
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            non_us_suffixes: DEFAULT_NON_US_SUFFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl ReferenceData {
    /// Creates reference data with empty tables.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sectors: HashMap::new(),
            non_us_issuers: BTreeSet::new(),
            non_us_suffixes: Vec::new(),
        }
    }

    /// Adds or replaces a sector mapping.
    #[must_use]
    pub fn with_sector(mut self, ticker: &str, sector: impl Into<String>) -> Self {
        self.sectors.insert(ticker.trim().to_uppercase(), sector.into());
        self
    }

    /// Adds a non-US issuer ticker.
    #[must_use]
    pub fn with_non_us_issuer(mut self, ticker: &str) -> Self {
        self.non_us_issuers.insert(ticker.trim().to_uppercase());
        self
    }

    /// Adds every sector carried by the security master. Existing entries win.
    #[must_use]
    pub fn with_master_sectors(mut self, master: &SecurityMaster) -> Self {
        for record in master.records() {
            if let Some(sector) = &record.sector {
                self.sectors
                    .entry(record.ticker.trim().to_uppercase())
                    .or_insert_with(|| sector.clone());
            }
        }
        self
    }

    /// Sector for a ticker, or [`OTHER_SECTOR`].
    #[must_use]
    pub fn sector_for(&self, ticker: Option<&str>) -> &str {
        ticker
            .and_then(|t| self.sectors.get(&t.trim().to_uppercase()))
            .map_or(OTHER_SECTOR, String::as_str)
    }

    /// Geographic bucket for a ticker. Unknown tickers count as US.
    #[must_use]
    pub fn geography_of(&self, ticker: Option<&str>) -> Geography {
        let Some(ticker) = ticker else {
            return Geography::Us;
        };
        let ticker = ticker.trim().to_uppercase();
        let suffixed = self
            .non_us_suffixes
            .iter()
            .any(|suffix| ticker.ends_with(&suffix.to_uppercase()));
        if suffixed || self.non_us_issuers.contains(&ticker) {
            Geography::International
        } else {
            Geography::Us
        }
    }
}
