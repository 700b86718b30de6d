//! Security identity and the security master table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How a security's ticker was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The position carried its own ticker.
    Explicit,
    /// Identifier lookup in the security master.
    Master,
    /// Issuer-name match against the security master.
    NameMatch,
    /// Identifier with trailing zero-padding removed.
    Fallback,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Explicit => "explicit",
            Self::Master => "master",
            Self::NameMatch => "name-match",
            Self::Fallback => "fallback",
        };
        write!(f, "{s}")
    }
}

/// A resolved security.
///
/// Securities without a resolvable ticker are still tracked and keyed by
/// their normalized identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityRef {
    /// Normalized identifier (trimmed, upper-cased).
    pub identifier: String,

    /// Ticker symbol, if one could be determined.
    pub ticker: Option<String>,

    /// Cleaned display name.
    pub name: String,

    /// Which resolution step produced the ticker.
    pub source: ResolutionSource,
}

impl SecurityRef {
    /// Key used to group the same security across positions and investors.
    #[must_use]
    pub fn key(&self) -> &str {
        self.ticker.as_deref().unwrap_or(&self.identifier)
    }
}

impl fmt::Display for SecurityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Normalizes a security identifier for lookups.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_uppercase()
}

/// Strips a leading `"TICKER - "` prefix from a filed issuer name.
///
/// ```rust
/// use holdwise_core::types::clean_display_name;
///
/// assert_eq!(clean_display_name("AAPL - Apple Inc."), "Apple Inc.");
/// assert_eq!(clean_display_name("COCA COLA CO"), "COCA COLA CO");
/// ```
#[must_use]
pub fn clean_display_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some((prefix, rest)) = trimmed.split_once(" - ") {
        let looks_like_ticker = !prefix.is_empty()
            && prefix.len() <= 6
            && prefix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.');
        if looks_like_ticker && !rest.trim().is_empty() {
            return rest.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// One row of the security master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRecord {
    /// CUSIP-like identifier.
    #[serde(alias = "cusip")]
    pub identifier: String,

    /// Ticker symbol.
    pub ticker: String,

    /// Issuer name.
    pub name: String,

    /// Sector, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

impl SecurityRecord {
    /// Creates a record without a sector.
    #[must_use]
    pub fn new(identifier: impl Into<String>, ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ticker: ticker.into(),
            name: name.into(),
            sector: None,
        }
    }

    /// Sets the sector.
    #[must_use]
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

/// Identifier → ticker/name lookup table.
///
/// Record order is preserved; name matching returns the first match in that
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SecurityRecord>", into = "Vec<SecurityRecord>")]
pub struct SecurityMaster {
    records: Vec<SecurityRecord>,
    by_identifier: HashMap<String, usize>,
}

impl SecurityMaster {
    /// Builds a master from records. On duplicate identifiers the first wins.
    #[must_use]
    pub fn new(records: Vec<SecurityRecord>) -> Self {
        let mut by_identifier = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            by_identifier
                .entry(normalize_identifier(&record.identifier))
                .or_insert(i);
        }
        Self {
            records,
            by_identifier,
        }
    }

    /// Returns all records in table order.
    #[must_use]
    pub fn records(&self) -> &[SecurityRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by identifier (normalized before lookup).
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<&SecurityRecord> {
        self.by_identifier
            .get(&normalize_identifier(identifier))
            .and_then(|&i| self.records.get(i))
    }

    /// First record whose name contains `name`, or is contained in it,
    /// ignoring case. Blank names never match.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&SecurityRecord> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.records.iter().find(|record| {
            let candidate = record.name.trim().to_lowercase();
            !candidate.is_empty() && (candidate.contains(&needle) || needle.contains(&candidate))
        })
    }
}

impl From<Vec<SecurityRecord>> for SecurityMaster {
    fn from(records: Vec<SecurityRecord>) -> Self {
        Self::new(records)
    }
}

impl From<SecurityMaster> for Vec<SecurityRecord> {
    fn from(master: SecurityMaster) -> Self {
        master.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master() -> SecurityMaster {
        SecurityMaster::new(vec![
            SecurityRecord::new("037833100", "AAPL", "Apple Inc.").with_sector("Technology"),
            SecurityRecord::new("191216100", "KO", "Coca-Cola Co"),
            SecurityRecord::new("594918104", "MSFT", "Microsoft Corp"),
        ])
    }

    #[test]
    fn test_lookup_normalizes() {
        let master = master();
        assert_eq!(master.lookup(" 037833100 ").unwrap().ticker, "AAPL");
        assert!(master.lookup("000000000").is_none());
        assert_eq!(master.len(), 3);
    }

    #[test]
    fn test_find_by_name_either_direction() {
        let master = master();
        // needle contained in candidate
        assert_eq!(master.find_by_name("microsoft").unwrap().ticker, "MSFT");
        // candidate contained in needle
        assert_eq!(master.find_by_name("APPLE INC. COMMON STOCK").unwrap().ticker, "AAPL");
        assert!(master.find_by_name("   ").is_none());
        assert!(master.find_by_name("Berkshire").is_none());
    }

    #[test]
    fn test_duplicate_identifier_first_wins() {
        let master = SecurityMaster::new(vec![
            SecurityRecord::new("X1", "AAA", "First"),
            SecurityRecord::new("x1", "BBB", "Second"),
        ]);
        assert_eq!(master.lookup("X1").unwrap().ticker, "AAA");
    }

    #[test]
    fn test_security_ref_key() {
        let with_ticker = SecurityRef {
            identifier: "037833100".into(),
            ticker: Some("AAPL".into()),
            name: "Apple".into(),
            source: ResolutionSource::Master,
        };
        assert_eq!(with_ticker.key(), "AAPL");

        let without = SecurityRef {
            ticker: None,
            source: ResolutionSource::Fallback,
            ..with_ticker
        };
        assert_eq!(without.key(), "037833100");
    }

    #[test]
    fn test_clean_display_name() {
        assert_eq!(clean_display_name("AAPL - Apple Inc."), "Apple Inc.");
        assert_eq!(clean_display_name("BRK.B - Berkshire Hathaway"), "Berkshire Hathaway");
        assert_eq!(clean_display_name("Alpha - Omega Holdings"), "Alpha - Omega Holdings");
        assert_eq!(clean_display_name("  PLAIN NAME "), "PLAIN NAME");
    }

    #[test]
    fn test_master_serde_as_list() {
        let json = r#"[{"cusip":"037833100","ticker":"AAPL","name":"Apple Inc."}]"#;
        let master: SecurityMaster = serde_json::from_str(json).unwrap();
        assert_eq!(master.lookup("037833100").unwrap().ticker, "AAPL");
    }
}
