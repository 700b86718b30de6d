//! Snapshot source collaborator.
//!
//! The engine never loads data itself. Anything that can list investors and
//! hand back their snapshots implements [`SnapshotSource`]; [`Dataset`] is the
//! serde-loadable implementation used by the CLI and in tests.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::reference::ReferenceData;
use crate::types::{Investor, SecurityMaster, Snapshot};

/// Supplies investors and their snapshot histories.
pub trait SnapshotSource {
    /// Slugs of every known investor.
    fn investor_slugs(&self) -> Vec<String>;

    /// Display name for an investor, if known.
    fn display_name(&self, slug: &str) -> Option<String>;

    /// Snapshots for an investor, oldest first. May be empty.
    fn snapshots(&self, slug: &str) -> Vec<Snapshot>;
}

/// Builds [`Investor`] values from a source.
///
/// Investors are returned in slug order. Investors with no snapshots are kept;
/// analytics skip them.
pub fn collect_investors(source: &dyn SnapshotSource) -> Vec<Investor> {
    let mut slugs = source.investor_slugs();
    slugs.sort();
    slugs.dedup();

    slugs
        .into_iter()
        .map(|slug| {
            let snapshots = source.snapshots(&slug);
            if snapshots.is_empty() {
                debug!("investor '{slug}' has no snapshots");
            }
            let name = source.display_name(&slug).unwrap_or_else(|| slug.clone());
            Investor::new(slug, name, snapshots)
        })
        .collect()
}

/// An in-memory holdings dataset: security master plus investors.
///
/// ```json
/// {
///   "securities": [{"identifier": "037833100", "ticker": "AAPL", "name": "Apple Inc."}],
///   "investors": [{"slug": "fund-a", "name": "Fund A", "snapshots": []}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Security master table.
    #[serde(default)]
    pub securities: SecurityMaster,

    /// Optional reference tables replacing the built-in defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceData>,

    /// Investors with their snapshots.
    #[serde(default)]
    pub investors: Vec<Investor>,
}

impl Dataset {
    /// Creates a dataset.
    #[must_use]
    pub fn new(securities: SecurityMaster, investors: Vec<Investor>) -> Self {
        Self {
            securities,
            reference: None,
            investors,
        }
    }

    /// Reference tables for this dataset, enriched with master sectors.
    #[must_use]
    pub fn reference_data(&self) -> ReferenceData {
        self.reference
            .clone()
            .unwrap_or_default()
            .with_master_sectors(&self.securities)
    }

    /// Checks every snapshot and rejects duplicate investor slugs.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = std::collections::HashSet::new();
        for investor in &self.investors {
            if investor.slug.trim().is_empty() {
                return Err(CoreError::missing_field("slug"));
            }
            if !seen.insert(investor.slug.as_str()) {
                return Err(CoreError::invalid_snapshot(
                    investor.slug.clone(),
                    "duplicate investor slug",
                ));
            }
            for snapshot in &investor.snapshots {
                snapshot.validate()?;
            }
        }
        Ok(())
    }
}

impl SnapshotSource for Dataset {
    fn investor_slugs(&self) -> Vec<String> {
        self.investors.iter().map(|i| i.slug.clone()).collect()
    }

    fn display_name(&self, slug: &str) -> Option<String> {
        self.investors
            .iter()
            .find(|i| i.slug == slug)
            .map(|i| i.name.clone())
    }

    fn snapshots(&self, slug: &str) -> Vec<Snapshot> {
        self.investors
            .iter()
            .find(|i| i.slug == slug)
            .map(|i| i.snapshots.clone())
            .unwrap_or_default()
    }
}
