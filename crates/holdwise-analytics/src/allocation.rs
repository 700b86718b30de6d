//! Sector and geography allocation of a single snapshot.

use holdwise_core::reference::ReferenceData;
use holdwise_core::types::MergedPosition;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::merger::{weight_fraction, MergedSnapshot};
use crate::resolver::SecurityResolver;

/// Aggregated value for one allocation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationBucket {
    /// Bucket label (sector name, or "US"/"International").
    pub label: String,
    /// Number of positions in the bucket.
    pub count: usize,
    /// Total value in the bucket.
    pub value: Decimal,
    /// Weight as percentage of total (0-100).
    pub weight_pct: f64,
}

/// Groups positions into labelled buckets, largest value first.
///
/// Ties are ordered by label.
pub fn allocate_by<F>(snapshot: &MergedSnapshot, label_of: F) -> Vec<AllocationBucket>
where
    F: Fn(&MergedPosition) -> String,
{
    let mut buckets: HashMap<String, (usize, Decimal)> = HashMap::new();
    for position in &snapshot.positions {
        let entry = buckets
            .entry(label_of(position))
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += position.value;
    }

    let mut result: Vec<AllocationBucket> = buckets
        .into_iter()
        .map(|(label, (count, value))| AllocationBucket {
            label,
            count,
            value,
            weight_pct: weight_fraction(value, snapshot.total_value) * 100.0,
        })
        .collect();
    result.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    result
}

/// Allocation by sector. Unmapped tickers fall into "Other".
pub fn calculate_sector_allocation(
    snapshot: &MergedSnapshot,
    resolver: &dyn SecurityResolver,
    reference: &ReferenceData,
) -> Vec<AllocationBucket> {
    allocate_by(snapshot, |position| {
        let security = resolver.resolve_merged(position);
        reference.sector_for(security.ticker.as_deref()).to_string()
    })
}

/// Allocation by coarse geography (US / International).
pub fn calculate_geography_allocation(
    snapshot: &MergedSnapshot,
    resolver: &dyn SecurityResolver,
    reference: &ReferenceData,
) -> Vec<AllocationBucket> {
    allocate_by(snapshot, |position| {
        let security = resolver.resolve_merged(position);
        reference.geography_of(security.ticker.as_deref()).to_string()
    })
}
