//! Security resolution.
//!
//! Maps raw filing lines to a canonical [`SecurityRef`]. Resolution never
//! fails: when nothing better is known the identifier itself becomes the
//! pseudo-ticker.

use holdwise_core::types::{
    clean_display_name, normalize_identifier, MergedPosition, Position, ResolutionSource,
    SecurityMaster, SecurityRef,
};
use log::debug;

/// Resolves positions to securities.
pub trait SecurityResolver: Send + Sync {
    /// Resolves a raw position.
    fn resolve(&self, position: &Position) -> SecurityRef;

    /// Resolves a merged position using its first lot's name and ticker.
    fn resolve_merged(&self, position: &MergedPosition) -> SecurityRef {
        self.resolve(&position.as_position())
    }
}

/// Resolver backed by a [`SecurityMaster`].
///
/// Order, first match wins:
/// 1. The position's own non-blank ticker
/// 2. Identifier lookup in the master
/// 3. Case-insensitive name containment against master names
/// 4. The identifier with trailing zero-padding removed
#[derive(Debug, Clone, Default)]
pub struct MasterResolver {
    master: SecurityMaster,
}

impl MasterResolver {
    /// Creates a resolver over a security master.
    #[must_use]
    pub fn new(master: SecurityMaster) -> Self {
        Self { master }
    }

    /// The underlying master table.
    #[must_use]
    pub fn master(&self) -> &SecurityMaster {
        &self.master
    }
}

impl SecurityResolver for MasterResolver {
    fn resolve(&self, position: &Position) -> SecurityRef {
        let identifier = normalize_identifier(&position.identifier);
        let filed_name = clean_display_name(&position.name);

        if let Some(ticker) = position.explicit_ticker() {
            return SecurityRef {
                identifier,
                ticker: Some(ticker.to_string()),
                name: filed_name,
                source: ResolutionSource::Explicit,
            };
        }

        if let Some(record) = self.master.lookup(&identifier) {
            return SecurityRef {
                identifier,
                ticker: Some(record.ticker.clone()),
                name: record.name.clone(),
                source: ResolutionSource::Master,
            };
        }

        if let Some(record) = self.master.find_by_name(&filed_name) {
            return SecurityRef {
                identifier,
                ticker: Some(record.ticker.clone()),
                name: record.name.clone(),
                source: ResolutionSource::NameMatch,
            };
        }

        let stripped = identifier.trim_end_matches('0');
        let ticker = (!stripped.is_empty()).then(|| stripped.to_string());
        debug!(
            "no ticker for '{}' ({}), falling back to {}",
            filed_name,
            identifier,
            ticker.as_deref().unwrap_or("identifier key")
        );
        SecurityRef {
            identifier,
            ticker,
            name: filed_name,
            source: ResolutionSource::Fallback,
        }
    }
}
