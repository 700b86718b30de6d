//! Raw and merged position records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A single raw line of a disclosure filing.
///
/// Several raw positions in one snapshot may share an identifier when the
/// filer reports multiple lots of the same security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Issuer name as filed (free text).
    pub name: String,

    /// CUSIP-like security identifier.
    #[serde(alias = "cusip")]
    pub identifier: String,

    /// Number of shares held.
    pub shares: Decimal,

    /// Reported market value.
    pub value: Decimal,

    /// Explicit ticker, when the filing or ingestion supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
}

impl Position {
    /// Creates a new position builder.
    #[must_use]
    pub fn builder() -> PositionBuilder {
        PositionBuilder::new()
    }

    /// Returns the explicit ticker if it is present and non-blank, trimmed.
    #[must_use]
    pub fn explicit_ticker(&self) -> Option<&str> {
        self.ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Builder for constructing a [`Position`].
#[derive(Debug, Clone, Default)]
pub struct PositionBuilder {
    name: Option<String>,
    identifier: Option<String>,
    shares: Option<Decimal>,
    value: Option<Decimal>,
    ticker: Option<String>,
}

impl PositionBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the issuer name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the security identifier.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets the share count.
    #[must_use]
    pub fn shares(mut self, shares: Decimal) -> Self {
        self.shares = Some(shares);
        self
    }

    /// Sets the reported value.
    #[must_use]
    pub fn value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the explicit ticker.
    #[must_use]
    pub fn ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Builds the position.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier, shares or value is missing, if the
    /// identifier is blank, or if shares or value are negative.
    pub fn build(self) -> CoreResult<Position> {
        let identifier = self
            .identifier
            .ok_or_else(|| CoreError::missing_field("identifier"))?;

        let shares = self
            .shares
            .ok_or_else(|| CoreError::missing_field("shares"))?;

        let value = self
            .value
            .ok_or_else(|| CoreError::missing_field("value"))?;

        if identifier.trim().is_empty() {
            return Err(CoreError::invalid_position(
                &identifier,
                "identifier cannot be blank",
            ));
        }

        if shares < Decimal::ZERO {
            return Err(CoreError::invalid_position(
                &identifier,
                "shares cannot be negative",
            ));
        }

        if value < Decimal::ZERO {
            return Err(CoreError::invalid_position(
                &identifier,
                "value cannot be negative",
            ));
        }

        Ok(Position {
            name: self.name.unwrap_or_default(),
            identifier,
            shares,
            value,
            ticker: self.ticker,
        })
    }
}

/// One security's aggregated position within a snapshot.
///
/// Shares and value are the sums of every raw lot with the same identifier;
/// name and explicit ticker come from the first lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPosition {
    /// Security identifier shared by all merged lots.
    pub identifier: String,

    /// Issuer name of the first lot.
    pub name: String,

    /// Explicit ticker of the first lot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,

    /// Total shares across lots.
    pub shares: Decimal,

    /// Total value across lots.
    pub value: Decimal,

    /// Number of raw lots merged into this record.
    pub lots: usize,
}

impl MergedPosition {
    /// Starts a merged record from the first lot of a security.
    #[must_use]
    pub fn from_lot(lot: &Position) -> Self {
        Self {
            identifier: lot.identifier.clone(),
            name: lot.name.clone(),
            ticker: lot.ticker.clone(),
            shares: lot.shares,
            value: lot.value,
            lots: 1,
        }
    }

    /// Adds another lot of the same security.
    pub fn absorb(&mut self, lot: &Position) {
        self.shares += lot.shares;
        self.value += lot.value;
        self.lots += 1;
    }

    /// Returns a raw position view of this record, for resolution.
    #[must_use]
    pub fn as_position(&self) -> Position {
        Position {
            name: self.name.clone(),
            identifier: self.identifier.clone(),
            shares: self.shares,
            value: self.value,
            ticker: self.ticker.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_valid() {
        let position = Position::builder()
            .name("APPLE INC")
            .identifier("037833100")
            .shares(dec!(1000))
            .value(dec!(195000))
            .ticker("AAPL")
            .build()
            .unwrap();

        assert_eq!(position.identifier, "037833100");
        assert_eq!(position.explicit_ticker(), Some("AAPL"));
    }

    #[test]
    fn test_builder_missing_fields() {
        let err = Position::builder()
            .shares(dec!(1))
            .value(dec!(1))
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::missing_field("identifier"));

        let err = Position::builder()
            .identifier("X")
            .value(dec!(1))
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::missing_field("shares"));
    }

    #[test]
    fn test_builder_rejects_negative() {
        let result = Position::builder()
            .identifier("037833100")
            .shares(dec!(-5))
            .value(dec!(10))
            .build();
        assert!(matches!(result, Err(CoreError::InvalidPosition { .. })));

        let result = Position::builder()
            .identifier("037833100")
            .shares(dec!(5))
            .value(dec!(-10))
            .build();
        assert!(matches!(result, Err(CoreError::InvalidPosition { .. })));
    }

    #[test]
    fn test_blank_ticker_is_ignored() {
        let position = Position::builder()
            .identifier("037833100")
            .shares(dec!(1))
            .value(dec!(1))
            .ticker("   ")
            .build()
            .unwrap();
        assert_eq!(position.explicit_ticker(), None);
    }

    #[test]
    fn test_merged_absorb() {
        let lot = Position::builder()
            .name("APPLE INC")
            .identifier("037833100")
            .shares(dec!(100))
            .value(dec!(1000))
            .build()
            .unwrap();
        let mut merged = MergedPosition::from_lot(&lot);
        merged.absorb(&Position {
            name: "APPLE INC COM".into(),
            ..lot.clone()
        });

        assert_eq!(merged.shares, dec!(200));
        assert_eq!(merged.value, dec!(2000));
        assert_eq!(merged.lots, 2);
        assert_eq!(merged.name, "APPLE INC");
    }

    #[test]
    fn test_deserialize_cusip_alias() {
        let json = r#"{"name":"APPLE INC","cusip":"037833100","shares":10,"value":1950}"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.identifier, "037833100");
        assert_eq!(position.shares, dec!(10));
        assert!(position.ticker.is_none());
    }
}
