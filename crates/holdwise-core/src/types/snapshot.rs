//! Disclosure snapshots.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Period, Position};
use crate::error::{CoreError, CoreResult};

fn default_form() -> String {
    "13F-HR".to_string()
}

/// One investor's reported portfolio for one disclosure period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The quarter this filing reports.
    pub period: Period,

    /// Date the filing was made.
    pub filing_date: NaiveDate,

    /// Filing form type.
    #[serde(default = "default_form")]
    pub form: String,

    /// Filing accession identifier.
    #[serde(default)]
    pub accession: String,

    /// Total value as stated on the filing.
    #[serde(default)]
    pub total_value: Decimal,

    /// Raw position records, possibly with repeated identifiers.
    #[serde(default)]
    pub positions: Vec<Position>,
}

impl Snapshot {
    /// Creates an empty snapshot for a period and filing date.
    #[must_use]
    pub fn new(period: Period, filing_date: NaiveDate) -> Self {
        Self {
            period,
            filing_date,
            form: default_form(),
            accession: String::new(),
            total_value: Decimal::ZERO,
            positions: Vec::new(),
        }
    }

    /// Sets the form type.
    #[must_use]
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = form.into();
        self
    }

    /// Sets the accession identifier.
    #[must_use]
    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = accession.into();
        self
    }

    /// Sets the filed total value.
    #[must_use]
    pub fn with_total_value(mut self, total_value: Decimal) -> Self {
        self.total_value = total_value;
        self
    }

    /// Sets the positions. The filed total becomes their sum unless one was set.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        if self.total_value.is_zero() {
            self.total_value = self.positions_total();
        }
        self
    }

    /// Adds a single position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    /// Sum of the raw position values.
    #[must_use]
    pub fn positions_total(&self) -> Decimal {
        self.positions.iter().map(|p| p.value).sum()
    }

    /// Returns true if the snapshot has no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks that every position is well formed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPosition` for a blank identifier or negative
    /// shares/value, and `CoreError::InvalidSnapshot` for a negative total.
    pub fn validate(&self) -> CoreResult<()> {
        if self.total_value < Decimal::ZERO {
            return Err(CoreError::invalid_snapshot(
                self.period.to_string(),
                "total value cannot be negative",
            ));
        }
        for position in &self.positions {
            if position.identifier.trim().is_empty() {
                return Err(CoreError::invalid_position(
                    &position.name,
                    "identifier cannot be blank",
                ));
            }
            if position.shares < Decimal::ZERO || position.value < Decimal::ZERO {
                return Err(CoreError::invalid_position(
                    &position.identifier,
                    "shares and value cannot be negative",
                ));
            }
        }
        Ok(())
    }
}
