//! # Holdwise Core
//!
//! Domain types for institutional holdings disclosures (13F-style filings).
//!
//! This crate provides the values the analytics engine consumes:
//!
//! - **Periods**: Calendar-quarter labels with chronological ordering
//! - **Positions**: Raw filing lines and their merged per-security form
//! - **Snapshots**: One investor's filing for one period
//! - **Investors**: Identity plus ordered snapshot history
//! - **Security master**: Identifier → ticker/name lookup
//! - **Reference data**: Sector and geography tables
//! - **Snapshot sources**: The collaborator trait supplying investors
//!
//! ## Design Philosophy
//!
//! - **Read-only inputs**: Nothing here is mutated by the engine
//! - **Exact money**: Shares and values are `Decimal`, ratios are `f64`
//! - **Injected tables**: Security master and reference data are plain values
//!
//! ## Example
//!
//! ```rust
//! use holdwise_core::prelude::*;
//!
//! let position = Position::builder()
//!     .name("APPLE INC")
//!     .identifier("037833100")
//!     .shares(dec!(1000))
//!     .value(dec!(195000))
//!     .build()
//!     .unwrap();
//!
//! let period: Period = "Q4 2024".parse().unwrap();
//! assert_eq!(period.previous().to_string(), "Q3 2024");
//! assert_eq!(position.shares, dec!(1000));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod reference;
pub mod source;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use reference::{Geography, ReferenceData, OTHER_SECTOR};
pub use source::{collect_investors, Dataset, SnapshotSource};
pub use types::{
    clean_display_name, normalize_identifier, Investor, MergedPosition, Period, PeriodSelection,
    Position, PositionBuilder, ResolutionSource, SecurityMaster, SecurityRecord, SecurityRef,
    Snapshot,
};

/// Prelude module for convenient imports.
///
/// ```rust
/// use holdwise_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};

    pub use crate::types::{
        Investor, MergedPosition, Period, PeriodSelection, Position, PositionBuilder,
        ResolutionSource, SecurityMaster, SecurityRecord, SecurityRef, Snapshot,
    };

    pub use crate::reference::{Geography, ReferenceData};
    pub use crate::source::{collect_investors, Dataset, SnapshotSource};

    pub use chrono::NaiveDate;
    pub use rust_decimal::Decimal;
    pub use rust_decimal_macros::dec;
}
