//! Domain types for holdings data.
//!
//! - [`Period`]: A calendar quarter identifying a disclosure period
//! - [`Position`]: A raw filing line, possibly one of several lots
//! - [`MergedPosition`]: One security's lots summed within a snapshot
//! - [`Snapshot`]: One investor's filing for one period
//! - [`Investor`]: Identity plus ordered snapshot history
//! - [`SecurityRef`] / [`SecurityMaster`]: Resolved identity and lookup table

mod investor;
mod period;
mod position;
mod security;
mod snapshot;

pub use investor::Investor;
pub use period::{Period, PeriodSelection};
pub use position::{MergedPosition, Position, PositionBuilder};
pub use security::{
    clean_display_name, normalize_identifier, ResolutionSource, SecurityMaster, SecurityRecord,
    SecurityRef,
};
pub use snapshot::Snapshot;
