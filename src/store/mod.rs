//!  Storage is organized through [day_store::JsonDayStore] and
//!  [catalog::JsonTypeCatalog].
//!  The basic idea is:
//!   - There is a directory with one JSON document per UTC day, keyed by the
//!     start date of the blocks it holds.
//!   - A partition is only ever appended to, and every append re-validates
//!     the non-overlap invariant.
//!   - The block-type catalog is a single ordered JSON array next to it.

pub mod catalog;
pub mod day_store;
pub mod entities;
pub mod overlap;
pub mod rollover;
