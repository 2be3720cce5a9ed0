//! Records a user's day as non-overlapping time blocks tagged with a block
//! type, persists them one JSON document per calendar day, and derives
//! time-usage trends and percentage shares over arbitrary date ranges.
//!

pub mod analysis;
pub mod cli;
pub mod current;
pub mod error;
pub mod store;
pub mod utils;
