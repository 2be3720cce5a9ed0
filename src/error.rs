//! Error taxonomy for the core.
//!
//! Core modules return [CoreError] so callers can tell a rejected write from
//! corrupted data from plain I/O trouble. The CLI layer maps these to
//! user-facing messages; nothing here decides a transport-level response.

use thiserror::Error;

use crate::utils::time::CivilDate;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The candidate block intersects a block already stored on its day.
    /// The partition is left untouched.
    #[error("time block overlaps an existing block on {day}")]
    Overlap { day: CivilDate },

    /// A loaded partition already contains overlapping blocks. This only
    /// happens when the file was edited outside the store, and it is never
    /// repaired automatically.
    #[error("day partition {day} contains overlapping time blocks")]
    Integrity { day: CivilDate },

    /// A block type with the same name, color or id already exists.
    #[error("block type already exists: {0}")]
    DuplicateType(String),

    /// One of the scratch-state files holds something unparsable.
    #[error("invalid scratch state: {0}")]
    InvalidScratch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
