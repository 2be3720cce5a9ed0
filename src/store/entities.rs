//! Wire-level shapes for persisted blocks and the block-type catalog.
//!
//! Field names match the stored JSON documents exactly. A day partition is a
//! single JSON array of [TimeBlock], the catalog is a single JSON array of
//! [BlockType].

use serde::{Deserialize, Serialize};

use crate::utils::time::{span_between, BlockDuration, CivilTime};

/// Reserved block type seeded into every new catalog. Excluded from trend
/// and percentage output.
pub const SYSTEM_TYPE_ID: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockType {
    pub id: i32,
    pub name: String,
    pub color: Color,
}

impl BlockType {
    pub fn system() -> Self {
        Self {
            id: SYSTEM_TYPE_ID,
            name: "System".into(),
            color: Color {
                r: 20,
                g: 20,
                b: 200,
            },
        }
    }

    /// Catalog identity check: a collision on name, color triple or id makes
    /// the candidate a duplicate.
    pub fn duplicates(&self, other: &BlockType) -> bool {
        self.name == other.name || self.color == other.color || self.id == other.id
    }
}

/// One recorded activity interval, `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub start_time: CivilTime,
    pub end_time: CivilTime,
    pub block_type_id: i32,
    pub title: String,
}

impl TimeBlock {
    pub fn duration(&self) -> BlockDuration {
        span_between(&self.start_time, &self.end_time)
    }
}
