//! Interval intersection rules for a day partition.
//!
//! Two blocks conflict only when their start timestamps share the same civil
//! date and their intervals intersect compared at hour:minute granularity.
//! Seconds are deliberately ignored, and the comparison is strict, so a block
//! ending at minute M sits flush against one starting at minute M.

use crate::{store::entities::TimeBlock, utils::time::CivilTime};

fn minute_of_day(t: &CivilTime) -> i32 {
    t.hour * 60 + t.minute
}

fn same_civil_date(a: &CivilTime, b: &CivilTime) -> bool {
    a.year == b.year && a.month == b.month && a.day == b.day
}

pub fn blocks_conflict(a: &TimeBlock, b: &TimeBlock) -> bool {
    same_civil_date(&a.start_time, &b.start_time)
        && minute_of_day(&a.start_time) < minute_of_day(&b.end_time)
        && minute_of_day(&a.end_time) > minute_of_day(&b.start_time)
}

/// Candidate-against-set check run before every append. O(n) in the day's
/// block count.
pub fn conflicts_with_any(existing: &[TimeBlock], candidate: &TimeBlock) -> bool {
    existing.iter().any(|block| blocks_conflict(block, candidate))
}

/// All-pairs scan used to re-validate a loaded partition. O(n²), fine for the
/// handful of blocks a day realistically holds.
pub fn partition_has_overlap(blocks: &[TimeBlock]) -> bool {
    blocks
        .iter()
        .enumerate()
        .any(|(i, a)| blocks[i + 1..].iter().any(|b| blocks_conflict(a, b)))
}
