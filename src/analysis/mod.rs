//! Time-usage aggregation over a date range.
//!
//! The engine walks every day in the range, buckets elapsed time by block
//! type and emits per-day trends plus range-wide percentage shares aligned
//! with the catalog. The System type is skipped for trends but keeps its slot
//! in the percentage array so positions line up with the catalog sorted by
//! id.

use std::{collections::HashMap, future, pin::pin};

use futures::{stream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    error::CoreResult,
    store::{catalog::TypeCatalog, day_store::DayStore, entities::SYSTEM_TYPE_ID},
    utils::time::{BlockDuration, CivilTime},
};

/// Time spent on one block type during one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub day: CivilTime,
    #[serde(rename = "timeSpent")]
    pub time_spent: BlockDuration,
    #[serde(rename = "blockTypeID")]
    pub block_type_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub percentages: Vec<f64>,
    pub trends: Vec<Trend>,
}

/// Returns a stream of day starts from `start` (inclusive) while strictly
/// before `end`, stepping 24 hours on the linear time axis.
fn day_starts(start: CivilTime, end: CivilTime) -> impl Stream<Item = CivilTime> {
    stream::unfold(start, move |current| {
        future::ready(if current.before(&end) {
            Some((current, current.add(BlockDuration::from_hours(24))))
        } else {
            None
        })
    })
}

/// Runs the aggregation over `[start, end)` on the instant axis. Callers
/// analyzing whole days pass `start` at 00:00:00 and `end` at 23:59:59, which
/// makes the range inclusive of the end day.
///
/// A partition that fails integrity re-validation aborts the whole analysis;
/// there are no partial results.
#[instrument(skip(store, catalog))]
pub async fn analyze(
    store: &impl DayStore,
    catalog: &impl TypeCatalog,
    start: CivilTime,
    end: CivilTime,
) -> CoreResult<Analysis> {
    let mut types = catalog.load().await?;
    types.sort_by_key(|block_type| block_type.id);

    let mut trends = Vec::new();
    let mut days = pin!(day_starts(start, end));
    while let Some(day) = days.next().await {
        let blocks = store.load_day(day.date()).await?;
        for block_type in &types {
            if block_type.id == SYSTEM_TYPE_ID {
                continue;
            }
            let time_spent = blocks
                .iter()
                .filter(|block| block.block_type_id == block_type.id)
                .fold(BlockDuration::default(), |sum, block| {
                    sum.add(block.duration())
                });
            trends.push(Trend {
                day: day.date().midnight(),
                time_spent,
                block_type_id: block_type.id,
            });
        }
    }

    let mut total_by_type = HashMap::<i32, BlockDuration>::new();
    for trend in &trends {
        let entry = total_by_type.entry(trend.block_type_id).or_default();
        *entry = entry.add(trend.time_spent);
    }

    let grand_total: i64 = total_by_type
        .values()
        .map(BlockDuration::total_seconds)
        .sum();

    // Zero recorded time means every share is zero instead of NaN.
    let percentages = types
        .iter()
        .map(|block_type| {
            if grand_total == 0 {
                return 0.0;
            }
            let total = total_by_type
                .get(&block_type.id)
                .map(BlockDuration::total_seconds)
                .unwrap_or(0);
            total as f64 / grand_total as f64 * 100.0
        })
        .collect();

    Ok(Analysis {
        percentages,
        trends,
    })
}
