//! Open-start continuation across midnight.
//!
//! A client that only knows when a block *ended* submits it with the
//! [OPEN_START] sentinel as its start. The block then continues from wherever
//! the previous day left off: the previous day is closed out with a filler
//! block up to 23:59:59, a zero-length System marker opens the new day, and
//! the submitted block starts at midnight of its end date.

use tracing::debug;

use crate::{
    error::CoreResult,
    store::{
        day_store::DayStore,
        entities::{TimeBlock, SYSTEM_TYPE_ID},
    },
    utils::time::CivilTime,
};

/// Start timestamp meaning "continue from the previous block".
pub const OPEN_START: CivilTime = CivilTime {
    year: 1945,
    month: 1,
    day: 1,
    hour: 1,
    minute: 1,
    second: 1,
};

/// Appends `block`, resolving the [OPEN_START] sentinel first. Returns the
/// block as persisted.
pub async fn append_resolved(store: &impl DayStore, mut block: TimeBlock) -> CoreResult<TimeBlock> {
    if block.start_time == OPEN_START {
        block = resolve_open_start(store, block).await?;
    }
    store.append_block(block.clone()).await?;
    Ok(block)
}

async fn resolve_open_start(store: &impl DayStore, mut block: TimeBlock) -> CoreResult<TimeBlock> {
    let previous_day = block.end_time.previous_day().date();
    let previous_blocks = store.load_day(previous_day).await?;

    let Some(last) = previous_blocks.last() else {
        // Nothing to continue from: collapse to a zero-length block.
        debug!("Open start with empty previous day {previous_day}");
        block.start_time = block.end_time;
        return Ok(block);
    };

    // Close out the previous day from its last block to the final second.
    // A last block that already runs past midnight leaves nothing to fill,
    // and a filler built from its end would be a reversed interval landing in
    // the new day's partition.
    let day_end = previous_day.last_second();
    if last.end_time.date() == previous_day && last.end_time.before(&day_end) {
        let filler = TimeBlock {
            start_time: last.end_time,
            end_time: day_end,
            block_type_id: block.block_type_id,
            title: block.title.clone(),
        };
        store.append_block(filler).await?;
    }

    // A zero-length System marker opens the new day.
    let midnight = block.end_time.date().midnight();
    store
        .append_block(TimeBlock {
            start_time: midnight,
            end_time: midnight,
            block_type_id: SYSTEM_TYPE_ID,
            title: "New Day".into(),
        })
        .await?;

    block.start_time = midnight;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::{
        store::day_store::JsonDayStore,
        utils::time::CivilDate,
    };

    fn block(start: CivilTime, end: CivilTime, type_id: i32, title: &str) -> TimeBlock {
        TimeBlock {
            start_time: start,
            end_time: end,
            block_type_id: type_id,
            title: title.into(),
        }
    }

    #[tokio::test]
    async fn open_start_continues_from_previous_day() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        store
            .append_block(block(
                CivilTime::new(2024, 2, 29, 20, 0, 0),
                CivilTime::new(2024, 2, 29, 21, 30, 0),
                1,
                "evening",
            ))
            .await?;

        let submitted = block(OPEN_START, CivilTime::new(2024, 3, 1, 8, 0, 0), 2, "sleep");
        let persisted = append_resolved(&store, submitted).await?;

        assert_eq!(persisted.start_time, CivilTime::midnight(2024, 3, 1));

        let previous = store.load_day(CivilDate::new(2024, 2, 29)).await?;
        assert_eq!(previous.len(), 2);
        assert_eq!(previous[1].start_time, CivilTime::new(2024, 2, 29, 21, 30, 0));
        assert_eq!(previous[1].end_time, CivilTime::new(2024, 2, 29, 23, 59, 59));
        assert_eq!(previous[1].block_type_id, 2);

        let today = store.load_day(CivilDate::new(2024, 3, 1)).await?;
        assert_eq!(today.len(), 2);
        assert_eq!(today[0].block_type_id, SYSTEM_TYPE_ID);
        assert_eq!(today[0].title, "New Day");
        assert!(today[0].duration().is_zero());
        assert_eq!(today[1], persisted);
        Ok(())
    }

    #[tokio::test]
    async fn midnight_crossing_predecessor_gets_no_filler() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        // Stored under 03-01 per start-date keying, but it already runs into
        // 03-02, so there is no gap left to fill.
        store
            .append_block(block(
                CivilTime::new(2024, 3, 1, 23, 0, 0),
                CivilTime::new(2024, 3, 2, 1, 0, 0),
                1,
                "late",
            ))
            .await?;

        let submitted = block(OPEN_START, CivilTime::new(2024, 3, 2, 8, 0, 0), 2, "sleep");
        let persisted = append_resolved(&store, submitted).await?;
        assert_eq!(persisted.start_time, CivilTime::midnight(2024, 3, 2));

        let previous = store.load_day(CivilDate::new(2024, 3, 1)).await?;
        assert_eq!(previous.len(), 1);

        let today = store.load_day(CivilDate::new(2024, 3, 2)).await?;
        assert_eq!(today.len(), 2);
        assert_eq!(today[0].title, "New Day");
        assert_eq!(today[1], persisted);
        assert!(today
            .iter()
            .all(|b| !b.end_time.before(&b.start_time)));
        Ok(())
    }

    #[tokio::test]
    async fn open_start_with_empty_previous_day_collapses() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        let submitted = block(OPEN_START, CivilTime::new(2024, 3, 1, 8, 0, 0), 2, "sleep");
        let persisted = append_resolved(&store, submitted).await?;

        assert_eq!(persisted.start_time, persisted.end_time);
        assert_eq!(store.load_day(CivilDate::new(2024, 3, 1)).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn explicit_start_passes_straight_through() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        let submitted = block(
            CivilTime::new(2024, 3, 1, 9, 0, 0),
            CivilTime::new(2024, 3, 1, 10, 0, 0),
            1,
            "work",
        );
        let persisted = append_resolved(&store, submitted.clone()).await?;
        assert_eq!(persisted, submitted);
        assert_eq!(store.load_day(CivilDate::new(2024, 3, 1)).await?, vec![submitted]);
        Ok(())
    }
}
