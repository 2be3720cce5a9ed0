//! Day-partitioned persistence for time blocks.
//!
//! Every calendar day owns one JSON document named `YYYY-MM-DD.json` holding
//! the ordered array of blocks recorded for that day. A block belongs to the
//! partition of its **start** date. Appends are optimistic
//! load-validate-write: correct for a single logical writer, with advisory
//! file locks as a best-effort seam for anything else.

use std::{
    future::Future,
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use crate::{
    error::{CoreError, CoreResult},
    store::overlap::{conflicts_with_any, partition_has_overlap},
    utils::time::{date_to_partition_name, CivilDate},
};

use super::entities::TimeBlock;

/// Interface for abstracting storage of day partitions.
pub trait DayStore {
    /// Retrieves all blocks recorded for a day. A day without a partition
    /// yields an empty list; a partition that fails the overlap re-validation
    /// is a hard [CoreError::Integrity].
    fn load_day(&self, date: CivilDate) -> impl Future<Output = CoreResult<Vec<TimeBlock>>> + Send;

    /// Validates the candidate against the day's existing blocks and, only if
    /// clear, persists the augmented partition.
    fn append_block(&self, block: TimeBlock) -> impl Future<Output = CoreResult<()>> + Send;

    /// Whether a partition document exists for the day yet.
    fn day_exists(&self, date: CivilDate) -> impl Future<Output = CoreResult<bool>> + Send;
}

impl<T: Deref> DayStore for T
where
    T::Target: DayStore,
{
    fn load_day(&self, date: CivilDate) -> impl Future<Output = CoreResult<Vec<TimeBlock>>> + Send {
        self.deref().load_day(date)
    }

    fn append_block(&self, block: TimeBlock) -> impl Future<Output = CoreResult<()>> + Send {
        self.deref().append_block(block)
    }

    fn day_exists(&self, date: CivilDate) -> impl Future<Output = CoreResult<bool>> + Send {
        self.deref().day_exists(date)
    }
}

/// The main realization of [DayStore], one JSON file per day under
/// `block_dir`. The directory is created lazily on the first write.
pub struct JsonDayStore {
    block_dir: PathBuf,
}

impl JsonDayStore {
    pub fn new(block_dir: PathBuf) -> Self {
        Self { block_dir }
    }

    fn partition_path(&self, date: CivilDate) -> PathBuf {
        self.block_dir.join(date_to_partition_name(date))
    }

    async fn read_partition(path: &Path) -> CoreResult<Vec<TimeBlock>> {
        debug!("Extracting {path:?}");
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut reader = file;
        let mut contents = Vec::new();
        let read_result = reader.read_to_end(&mut contents).await;
        reader.unlock_async().await?;
        read_result?;

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(vec![]);
        }
        Ok(serde_json::from_slice(&contents)?)
    }

    async fn write_partition(&self, date: CivilDate, blocks: &[TimeBlock]) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.block_dir).await?;

        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.partition_path(date))
            .await?;
        file.lock_exclusive()?;

        let mut buffer = serde_json::to_vec(blocks)?;
        buffer.push(b'\n');

        let write_result = async {
            file.write_all(&buffer).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        write_result?;
        Ok(())
    }
}

impl DayStore for JsonDayStore {
    async fn load_day(&self, date: CivilDate) -> CoreResult<Vec<TimeBlock>> {
        let blocks = Self::read_partition(&self.partition_path(date)).await?;
        if partition_has_overlap(&blocks) {
            return Err(CoreError::Integrity { day: date });
        }
        Ok(blocks)
    }

    async fn append_block(&self, block: TimeBlock) -> CoreResult<()> {
        let date = block.start_time.date();
        let mut blocks = self.load_day(date).await?;
        if conflicts_with_any(&blocks, &block) {
            return Err(CoreError::Overlap { day: date });
        }
        blocks.push(block);
        self.write_partition(date, &blocks).await
    }

    async fn day_exists(&self, date: CivilDate) -> CoreResult<bool> {
        Ok(tokio::fs::try_exists(self.partition_path(date)).await?)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::utils::{logging::TEST_LOGGING, time::CivilTime};

    const DAY: CivilDate = CivilDate {
        year: 2024,
        month: 3,
        day: 1,
    };

    fn block(start_hour: i32, end_hour: i32) -> TimeBlock {
        TimeBlock {
            start_time: CivilTime::new(DAY.year, DAY.month, DAY.day, start_hour, 0, 0),
            end_time: CivilTime::new(DAY.year, DAY.month, DAY.day, end_hour, 0, 0),
            block_type_id: 1,
            title: "work".into(),
        }
    }

    #[tokio::test]
    async fn append_then_load_round_trips() -> CoreResult<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        store.append_block(block(9, 10)).await?;
        store.append_block(block(10, 11)).await?;

        let blocks = store.load_day(DAY).await?;
        assert_eq!(blocks, vec![block(9, 10), block(10, 11)]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_day_is_empty_not_an_error() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        assert!(store.load_day(DAY).await?.is_empty());
        assert!(!store.day_exists(DAY).await?);
        Ok(())
    }

    #[tokio::test]
    async fn overlapping_append_is_rejected_and_partition_unchanged() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        store.append_block(block(9, 11)).await?;
        let result = store.append_block(block(10, 12)).await;
        assert!(matches!(result, Err(CoreError::Overlap { day }) if day == DAY));

        assert_eq!(store.load_day(DAY).await?, vec![block(9, 11)]);
        Ok(())
    }

    #[tokio::test]
    async fn boundary_adjacent_blocks_are_accepted() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        store.append_block(block(9, 10)).await?;
        store.append_block(block(10, 11)).await?;

        assert_eq!(store.load_day(DAY).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn partition_is_keyed_by_start_date() -> CoreResult<()> {
        let dir = tempdir()?;
        let store = JsonDayStore::new(dir.path().join("blocks"));

        let crossing = TimeBlock {
            start_time: CivilTime::new(2024, 3, 1, 23, 0, 0),
            end_time: CivilTime::new(2024, 3, 2, 1, 0, 0),
            block_type_id: 1,
            title: "late".into(),
        };
        store.append_block(crossing.clone()).await?;

        assert_eq!(store.load_day(DAY).await?, vec![crossing]);
        assert!(store.load_day(CivilDate::new(2024, 3, 2)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn externally_corrupted_partition_fails_integrity() -> CoreResult<()> {
        let dir = tempdir()?;
        let block_dir = dir.path().join("blocks");
        std::fs::create_dir_all(&block_dir)?;

        let overlapping = vec![block(9, 11), block(10, 12)];
        std::fs::write(
            block_dir.join("2024-03-01.json"),
            serde_json::to_vec(&overlapping)?,
        )?;

        let store = JsonDayStore::new(block_dir);
        let result = store.load_day(DAY).await;
        assert!(matches!(result, Err(CoreError::Integrity { day }) if day == DAY));

        // An append against the corrupted day must fail the same way.
        let result = store.append_block(block(14, 15)).await;
        assert!(matches!(result, Err(CoreError::Integrity { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_surfaces_verbatim() -> CoreResult<()> {
        let dir = tempdir()?;
        let block_dir = dir.path().join("blocks");
        std::fs::create_dir_all(&block_dir)?;
        std::fs::write(block_dir.join("2024-03-01.json"), b"{not json")?;

        let store = JsonDayStore::new(block_dir);
        assert!(matches!(store.load_day(DAY).await, Err(CoreError::Json(_))));
        Ok(())
    }

    #[tokio::test]
    async fn stored_document_is_a_single_json_array() -> CoreResult<()> {
        let dir = tempdir()?;
        let block_dir = dir.path().join("blocks");
        let store = JsonDayStore::new(block_dir.clone());

        store.append_block(block(9, 10)).await?;

        let raw = std::fs::read_to_string(block_dir.join("2024-03-01.json"))?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)?;
        assert!(parsed.is_array());
        assert_eq!(parsed[0]["startTime"]["hour"], 9);
        Ok(())
    }
}
