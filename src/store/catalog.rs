//! The block-type catalog, one ordered JSON array on disk.
//!
//! The catalog is append-only: entries are never updated or deleted. First
//! access seeds the reserved System entry so id 0 is always present.

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::io::ErrorKind;
use tracing::debug;

use crate::{
    error::{CoreError, CoreResult},
    store::entities::{BlockType, Color},
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TypeCatalog: Send + Sync {
    /// All catalog entries in stored order, seeding the System entry when the
    /// catalog does not exist yet.
    async fn load(&self) -> CoreResult<Vec<BlockType>>;

    /// Appends a new type, assigning the next free id. Rejects a candidate
    /// whose name or color collides with an existing entry.
    async fn append(&self, name: String, color: Color) -> CoreResult<BlockType>;
}

pub struct JsonTypeCatalog {
    catalog_path: PathBuf,
}

impl JsonTypeCatalog {
    pub fn new(catalog_path: PathBuf) -> Self {
        Self { catalog_path }
    }

    async fn write_entries(&self, entries: &[BlockType]) -> CoreResult<()> {
        if let Some(parent) = self.catalog_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut buffer = serde_json::to_vec(entries)?;
        buffer.push(b'\n');
        tokio::fs::write(&self.catalog_path, buffer).await?;
        Ok(())
    }
}

#[async_trait]
impl TypeCatalog for JsonTypeCatalog {
    async fn load(&self) -> CoreResult<Vec<BlockType>> {
        match tokio::fs::read(&self.catalog_path).await {
            Ok(contents) => Ok(serde_json::from_slice(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Seeding block type catalog at {:?}", self.catalog_path);
                let seeded = vec![BlockType::system()];
                self.write_entries(&seeded).await?;
                Ok(seeded)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn append(&self, name: String, color: Color) -> CoreResult<BlockType> {
        let mut entries = self.load().await?;

        // Ids are never reused, even if the file was edited out-of-band, so
        // the next id comes from the highest stored id rather than the
        // catalog length.
        let next_id = entries.iter().map(|entry| entry.id).max().unwrap_or(-1) + 1;
        let candidate = BlockType {
            id: next_id,
            name,
            color,
        };

        if entries.iter().any(|entry| entry.duplicates(&candidate)) {
            return Err(CoreError::DuplicateType(candidate.name));
        }

        entries.push(candidate.clone());
        self.write_entries(&entries).await?;
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn color(r: i32, g: i32, b: i32) -> Color {
        Color { r, g, b }
    }

    #[tokio::test]
    async fn first_access_seeds_system_entry() -> CoreResult<()> {
        let dir = tempdir()?;
        let catalog = JsonTypeCatalog::new(dir.path().join("blocktypes.json"));

        let entries = catalog.load().await?;
        assert_eq!(entries, vec![BlockType::system()]);

        // The seed is persisted, not just returned.
        let raw = std::fs::read_to_string(dir.path().join("blocktypes.json"))?;
        assert!(raw.contains("\"System\""));
        Ok(())
    }

    #[tokio::test]
    async fn appended_types_get_increasing_ids() -> CoreResult<()> {
        let dir = tempdir()?;
        let catalog = JsonTypeCatalog::new(dir.path().join("blocktypes.json"));

        let work = catalog.append("work".into(), color(200, 30, 30)).await?;
        let rest = catalog.append("rest".into(), color(30, 200, 30)).await?;
        assert_eq!(work.id, 1);
        assert_eq!(rest.id, 2);

        let entries = catalog.load().await?;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], rest);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_or_color_is_rejected() -> CoreResult<()> {
        let dir = tempdir()?;
        let catalog = JsonTypeCatalog::new(dir.path().join("blocktypes.json"));

        catalog.append("work".into(), color(200, 30, 30)).await?;

        let by_name = catalog.append("work".into(), color(1, 2, 3)).await;
        assert!(matches!(by_name, Err(CoreError::DuplicateType(_))));

        let by_color = catalog.append("other".into(), color(200, 30, 30)).await;
        assert!(matches!(by_color, Err(CoreError::DuplicateType(_))));

        assert_eq!(catalog.load().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn ids_stay_monotonic_after_external_edits() -> CoreResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("blocktypes.json");
        let edited = vec![
            BlockType::system(),
            BlockType {
                id: 5,
                name: "imported".into(),
                color: color(9, 9, 9),
            },
        ];
        std::fs::write(&path, serde_json::to_vec(&edited)?)?;

        let catalog = JsonTypeCatalog::new(path);
        let appended = catalog.append("fresh".into(), color(1, 1, 1)).await?;
        assert_eq!(appended.id, 6);
        Ok(())
    }
}
