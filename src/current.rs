//! "Current block" scratch state.
//!
//! Two single-value text files the UI polls between writes. They sit outside
//! the consistency model: no validation against the catalog or the day
//! partitions happens here.

use std::path::PathBuf;

use tokio::io::ErrorKind;

use crate::error::{CoreError, CoreResult};

const NAME_FILE: &str = "currentblockname.txt";
const TYPE_FILE: &str = "currentblocktype.txt";

const DEFAULT_NAME: &str = "Setting up server";

pub struct CurrentBlock {
    dir: PathBuf,
}

impl CurrentBlock {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    async fn read_or_seed(&self, file: &str, seed: &str) -> CoreResult<String> {
        let path = self.dir.join(file);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&self.dir).await?;
                tokio::fs::write(&path, seed).await?;
                Ok(seed.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, file: &str, value: &str) -> CoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(file), value).await?;
        Ok(())
    }

    pub async fn name(&self) -> CoreResult<String> {
        self.read_or_seed(NAME_FILE, DEFAULT_NAME).await
    }

    pub async fn set_name(&self, name: &str) -> CoreResult<()> {
        self.write(NAME_FILE, name).await
    }

    pub async fn type_id(&self) -> CoreResult<i32> {
        let raw = self.read_or_seed(TYPE_FILE, "0").await?;
        raw.trim()
            .parse()
            .map_err(|_| CoreError::InvalidScratch(format!("{TYPE_FILE} holds {raw:?}")))
    }

    pub async fn set_type_id(&self, id: i32) -> CoreResult<()> {
        self.write(TYPE_FILE, &id.to_string()).await
    }
}
