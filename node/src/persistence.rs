// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Where a store's document lives.
//!
//! A target holds exactly one serialized document. [`FileTarget`] replaces it
//! atomically: the bytes go to a sibling `.tmp` file which is fsynced and then
//! renamed over the real path, so a reader sees either the old document or
//! the new one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PersistTarget: Send + Sync + 'static {
    /// Location for log lines.
    fn describe(&self) -> String;

    /// Reads the document. `Ok(None)` if nothing was ever written.
    fn load(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replaces the document.
    async fn write(&self, bytes: Vec<u8>) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PersistTarget for FileTarget {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, bytes: Vec<u8>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.tmp_path();
        let written = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            // Leave no half-written sibling behind
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}
