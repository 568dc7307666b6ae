//! Object storage seam: `put(bytes) -> public URL`, `remove(URL)`.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage folder: {0}")]
    InvalidFolder(String),

    #[error("not a stored upload: {0}")]
    ForeignUrl(String),

    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `folder` and returns the URL clients fetch it from.
    async fn put(&self, folder: &str, extension: &str, bytes: Bytes)
        -> Result<String, StorageError>;

    /// Deletes a file previously returned by `put`. Already-missing files are not an error.
    async fn remove(&self, url: &str) -> Result<(), StorageError>;
}

/// Writes files below a local directory that the router serves statically.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// `{stem}.{extension}` as written by `put`.
fn is_safe_file_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, extension)) => is_safe_segment(stem) && is_safe_segment(extension),
        None => false,
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        folder: &str,
        extension: &str,
        bytes: Bytes,
    ) -> Result<String, StorageError> {
        if !is_safe_segment(folder) || !is_safe_segment(extension) {
            return Err(StorageError::InvalidFolder(format!("{folder}/*.{extension}")));
        }

        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(dir.join(&filename), &bytes).await?;

        tracing::info!(folder = %folder, file = %filename, size = bytes.len(), "stored upload");
        Ok(format!("{}/{}/{}", self.public_base, folder, filename))
    }

    async fn remove(&self, url: &str) -> Result<(), StorageError> {
        let relative = url
            .strip_prefix(self.public_base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
        let (folder, filename) = relative
            .split_once('/')
            .filter(|(folder, filename)| is_safe_segment(folder) && is_safe_file_name(filename))
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;

        match tokio::fs::remove_file(self.root.join(folder).join(filename)).await {
            Ok(()) => {
                tracing::info!(folder = %folder, file = %filename, "removed upload");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
