use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use uuid::Uuid;

/// A file part received from a client, before it is written anywhere.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: Option<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension of the client filename including the dot, taken after the
    /// last `.`. Anything that is not plain alphanumeric is dropped so the
    /// name can never leave the base directory.
    fn extension(&self) -> Option<&str> {
        let name = self.filename.as_deref()?;
        let dot = name.rfind('.')?;
        let ext = &name[dot + 1..];
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(&name[dot..])
    }
}

/// Stores uploaded files flat under one base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes `file` as `{prefix}_{owner_id}{.ext}` and returns that name.
    /// The base directory is created on first use.
    pub async fn store(&self, file: &UploadedFile, owner_id: Uuid, prefix: &str) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let filename = format!("{prefix}_{owner_id}{}", file.extension().unwrap_or(""));
        tokio::fs::write(self.resolve(&filename), &file.bytes).await?;

        tracing::debug!(filename = %filename, size = file.bytes.len(), "file stored");
        Ok(filename)
    }

    /// `true` only when a file was there and is now gone. Failures are
    /// logged and reported as `false`.
    pub async fn delete(&self, filename: &str) -> bool {
        match tokio::fs::remove_file(self.resolve(filename)).await {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!(filename = %filename, "failed to delete stored file: {e}");
                false
            }
        }
    }

    pub async fn exists(&self, filename: &str) -> bool {
        tokio::fs::try_exists(self.resolve(filename))
            .await
            .unwrap_or(false)
    }

    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.base_dir.join(filename)
    }
}
