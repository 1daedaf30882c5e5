//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{is_partial_file, FileSystemAccess, PARTIAL_SUFFIX},
};
use bytes::Bytes;
use core_async::fs;
use core_async::io::AsyncWriteExt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// Tokio-based file system implementation
///
/// Provides async file I/O using `tokio::fs`; recursive listing runs
/// `walkdir` on the blocking pool.
#[derive(Debug, Default, Clone)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }

    /// Sibling path used while `target` is being written.
    fn partial_path(target: &Path) -> Result<PathBuf> {
        let parent = target.parent().ok_or_else(|| {
            BridgeError::OperationFailed(format!("{} has no parent directory", target.display()))
        })?;
        let file_name = target.file_name().ok_or_else(|| {
            BridgeError::OperationFailed(format!("{} has no file name", target.display()))
        })?;

        Ok(parent.join(format!(
            ".{}.{}{}",
            file_name.to_string_lossy(),
            Uuid::new_v4().simple(),
            PARTIAL_SUFFIX
        )))
    }

    async fn write_and_sync(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

fn walk_regular_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root_meta = std::fs::metadata(root).map_err(TokioFileSystem::map_io_error)?;
    if !root_meta.is_dir() {
        return Err(BridgeError::OperationFailed(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e
                    .into_io_error()
                    .map(BridgeError::Io)
                    .unwrap_or_else(|| {
                        BridgeError::OperationFailed(format!("cannot walk {}", root.display()))
                    }));
            }
            Err(e) => {
                // Unreadable subtrees are left out of the listing.
                warn!(error = %e, "Skipping unreadable entry during directory walk");
                continue;
            }
        };

        if entry.file_type().is_file() && !is_partial_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn is_file(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::map_io_error(e)),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .map_err(Self::map_io_error)?;
        debug!(path = ?path, "Created directory");
        Ok(())
    }

    async fn write_file_atomic(&self, path: &Path, data: Bytes) -> Result<()> {
        let partial = Self::partial_path(path)?;
        if let Some(parent) = partial.parent() {
            self.create_dir_all(parent).await?;
        }

        let written = match Self::write_and_sync(&partial, &data).await {
            Ok(()) => fs::rename(&partial, path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = ?partial, error = %cleanup, "Failed to remove partial file");
                }
            }
            return Err(Self::map_io_error(e));
        }

        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, "Deleted file");
        Ok(())
    }

    async fn list_files_recursive(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let files = core_async::task::spawn_blocking(move || walk_regular_files(&root))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("directory walk aborted: {}", e)))??;

        debug!(count = files.len(), "Listed files recursively");
        Ok(files)
    }
}
