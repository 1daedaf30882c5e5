//! File Writer
//!
//! Thin layer over [`FileSystemAccess::write_file_atomic`]: parent
//! directories are created and the target only ever holds complete content.

use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{MirrorError, Result};

/// Write `content` to `path`, returning the number of bytes written.
#[instrument(skip(fs, content), fields(path = %path.display(), bytes = content.len()))]
pub async fn write(fs: &dyn FileSystemAccess, path: &Path, content: Bytes) -> Result<u64> {
    let bytes = content.len() as u64;
    fs.write_file_atomic(path, content)
        .await
        .map_err(|source| MirrorError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Wrote file");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioFileSystem;

    #[tokio::test]
    async fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let path = dir.path().join("a/b/c.txt");

        let bytes = write(&fs, &path, Bytes::from_static(b"hello")).await.unwrap();

        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_write_failure_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let err = write(&fs, &blocker.join("child.txt"), Bytes::from_static(b"y"))
            .await
            .unwrap_err();

        assert!(matches!(err, MirrorError::Write { .. }));
    }
}
