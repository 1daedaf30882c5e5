//! Storage and File System Abstractions
//!
//! Provides the platform-agnostic filesystem trait the mirror engine uses to
//! snapshot, populate and prune the mirror root.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Suffix of the temporary files written by
/// [`FileSystemAccess::write_file_atomic`].
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Length of the hex token between the target name and [`PARTIAL_SUFFIX`].
pub const PARTIAL_TOKEN_LEN: usize = 32;

/// File system access trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn store(fs: &dyn FileSystemAccess, root: &Path, data: Bytes) -> Result<()> {
///     fs.write_file_atomic(&root.join("nested/file.bin"), data).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if `path` exists and is a regular file
    async fn is_file(&self, path: &Path) -> Result<bool>;

    /// Create a directory and all parent directories if they don't exist
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Write `data` to `path` so that readers observe either the previous
    /// state or the complete new content, never a partial file.
    ///
    /// Missing parent directories are created. The content first goes to a
    /// sibling `.<name>.<token>.partial` file (see [`is_partial_file`]). On
    /// failure no file is left at `path` and the temporary file is removed.
    async fn write_file_atomic(&self, path: &Path, data: Bytes) -> Result<()>;

    /// Delete a file
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Recursively list every regular file below `root`.
    ///
    /// Returns an `Io` error of kind `NotFound` when `root` does not exist.
    /// Temporary files matching [`is_partial_file`] are skipped.
    async fn list_files_recursive(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Whether `path` names an in-progress temporary write, i.e. matches
/// `.<name>.<32 hex digits>.partial` exactly.
///
/// Ordinary files that merely end in `.partial` are mirror content.
pub fn is_partial_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(stem) = name
        .strip_prefix('.')
        .and_then(|n| n.strip_suffix(PARTIAL_SUFFIX))
    else {
        return false;
    };

    match stem.rsplit_once('.') {
        Some((target, token)) => {
            !target.is_empty()
                && token.len() == PARTIAL_TOKEN_LEN
                && token.bytes().all(|b| b.is_ascii_hexdigit())
        }
        None => false,
    }
}
