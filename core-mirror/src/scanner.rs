//! Local State Scanner
//!
//! Point-in-time snapshot of the mirror root. Every scanned file starts out
//! as a deletion candidate; the cycle clears the flag for each path the
//! remote listing accounts for.

use bridge_traits::storage::FileSystemAccess;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{MirrorError, Result};

#[derive(Debug, Default, Clone)]
pub struct LocalSnapshot {
    /// path -> still a deletion candidate
    entries: HashMap<PathBuf, bool>,
}

impl LocalSnapshot {
    /// Walk `root` and record every regular file as a deletion candidate.
    ///
    /// A missing root yields an empty snapshot.
    #[instrument(skip(fs), fields(root = %root.display()))]
    pub async fn scan(fs: &dyn FileSystemAccess, root: &Path) -> Result<Self> {
        let files = match fs.list_files_recursive(root).await {
            Ok(files) => files,
            Err(e) if e.is_not_found() => {
                debug!("Mirror root does not exist yet");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(MirrorError::Scan {
                    root: root.to_path_buf(),
                    source,
                })
            }
        };

        debug!(files = files.len(), "Scanned mirror root");
        Ok(Self {
            entries: files.into_iter().map(|path| (path, true)).collect(),
        })
    }

    /// Record `path` as accounted for by the remote listing.
    ///
    /// Paths not seen by the scan are inserted so later lookups agree.
    pub fn mark_observed(&mut self, path: &Path) {
        self.entries.insert(path.to_path_buf(), false);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_candidate(&self, path: &Path) -> bool {
        self.entries.get(path).copied().unwrap_or(false)
    }

    /// Paths still flagged for deletion, sorted.
    pub fn deletion_candidates(&self) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = self
            .entries
            .iter()
            .filter(|(_, candidate)| **candidate)
            .map(|(path, _)| path.clone())
            .collect();
        candidates.sort();
        candidates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioFileSystem;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();

        let snapshot = LocalSnapshot::scan(&fs, &dir.path().join("absent"))
            .await
            .unwrap();

        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_scan_flags_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("nested/b.txt");
        fs.write_file_atomic(&a, Bytes::from_static(b"a")).await.unwrap();
        fs.write_file_atomic(&b, Bytes::from_static(b"b")).await.unwrap();

        let mut snapshot = LocalSnapshot::scan(&fs, dir.path()).await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.is_candidate(&a));

        snapshot.mark_observed(&a);
        assert!(!snapshot.is_candidate(&a));
        assert_eq!(snapshot.deletion_candidates(), vec![b]);
    }

    #[tokio::test]
    async fn test_root_that_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let file = dir.path().join("plain");
        fs.write_file_atomic(&file, Bytes::from_static(b"x")).await.unwrap();

        let result = LocalSnapshot::scan(&fs, &file).await;
        assert!(matches!(result, Err(MirrorError::Scan { .. })));
    }

    #[test]
    fn test_mark_unknown_path_inserts_non_candidate() {
        let mut snapshot = LocalSnapshot::default();
        snapshot.mark_observed(Path::new("/m/new.png"));

        assert!(snapshot.contains(Path::new("/m/new.png")));
        assert!(snapshot.deletion_candidates().is_empty());
    }
}
