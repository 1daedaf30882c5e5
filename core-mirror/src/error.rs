use bridge_traits::error::BridgeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Failed to connect to the remote catalog: {0}")]
    Connection(#[source] BridgeError),

    #[error("Listing failed on page {page}: {source}")]
    Listing {
        page: u64,
        #[source]
        source: BridgeError,
    },

    #[error("Cannot resolve a local name for object {object_id}: {reason}")]
    Resolution { object_id: String, reason: String },

    #[error("Failed to fetch object {object_id}: {source}")]
    Fetch {
        object_id: String,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Failed to scan mirror root {}: {source}", root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: BridgeError,
    },

    #[error("Sync cancelled")]
    Cancelled,
}

impl MirrorError {
    /// Whether this error aborts the whole cycle rather than a single object.
    ///
    /// `Connection` is raised by the scheduler before any cycle runs, so it is
    /// never cycle-fatal.
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(
            self,
            MirrorError::Listing { .. }
                | MirrorError::Scan { .. }
                | MirrorError::Cancelled
        )
    }
}

impl From<core_async::time::Cancelled> for MirrorError {
    fn from(_: core_async::time::Cancelled) -> Self {
        MirrorError::Cancelled
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
