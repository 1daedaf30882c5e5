//! Reconciler
//!
//! Removes local files the remote catalog no longer lists. Runs only with a
//! [`CompletedPass`], so an interrupted listing can never cause deletions.

use bridge_traits::storage::FileSystemAccess;
use core_runtime::events::{EventBus, MirrorEvent};
use tracing::{info, instrument, warn};

use crate::error::MirrorError;
use crate::lister::CompletedPass;
use crate::scanner::LocalSnapshot;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub deleted: u64,
    pub failed: u64,
}

/// Delete every path still flagged as a candidate in `snapshot`.
///
/// Per-file failures are logged and skipped. With `delete` disabled this is
/// a no-op.
#[instrument(skip_all, fields(pages = pass.pages(), candidates = tracing::field::Empty))]
pub async fn reconcile(
    fs: &dyn FileSystemAccess,
    snapshot: &LocalSnapshot,
    pass: CompletedPass,
    delete: bool,
    events: &EventBus,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    if !delete {
        return outcome;
    }

    let candidates = snapshot.deletion_candidates();
    tracing::Span::current().record("candidates", candidates.len());

    for path in candidates {
        match fs.delete_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "Deleted");
                events.emit(MirrorEvent::FileDeleted { path }).ok();
                outcome.deleted += 1;
            }
            Err(source) => {
                let error = MirrorError::Delete { path, source };
                warn!(error = %error, "Skipping file");
                outcome.failed += 1;
            }
        }
    }

    outcome
}
