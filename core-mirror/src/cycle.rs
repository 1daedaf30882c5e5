//! Sync Cycle
//!
//! One pass of the mirror loop:
//!
//! 1. snapshot the mirror root
//! 2. walk the remote listing page by page, resolving each object to a local
//!    path and fetching the ones missing locally
//! 3. once the listing terminated normally, reconcile deletions
//!
//! The cancellation token is observed at every network call.

use bridge_traits::catalog::{CatalogFilter, RemoteCatalog, RemoteObjectMetadata};
use bridge_traits::storage::FileSystemAccess;
use core_async::sync::CancellationToken;
use core_async::time::{run_or_cancel, Duration, Instant};
use core_runtime::config::MirrorConfig;
use core_runtime::events::{EventBus, MirrorEvent};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{MirrorError, Result};
use crate::filter::FilterFromConfig;
use crate::lister::PageLister;
use crate::reconciler;
use crate::resolver;
use crate::scanner::LocalSnapshot;
use crate::{fetcher, writer};

/// Everything a cycle needs, bundled so the scheduler can hand it over as
/// one value.
#[derive(Clone)]
pub struct CycleContext {
    pub catalog: Arc<dyn RemoteCatalog>,
    pub fs: Arc<dyn FileSystemAccess>,
    pub config: Arc<MirrorConfig>,
    pub events: EventBus,
    pub cancel: CancellationToken,
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub pages: u64,
    pub listed: u64,
    pub skipped_existing: u64,
    pub fetched: u64,
    pub written: u64,
    /// Objects that failed to fetch or write
    pub failed: u64,
    pub resolution_skipped: u64,
    pub deleted: u64,
    pub delete_failed: u64,
    pub duration: Duration,
}

struct PendingFetch {
    object: RemoteObjectMetadata,
    path: PathBuf,
}

struct CycleRun<'a> {
    ctx: &'a CycleContext,
    snapshot: LocalSnapshot,
    claimed: HashSet<PathBuf>,
    report: CycleReport,
}

/// Run one full sync cycle.
#[instrument(skip(ctx), fields(root = %ctx.config.mirror_root.display()))]
pub async fn run_cycle(ctx: &CycleContext, cycle: u64) -> Result<CycleReport> {
    let started = Instant::now();
    ctx.events.emit(MirrorEvent::CycleStarted { cycle }).ok();

    let snapshot = LocalSnapshot::scan(ctx.fs.as_ref(), &ctx.config.mirror_root).await?;
    let mut run = CycleRun {
        ctx,
        snapshot,
        claimed: HashSet::new(),
        report: CycleReport {
            cycle,
            ..Default::default()
        },
    };

    let filter = CatalogFilter::from_config(&ctx.config);
    let mut lister = PageLister::new(ctx.catalog.as_ref(), &filter);

    while let Some(page) = run_or_cancel(&ctx.cancel, lister.next_page()).await?? {
        run.report.listed += page.objects.len() as u64;
        let pending = run.admit(page.objects).await;
        run.fetch_and_write(pending).await?;
    }
    run.report.pages = lister.pages();

    if let Some(pass) = lister.completed_pass() {
        let outcome = reconciler::reconcile(
            ctx.fs.as_ref(),
            &run.snapshot,
            pass,
            ctx.config.delete,
            &ctx.events,
        )
        .await;
        run.report.deleted = outcome.deleted;
        run.report.delete_failed = outcome.failed;
    }

    let mut report = run.report;
    report.duration = started.elapsed();

    info!(
        cycle,
        pages = report.pages,
        listed = report.listed,
        skipped_existing = report.skipped_existing,
        written = report.written,
        failed = report.failed,
        resolution_skipped = report.resolution_skipped,
        deleted = report.deleted,
        duration_ms = report.duration.as_millis() as u64,
        "Sync cycle complete"
    );
    ctx.events
        .emit(MirrorEvent::CycleCompleted {
            cycle,
            listed: report.listed,
            written: report.written,
            failed: report.failed,
            deleted: report.deleted,
            duration_ms: report.duration.as_millis() as u64,
        })
        .ok();

    Ok(report)
}

impl CycleRun<'_> {
    /// Resolve every object on a page and keep the ones that need fetching.
    ///
    /// A path is admitted at most once per cycle.
    async fn admit(&mut self, objects: Vec<RemoteObjectMetadata>) -> Vec<PendingFetch> {
        let mut pending = Vec::new();

        for object in objects {
            let path = match resolver::resolve(&self.ctx.config.mirror_root, &object) {
                Ok(path) => path,
                Err(error) => {
                    self.report.resolution_skipped += 1;
                    self.skip(&object.id, &error);
                    continue;
                }
            };

            self.snapshot.mark_observed(&path);
            if !self.claimed.insert(path.clone()) {
                self.report.skipped_existing += 1;
                continue;
            }

            match self.ctx.fs.is_file(&path).await {
                Ok(true) => self.report.skipped_existing += 1,
                Ok(false) => pending.push(PendingFetch { object, path }),
                Err(source) => {
                    self.report.failed += 1;
                    self.skip(&object.id, &MirrorError::Write { path, source });
                }
            }
        }

        pending
    }

    /// Fetch and write admitted objects with at most
    /// `max_concurrent_fetches` requests in flight.
    async fn fetch_and_write(&mut self, pending: Vec<PendingFetch>) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }

        let catalog = self.ctx.catalog.as_ref();
        let fs = self.ctx.fs.as_ref();
        let limit = self.ctx.config.max_concurrent_fetches.max(1);

        let transfers = stream::iter(pending)
            .map(move |job| async move {
                let result = match fetcher::fetch(catalog, &job.object).await {
                    Ok(content) => writer::write(fs, &job.path, content).await,
                    Err(error) => Err(error),
                };
                (job, result)
            })
            .buffer_unordered(limit)
            .collect::<Vec<_>>();

        let outcomes = run_or_cancel(&self.ctx.cancel, transfers).await?;

        for (job, result) in outcomes {
            match result {
                Ok(bytes) => {
                    self.report.fetched += 1;
                    self.report.written += 1;
                    self.ctx
                        .events
                        .emit(MirrorEvent::FileWritten {
                            path: job.path,
                            bytes,
                        })
                        .ok();
                }
                Err(error) => {
                    if matches!(error, MirrorError::Write { .. }) {
                        self.report.fetched += 1;
                    }
                    self.report.failed += 1;
                    self.skip(&job.object.id, &error);
                }
            }
        }

        Ok(())
    }

    fn skip(&self, object_id: &str, error: &MirrorError) {
        warn!(object_id, error = %error, "Skipping object");
        self.ctx
            .events
            .emit(MirrorEvent::ObjectSkipped {
                object_id: object_id.to_string(),
                reason: error.to_string(),
            })
            .ok();
    }
}
