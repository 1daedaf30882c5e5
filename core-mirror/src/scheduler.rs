//! Sync Scheduler
//!
//! Owns the single background task that connects to the catalog and runs
//! cycles forever. Reconfiguration swaps the configuration, cancels the
//! running task, waits for it to finish and spawns exactly one replacement.
//!
//! ```text
//! Idle ─> Connecting ─> Running ─> Sleeping ─┐
//!             ^  │          ^                │
//!             └──┘ retry    └────────────────┘
//!
//! any state ── reconfigure ──> Reconfiguring ──> Connecting
//! ```

use bridge_traits::catalog::{CatalogConnector, RemoteCatalog};
use bridge_traits::storage::FileSystemAccess;
use core_async::sync::{watch, CancellationToken, Mutex};
use core_async::task::JoinHandle;
use core_async::time::{run_or_cancel, sleep_or_cancel, Duration};
use core_runtime::config::MirrorConfig;
use core_runtime::events::{EventBus, MirrorEvent};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::cycle::{run_cycle, CycleContext, CycleReport};
use crate::error::MirrorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    Idle,
    Connecting,
    Running,
    Sleeping,
    Reconfiguring,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Connecting => "connecting",
            SchedulerState::Running => "running",
            SchedulerState::Sleeping => "sleeping",
            SchedulerState::Reconfiguring => "reconfiguring",
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backoff settings for the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    /// First delay after a failed connection attempt; doubles per attempt
    /// up to the sync interval.
    pub connect_backoff_base: Duration,
    /// Pause after a failed cycle.
    pub error_backoff: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            connect_backoff_base: Duration::from_secs(1),
            error_backoff: Duration::from_secs(1),
        }
    }
}

struct Shared {
    connector: Arc<dyn CatalogConnector>,
    fs: Arc<dyn FileSystemAccess>,
    events: EventBus,
    timing: SchedulerTiming,
    state: watch::Sender<SchedulerState>,
    last_report: watch::Sender<Option<CycleReport>>,
    cycles: AtomicU64,
}

impl Shared {
    fn set_state(&self, next: SchedulerState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });

        if changed {
            debug!(state = %next, "Scheduler state changed");
            self.events
                .emit(MirrorEvent::StateChanged {
                    state: next.as_str().to_string(),
                })
                .ok();
        }
    }
}

struct ActiveLoop {
    config: Arc<MirrorConfig>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// The mirror service: one background loop per instance.
pub struct MirrorService {
    shared: Arc<Shared>,
    active: Mutex<Option<ActiveLoop>>,
}

impl MirrorService {
    pub fn new(connector: Arc<dyn CatalogConnector>, fs: Arc<dyn FileSystemAccess>) -> Self {
        Self::with_options(connector, fs, EventBus::default(), SchedulerTiming::default())
    }

    pub fn with_options(
        connector: Arc<dyn CatalogConnector>,
        fs: Arc<dyn FileSystemAccess>,
        events: EventBus,
        timing: SchedulerTiming,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        let (last_report, _) = watch::channel(None);

        Self {
            shared: Arc::new(Shared {
                connector,
                fs,
                events,
                timing,
                state,
                last_report,
                cycles: AtomicU64::new(0),
            }),
            active: Mutex::new(None),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    pub fn state(&self) -> SchedulerState {
        *self.shared.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.shared.state.subscribe()
    }

    /// Report of the most recent successful cycle.
    pub fn last_report(&self) -> Option<CycleReport> {
        self.shared.last_report.borrow().clone()
    }

    pub fn subscribe_reports(&self) -> watch::Receiver<Option<CycleReport>> {
        self.shared.last_report.subscribe()
    }

    /// Configuration of the running loop, if any.
    pub async fn config(&self) -> Option<Arc<MirrorConfig>> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| Arc::clone(&active.config))
    }

    pub async fn is_running(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Start the loop with `config`, replacing any loop already running.
    pub async fn start(&self, config: MirrorConfig) {
        self.reconfigure(config).await;
    }

    /// Replace the active configuration.
    ///
    /// The previous loop is cancelled and awaited before the new one is
    /// spawned, so at most one loop exists at any time.
    #[instrument(skip_all, fields(root = %config.mirror_root.display()))]
    pub async fn reconfigure(&self, config: MirrorConfig) {
        let config = Arc::new(config);
        let mut active = self.active.lock().await;

        if let Some(previous) = active.take() {
            self.shared.set_state(SchedulerState::Reconfiguring);
            stop_loop(previous).await;
        }

        let token = CancellationToken::new();
        let handle = core_async::task::spawn(run_loop(
            Arc::clone(&self.shared),
            Arc::clone(&config),
            token.clone(),
        ));
        info!("Mirror loop scheduled");

        *active = Some(ActiveLoop {
            config,
            token,
            handle,
        });
    }

    /// Cancel and join the loop. The service can be started again afterwards.
    pub async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            stop_loop(previous).await;
            info!("Mirror loop stopped");
        }
        self.shared.set_state(SchedulerState::Idle);
    }
}

impl Drop for MirrorService {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.token.cancel();
        }
    }
}

impl fmt::Debug for MirrorService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorService")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

async fn stop_loop(active: ActiveLoop) {
    active.token.cancel();
    if let Err(e) = active.handle.await {
        if e.is_panic() {
            error!(error = %e, "Mirror loop panicked");
        }
    }
}

#[instrument(skip_all, fields(root = %config.mirror_root.display()))]
async fn run_loop(shared: Arc<Shared>, config: Arc<MirrorConfig>, token: CancellationToken) {
    let Some(catalog) = connect(&shared, &config, &token).await else {
        debug!("Cancelled while connecting");
        return;
    };

    loop {
        shared.set_state(SchedulerState::Running);
        let cycle = shared.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let ctx = CycleContext {
            catalog: Arc::clone(&catalog),
            fs: Arc::clone(&shared.fs),
            config: Arc::clone(&config),
            events: shared.events.clone(),
            cancel: token.clone(),
        };

        let pause = match run_cycle(&ctx, cycle).await {
            Ok(report) => {
                shared.last_report.send_replace(Some(report));
                config.interval
            }
            Err(MirrorError::Cancelled) => break,
            Err(e) => {
                error!(cycle, error = %e, "Sync cycle failed");
                shared
                    .events
                    .emit(MirrorEvent::CycleFailed {
                        cycle,
                        message: e.to_string(),
                        recoverable: true,
                    })
                    .ok();
                shared.timing.error_backoff
            }
        };

        shared.set_state(SchedulerState::Sleeping);
        if !sleep_or_cancel(&token, pause).await {
            break;
        }
    }

    debug!("Cancelled");
}

/// Connect until it succeeds or `token` fires.
async fn connect(
    shared: &Shared,
    config: &MirrorConfig,
    token: &CancellationToken,
) -> Option<Arc<dyn RemoteCatalog>> {
    let mut attempt: u32 = 0;

    loop {
        shared.set_state(SchedulerState::Connecting);

        match run_or_cancel(token, shared.connector.connect(&config.credentials)).await {
            Err(_) => return None,
            Ok(Ok(catalog)) => {
                info!("Connected to remote catalog");
                return Some(catalog);
            }
            Ok(Err(source)) => {
                attempt += 1;
                let delay = connect_backoff(shared.timing.connect_backoff_base, attempt, config.interval);
                let e = MirrorError::Connection(source);
                warn!(
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Connection failed"
                );
                if !sleep_or_cancel(token, delay).await {
                    return None;
                }
            }
        }
    }
}

/// `base * 2^(attempt - 1)`, capped at `cap`.
fn connect_backoff(base: Duration, attempt: u32, cap: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent).min(cap)
}
