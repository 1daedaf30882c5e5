//! # Event Bus System
//!
//! Typed mirror events published over `tokio::sync::broadcast`, so hosts can
//! observe the engine (progress UIs, health checks) without parsing logs.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐    emit     ┌───────────┐   subscribe   ┌────────────┐
//! │ Sync scheduler ├────────────>│ EventBus  ├──────────────>│ Subscriber │
//! └────────────────┘             │ (broadcast│               └────────────┘
//! ┌────────────────┐    emit     │  channel) │   subscribe   ┌────────────┐
//! │  Sync cycle    ├────────────>│           ├──────────────>│ Subscriber │
//! └────────────────┘             └───────────┘               └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, EventStream, MirrorEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut deletions = EventStream::new(bus.subscribe())
//!     .filter(|event| matches!(event, MirrorEvent::FileDeleted { .. }));
//!
//! bus.emit(MirrorEvent::FileDeleted { path: "/m/a.jpg".into() }).ok();
//! assert!(deletions.recv().await.is_ok());
//! # }
//! ```
//!
//! Emitting with no subscribers returns `Err`; publishers in the engine
//! ignore that result.

use core_async::sync::broadcast::{self, error::RecvError, error::SendError, Receiver};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default buffer size for the event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Events emitted by the mirror engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MirrorEvent {
    /// The scheduler moved to a new state.
    StateChanged {
        /// Lower-case state name (`connecting`, `running`, ...).
        state: String,
    },
    /// A sync cycle began.
    CycleStarted { cycle: u64 },
    /// A remote object was written into the mirror root.
    FileWritten { path: PathBuf, bytes: u64 },
    /// A local file absent from the remote catalog was removed.
    FileDeleted { path: PathBuf },
    /// A remote object could not be mirrored this cycle.
    ObjectSkipped { object_id: String, reason: String },
    /// A sync cycle finished its pagination pass.
    CycleCompleted {
        cycle: u64,
        listed: u64,
        written: u64,
        failed: u64,
        deleted: u64,
        duration_ms: u64,
    },
    /// A sync cycle was aborted.
    CycleFailed {
        cycle: u64,
        message: String,
        /// Whether the scheduler will retry after a backoff.
        recoverable: bool,
    },
}

impl MirrorEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            MirrorEvent::StateChanged { .. } => "Scheduler state changed",
            MirrorEvent::CycleStarted { .. } => "Sync cycle started",
            MirrorEvent::FileWritten { .. } => "File written",
            MirrorEvent::FileDeleted { .. } => "File deleted",
            MirrorEvent::ObjectSkipped { .. } => "Object skipped",
            MirrorEvent::CycleCompleted { .. } => "Sync cycle completed",
            MirrorEvent::CycleFailed { .. } => "Sync cycle failed",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            MirrorEvent::CycleFailed { .. } => EventSeverity::Error,
            MirrorEvent::ObjectSkipped { .. } => EventSeverity::Warning,
            MirrorEvent::CycleCompleted { .. } | MirrorEvent::FileDeleted { .. } => {
                EventSeverity::Info
            }
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Central event bus for broadcasting mirror events.
///
/// Cloning is cheap; every clone publishes into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MirrorEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are none.
    pub fn emit(&self, event: MirrorEvent) -> Result<usize, SendError<MirrorEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<MirrorEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&MirrorEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
pub struct EventStream {
    receiver: Receiver<MirrorEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<MirrorEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MirrorEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &MirrorEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<MirrorEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<MirrorEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}
