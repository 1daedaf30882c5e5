//! Synchronization primitives.
//!
//! Re-exports the Tokio locks and channels the engine uses together with
//! `tokio-util`'s [`CancellationToken`], which is the only mechanism the
//! engine uses to stop a running background task.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, Mutex};
//!
//! async fn example() {
//!     let mutex = Mutex::new(42);
//!     *mutex.lock().await += 1;
//!
//!     let (tx, rx) = watch::channel("idle");
//!     tx.send_replace("running");
//!     assert_eq!(*rx.borrow(), "running");
//! }
//! ```

pub use tokio::sync::{broadcast, watch, Mutex, MutexGuard};

pub use tokio_util::sync::CancellationToken;
