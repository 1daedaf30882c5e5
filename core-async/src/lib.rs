//! Runtime abstraction layer for the data mirror engine.
//!
//! All `core-*` and `provider-*` crates depend on this crate instead of
//! reaching for Tokio directly. Keeping the executor behind one crate means
//! the sync engine only ever suspends through the primitives exported here,
//! which is what makes cooperative cancellation auditable.
//!
//! # Modules
//!
//! - `task`: Task spawning and join handles
//! - `time`: Sleep, timeouts and cancellation-aware sleeping
//! - `sync`: Locks, channels and [`CancellationToken`](sync::CancellationToken)
//! - `fs` / `io`: Async filesystem helpers and I/O extension traits
//! - `signal`: Ctrl-C and Unix signal streams for the daemon
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep_or_cancel, Duration};
//!
//! # async fn example() {
//! let token = CancellationToken::new();
//! let child = token.child_token();
//!
//! let handle = core_async::spawn(async move {
//!     // Returns `false` as soon as the token fires.
//!     sleep_or_cancel(&child, Duration::from_secs(60)).await
//! });
//!
//! token.cancel();
//! assert!(!handle.await.unwrap());
//! # }
//! ```

pub mod fs;
pub mod io;
pub mod runtime;
pub mod signal;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use tokio::select;
pub use time::{sleep, Duration, Instant};
