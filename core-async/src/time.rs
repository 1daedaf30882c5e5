//! Time-related abstractions.
//!
//! Besides the plain Tokio re-exports this module provides the
//! cancellation-aware helpers the scheduler uses at each of its suspension
//! points.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(5)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(5));
//! }
//! ```

pub use tokio::time::{sleep, timeout};

pub use std::time::{Duration, Instant};

use crate::sync::CancellationToken;
use std::future::Future;

/// Error returned by [`run_or_cancel`] when the token fired first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Sleeps for `duration` unless `token` is cancelled first.
///
/// Returns `true` when the full duration elapsed and `false` when the sleep
/// was interrupted by cancellation.
pub async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = sleep(duration) => true,
    }
}

/// Drives `future` to completion unless `token` is cancelled first.
///
/// The future is dropped on cancellation, so any in-flight I/O it owns is
/// abandoned at its current await point.
pub async fn run_or_cancel<F>(token: &CancellationToken, future: F) -> Result<F::Output, Cancelled>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Cancelled),
        output = future => Ok(output),
    }
}
