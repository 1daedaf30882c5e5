//! Task spawning and execution abstractions.
//!
//! The mirror engine runs exactly one long-lived background task per service
//! instance; `spawn` returns a [`JoinHandle`] so the owner can await the old
//! task's termination before starting a replacement.

pub use tokio::task::{spawn_blocking, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}
