//! Runtime utilities that abstract over the underlying async executor.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Builds the multi-threaded runtime used by the daemon binary.
pub fn build_multi_thread() -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .thread_name("data-mirror-worker")
        .build()
}

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Intended for short synchronous bootstrapping outside any runtime.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
