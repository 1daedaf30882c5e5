//! Async I/O extension traits re-exported from the underlying runtime.

pub use tokio::io::AsyncWriteExt;
