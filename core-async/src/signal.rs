//! Process signal handling.
//!
//! `ctrl_c` works everywhere; the Unix signal stream is used by the daemon to
//! reload its configuration on `SIGHUP`.

pub use tokio::signal::ctrl_c;

#[cfg(unix)]
pub use tokio::signal::unix::{signal, Signal, SignalKind};
