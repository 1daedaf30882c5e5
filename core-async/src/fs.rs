//! Async filesystem helpers re-exported from the underlying runtime.
//!
//! Only the subset used by the filesystem bridge is exposed.

pub use tokio::fs::{create_dir_all, metadata, remove_file, rename, File};
