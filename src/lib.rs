//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service` for the full desktop daemon wiring,
//! `core-mirror` for embedding the sync engine alone). Hosts can depend on
//! `mirror-workspace` and enable the documented features without wiring each
//! crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service as service;

#[cfg(feature = "engine-only")]
pub use core_mirror as mirror;
