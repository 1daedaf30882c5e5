//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the data mirror:
//! - Mirror configuration (builder, attribute-map parsing, validation)
//! - Logging and tracing infrastructure
//! - Event bus for observing the engine
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the engine and the host
//! wiring depend on. It owns no I/O beyond reading a configuration file.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{MirrorConfig, MirrorConfigBuilder, DEFAULT_SYNC_INTERVAL};
pub use error::{Error, Result};
pub use events::{EventBus, EventStream, MirrorEvent};
