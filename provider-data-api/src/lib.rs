//! # Data API Provider
//!
//! Implements `RemoteCatalog` and `CatalogConnector` over the binary-data
//! HTTP/JSON API.
//!
//! ## Overview
//!
//! This module provides:
//! - API key authentication (`key_id` / `key` headers)
//! - Metadata-only, cursor-paginated listing under a filter
//! - Per-object content download (base64 payloads decoded to bytes)
//! - Exponential backoff on rate limiting and server errors

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{DataApiCatalog, DataApiConnector, DEFAULT_API_BASE, PAGE_LIMIT};
pub use error::{DataApiError, Result};
