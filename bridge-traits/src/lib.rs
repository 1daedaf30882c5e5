//! # Host Bridge Traits
//!
//! Abstraction traits separating the mirror engine from everything it talks
//! to: the remote catalog, the local filesystem, HTTP transport and the host
//! logging pipeline.
//!
//! ## Overview
//!
//! The engine in `core-mirror` never touches the network or the disk
//! directly. It is written against the traits in this crate, and concrete
//! adapters are injected at construction time:
//!
//! | Trait | Desktop adapter | Purpose |
//! |-------|-----------------|---------|
//! | [`RemoteCatalog`](catalog::RemoteCatalog) | `provider-data-api` | Paginated metadata listing and content fetch |
//! | [`CatalogConnector`](catalog::CatalogConnector) | `provider-data-api` | Turns credentials into a connected catalog |
//! | [`FileSystemAccess`](storage::FileSystemAccess) | `bridge-desktop` | Directory walk, atomic writes, deletes |
//! | [`HttpClient`](http::HttpClient) | `bridge-desktop` | Transport used by HTTP providers |
//! | [`LoggerSink`](logging::LoggerSink) | host-supplied | Mirror structured logs into host logging |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert their platform-specific errors into it and keep the
//! message actionable (include the path or object id involved).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter instance can be
//! shared between the scheduler task and its owner.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::catalog::{CatalogFilter, RemoteCatalog};
//!
//! async fn first_page(catalog: &dyn RemoteCatalog) -> bridge_traits::error::Result<usize> {
//!     let filter = CatalogFilter::builder().dataset_id("ds-1").build();
//!     let page = catalog.list_by_filter(&filter, None).await?;
//!     Ok(page.objects.len())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod http;
pub mod logging;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::{
    ApiCredentials, BinaryId, CatalogConnector, CatalogFilter, CatalogFilterBuilder, CatalogPage,
    PageCursor, RemoteCatalog, RemoteObjectMetadata,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::FileSystemAccess;
pub use logging::{LogEntry, LogLevel, LoggerSink};
