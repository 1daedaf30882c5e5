//! # Mirror Engine
//!
//! Keeps a local directory in step with a filtered view of the remote
//! binary-object catalog.
//!
//! ## Components
//!
//! - **Filter Builder** (`filter`): configuration -> catalog query
//! - **Local State Scanner** (`scanner`): snapshot of the mirror root
//! - **Remote Lister** (`lister`): cursor-paginated metadata walk
//! - **Filename Resolver** (`resolver`): metadata -> local path
//! - **Object Fetcher** / **File Writer** (`fetcher`, `writer`): content download and atomic write
//! - **Reconciler** (`reconciler`): deletion of files the catalog no longer lists
//! - **Sync Cycle** (`cycle`): one scan / list / fetch / reconcile pass
//! - **Sync Scheduler** (`scheduler`): background loop, reconfiguration and shutdown

pub mod cycle;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod lister;
pub mod reconciler;
pub mod resolver;
pub mod scanner;
pub mod scheduler;
pub mod writer;

pub use cycle::{run_cycle, CycleContext, CycleReport};
pub use error::{MirrorError, Result};
pub use filter::FilterFromConfig;
pub use lister::{CompletedPass, PageLister};
pub use reconciler::ReconcileOutcome;
pub use scanner::LocalSnapshot;
pub use scheduler::{MirrorService, SchedulerState, SchedulerTiming};
