//! Host façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (catalog connector,
//! filesystem) into the mirror engine and exposes the lifecycle a resource
//! host drives: validate a configuration, apply it, answer commands, shut
//! down. Desktop builds enable the `desktop-shims` feature, which pulls in
//! `bridge-desktop` and the HTTP data API provider and also builds the
//! `data-mirror` daemon.

pub mod error;

pub use error::{CoreError, Result};

use std::path::PathBuf;
use std::sync::Arc;

use bridge_traits::{catalog::CatalogConnector, storage::FileSystemAccess};
use core_mirror::{CycleReport, MirrorService, SchedulerState, SchedulerTiming};
use core_runtime::config::MirrorConfig;
use core_runtime::events::{EventBus, EventStream};
use serde_json::{Map, Value};
use tracing::{info, instrument};

/// Aggregated handle to the bridge dependencies the engine requires.
pub struct MirrorDependencies {
    pub connector: Arc<dyn CatalogConnector>,
    pub filesystem: Arc<dyn FileSystemAccess>,
    pub timing: SchedulerTiming,
}

impl MirrorDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(connector: Arc<dyn CatalogConnector>, filesystem: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            connector,
            filesystem,
            timing: SchedulerTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: SchedulerTiming) -> Self {
        self.timing = timing;
        self
    }
}

#[cfg(feature = "desktop-shims")]
impl MirrorDependencies {
    /// Desktop adapters: reqwest transport, data API connector and the
    /// Tokio filesystem.
    pub fn desktop(api_base_url: Option<&str>) -> Result<Self> {
        let http_client = bridge_desktop::ReqwestHttpClient::new()?;
        let mut connector = provider_data_api::DataApiConnector::new(Arc::new(http_client));
        if let Some(base_url) = api_base_url {
            connector = connector.with_base_url(base_url);
        }

        Ok(Self::new(
            Arc::new(connector),
            Arc::new(bridge_desktop::TokioFileSystem::new()),
        ))
    }
}

/// Primary façade exposed to host applications.
///
/// One host owns one [`MirrorService`], and therefore at most one background
/// mirror loop.
pub struct MirrorHost {
    service: MirrorService,
    home_dir: Option<PathBuf>,
}

impl MirrorHost {
    pub fn new(deps: MirrorDependencies) -> Self {
        Self {
            service: MirrorService::with_options(
                deps.connector,
                deps.filesystem,
                EventBus::default(),
                deps.timing,
            ),
            home_dir: None,
        }
    }

    /// Resolve relative `mirror_path` values against `home` instead of the
    /// user's home directory.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    fn parse(&self, attributes: &Map<String, Value>) -> Result<MirrorConfig> {
        let config = match &self.home_dir {
            Some(home) => MirrorConfig::from_attributes_with_home(attributes, home)?,
            None => MirrorConfig::from_attributes(attributes)?,
        };
        Ok(config)
    }

    /// Check a raw attribute map without applying it.
    ///
    /// Returns the names of other resources this one depends on, which is
    /// always empty.
    pub fn validate_config(&self, attributes: &Map<String, Value>) -> Result<Vec<String>> {
        self.parse(attributes)?;
        Ok(Vec::new())
    }

    /// Apply a new attribute map. An invalid map is rejected and the running
    /// loop keeps its previous configuration.
    #[instrument(skip_all)]
    pub async fn reconfigure(&self, attributes: &Map<String, Value>) -> Result<()> {
        let config = self.parse(attributes)?;
        self.apply(config).await;
        Ok(())
    }

    async fn apply(&self, config: MirrorConfig) {
        info!(
            root = %config.mirror_root.display(),
            dataset_id = config.dataset_id.as_deref().unwrap_or(""),
            tags = config.tags.len(),
            labels = config.labels.len(),
            delete = config.delete,
            interval_secs = config.interval.as_secs_f64(),
            "Applying configuration"
        );
        self.service.reconfigure(config).await;
    }

    /// Command extension point. No commands are defined yet.
    pub async fn do_command(&self, _command: Map<String, Value>) -> Map<String, Value> {
        Map::new()
    }

    pub async fn shutdown(&self) {
        self.service.shutdown().await;
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.service.events().subscribe())
    }

    pub fn state(&self) -> SchedulerState {
        self.service.state()
    }

    pub fn last_report(&self) -> Option<CycleReport> {
        self.service.last_report()
    }

    pub fn service(&self) -> &MirrorService {
        &self.service
    }
}

/// Convenience bootstrapper for desktop hosts: builds the desktop adapters
/// and starts mirroring with `attributes`.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let attributes = serde_json::json!({
///     "app_api_key": "key",
///     "app_api_key_id": "key-id",
///     "dataset_id": "ds-1",
/// });
/// let host = core_service::bootstrap_desktop(attributes.as_object().unwrap()).await?;
/// host.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(attributes: &Map<String, Value>) -> Result<MirrorHost> {
    let config = MirrorConfig::from_attributes(attributes)?;
    let host = MirrorHost::new(MirrorDependencies::desktop(config.api_base_url.as_deref())?);
    host.apply(config).await;
    Ok(host)
}
