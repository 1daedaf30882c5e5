use async_trait::async_trait;
use bridge_desktop::TokioFileSystem;
use bridge_traits::catalog::{
    ApiCredentials, BinaryId, CatalogConnector, CatalogFilter, CatalogPage, PageCursor,
    RemoteCatalog, RemoteObjectMetadata,
};
use bridge_traits::error::Result as BridgeResult;
use bytes::Bytes;
use core_mirror::{SchedulerState, SchedulerTiming};
use core_runtime::events::MirrorEvent;
use core_service::{CoreError, MirrorDependencies, MirrorHost};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One page holding a single PNG object.
#[derive(Default)]
struct SinglePageCatalog {
    filters: Mutex<Vec<CatalogFilter>>,
}

#[async_trait]
impl RemoteCatalog for SinglePageCatalog {
    async fn list_by_filter(
        &self,
        filter: &CatalogFilter,
        cursor: Option<PageCursor>,
    ) -> BridgeResult<CatalogPage> {
        self.filters.lock().unwrap().push(filter.clone());
        if cursor.is_some() {
            return Ok(CatalogPage::default());
        }
        Ok(CatalogPage::new(
            vec![RemoteObjectMetadata {
                id: "img-1".to_string(),
                file_name: None,
                mime_type: "image/png".to_string(),
                organization_id: "org".to_string(),
                location_id: "loc".to_string(),
            }],
            Some(PageCursor::new("next")),
        ))
    }

    async fn fetch_content(&self, _id: &BinaryId) -> BridgeResult<Bytes> {
        Ok(Bytes::from_static(b"png bytes"))
    }
}

struct StaticConnector(Arc<SinglePageCatalog>);

#[async_trait]
impl CatalogConnector for StaticConnector {
    async fn connect(&self, _credentials: &ApiCredentials) -> BridgeResult<Arc<dyn RemoteCatalog>> {
        Ok(self.0.clone())
    }
}

fn host(catalog: &Arc<SinglePageCatalog>, home: &Path) -> MirrorHost {
    let deps = MirrorDependencies::new(
        Arc::new(StaticConnector(catalog.clone())),
        Arc::new(TokioFileSystem::new()),
    )
    .with_timing(SchedulerTiming {
        connect_backoff_base: Duration::from_millis(10),
        error_backoff: Duration::from_millis(10),
    });
    MirrorHost::new(deps).with_home_dir(home)
}

fn attributes(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reconfigure_starts_mirroring_into_default_path() {
    let home = tempfile::tempdir().unwrap();
    let catalog = Arc::new(SinglePageCatalog::default());
    let host = host(&catalog, home.path());
    let mut events = host.subscribe_events().filter(|e| matches!(e, MirrorEvent::FileWritten { .. }));

    host.reconfigure(&attributes(json!({
        "app_api_key": "key",
        "app_api_key_id": "key-id",
        "dataset_id": "ds-1",
    })))
    .await
    .unwrap();

    let written = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("nothing written")
        .unwrap();
    let expected = home.path().join(".viam/data_mirror/img-1.png");
    assert_eq!(
        written,
        MirrorEvent::FileWritten {
            path: expected.clone(),
            bytes: 9
        }
    );
    assert_eq!(std::fs::read(&expected).unwrap(), b"png bytes");
    assert_eq!(
        catalog.filters.lock().unwrap()[0].dataset_id.as_deref(),
        Some("ds-1")
    );

    host.shutdown().await;
    assert_eq!(host.state(), SchedulerState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_reconfigure_keeps_running_config() {
    let home = tempfile::tempdir().unwrap();
    let mirror = tempfile::tempdir().unwrap();
    let catalog = Arc::new(SinglePageCatalog::default());
    let host = host(&catalog, home.path());

    host.reconfigure(&attributes(json!({
        "app_api_key": "key",
        "app_api_key_id": "key-id",
        "mirror_path": mirror.path().to_str().unwrap(),
        "sync_frequency": 120,
    })))
    .await
    .unwrap();

    let err = host
        .reconfigure(&attributes(json!({ "app_api_key_id": "key-id" })))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
    assert!(err.to_string().contains("app_api_key"));

    let config = host.service().config().await.unwrap();
    assert_eq!(config.mirror_root, mirror.path());
    assert_eq!(config.interval, Duration::from_secs(120));
    assert!(host.service().is_running().await);

    host.shutdown().await;
}

#[tokio::test]
async fn test_validate_and_do_command() {
    let home = tempfile::tempdir().unwrap();
    let host = host(&Arc::new(SinglePageCatalog::default()), home.path());

    let deps = host
        .validate_config(&attributes(json!({
            "app_api_key": "key",
            "app_api_key_id": "key-id",
            "tags": ["a", "b"],
        })))
        .unwrap();
    assert!(deps.is_empty());

    assert!(host
        .validate_config(&attributes(json!({ "app_api_key": "key" })))
        .is_err());
    assert!(host
        .validate_config(&attributes(json!({
            "app_api_key": "key",
            "app_api_key_id": "key-id",
            "tags": "not-a-list",
        })))
        .is_err());

    let reply = host
        .do_command(attributes(json!({ "command": "sync_now" })))
        .await;
    assert!(reply.is_empty());
    assert!(host.do_command(Map::new()).await.is_empty());
    assert!(host.last_report().is_none());
}
