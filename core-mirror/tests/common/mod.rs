#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::catalog::{
    ApiCredentials, BinaryId, CatalogConnector, CatalogFilter, CatalogPage, PageCursor,
    RemoteCatalog, RemoteObjectMetadata,
};
use bridge_traits::error::{BridgeError, Result};
use bytes::Bytes;
use core_runtime::config::{MirrorConfig, MirrorConfigBuilder};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub fn object(id: &str, file_name: Option<&str>, mime_type: &str) -> RemoteObjectMetadata {
    RemoteObjectMetadata {
        id: id.to_string(),
        file_name: file_name.map(str::to_string),
        mime_type: mime_type.to_string(),
        organization_id: "org-1".to_string(),
        location_id: "loc-1".to_string(),
    }
}

pub fn content_for(id: &str) -> Vec<u8> {
    format!("content of {id}").into_bytes()
}

pub fn config(root: &Path) -> MirrorConfigBuilder {
    MirrorConfig::builder()
        .credentials("key-id", "secret-key")
        .mirror_root(root)
}

/// In-memory catalog serving fixed pages. Cursors are `page-<n>`.
#[derive(Default)]
pub struct FakeCatalog {
    pages: Vec<Vec<RemoteObjectMetadata>>,
    fail_listing_at: Option<usize>,
    fail_fetch: HashSet<String>,
    pub list_calls: Mutex<Vec<(CatalogFilter, Option<PageCursor>)>>,
    pub fetch_calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, objects: Vec<RemoteObjectMetadata>) -> Self {
        self.pages.push(objects);
        self
    }

    /// Listing the page at `index` (0-based) fails.
    pub fn fail_listing_at(mut self, index: usize) -> Self {
        self.fail_listing_at = Some(index);
        self
    }

    pub fn fail_fetch(mut self, id: &str) -> Self {
        self.fail_fetch.insert(id.to_string());
        self
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn fetch_call_count(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }

    pub fn filters_since(&self, index: usize) -> Vec<CatalogFilter> {
        self.list_calls.lock().unwrap()[index..]
            .iter()
            .map(|(filter, _)| filter.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteCatalog for FakeCatalog {
    async fn list_by_filter(
        &self,
        filter: &CatalogFilter,
        cursor: Option<PageCursor>,
    ) -> Result<CatalogPage> {
        self.list_calls
            .lock()
            .unwrap()
            .push((filter.clone(), cursor.clone()));

        let index = cursor
            .as_ref()
            .and_then(|c| c.as_str().strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);

        if self.fail_listing_at == Some(index) {
            return Err(BridgeError::OperationFailed("listing unavailable".into()));
        }

        match self.pages.get(index) {
            Some(objects) => Ok(CatalogPage::new(
                objects.clone(),
                Some(PageCursor::new(format!("page-{}", index + 1))),
            )),
            None => Ok(CatalogPage::new(Vec::new(), None)),
        }
    }

    async fn fetch_content(&self, id: &BinaryId) -> Result<Bytes> {
        self.fetch_calls.lock().unwrap().push(id.file_id.clone());
        if self.fail_fetch.contains(&id.file_id) {
            return Err(BridgeError::OperationFailed("connection reset".into()));
        }
        Ok(Bytes::from(content_for(&id.file_id)))
    }
}

/// Connector that fails a fixed number of times before handing out the
/// catalog.
pub struct FakeConnector {
    catalog: Arc<FakeCatalog>,
    failures_remaining: AtomicU32,
    pub attempts: AtomicU32,
}

impl FakeConnector {
    pub fn new(catalog: Arc<FakeCatalog>) -> Self {
        Self::failing(catalog, 0)
    }

    pub fn failing(catalog: Arc<FakeCatalog>, failures: u32) -> Self {
        Self {
            catalog,
            failures_remaining: AtomicU32::new(failures),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogConnector for FakeConnector {
    async fn connect(&self, _credentials: &ApiCredentials) -> Result<Arc<dyn RemoteCatalog>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(BridgeError::Unauthorized("key rejected".into()));
        }
        Ok(self.catalog.clone())
    }
}
