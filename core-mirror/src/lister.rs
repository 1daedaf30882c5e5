//! Remote Lister
//!
//! Lazy, finite walk over the catalog's paginated listing. The lister never
//! retries; a failed page ends the walk and no [`CompletedPass`] is issued.

use bridge_traits::catalog::{CatalogFilter, CatalogPage, PageCursor, RemoteCatalog};
use tracing::{debug, instrument};

use crate::error::{MirrorError, Result};

/// Proof that a listing pass ran to its terminal page.
///
/// Only [`PageLister::completed_pass`] can produce one, and reconciliation
/// requires it.
#[derive(Debug)]
pub struct CompletedPass {
    pages: u64,
    objects: u64,
}

impl CompletedPass {
    pub fn pages(&self) -> u64 {
        self.pages
    }

    pub fn objects(&self) -> u64 {
        self.objects
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListerState {
    Listing,
    Finished,
    Failed,
}

pub struct PageLister<'a> {
    catalog: &'a dyn RemoteCatalog,
    filter: &'a CatalogFilter,
    cursor: Option<PageCursor>,
    pages: u64,
    objects: u64,
    state: ListerState,
}

impl<'a> PageLister<'a> {
    pub fn new(catalog: &'a dyn RemoteCatalog, filter: &'a CatalogFilter) -> Self {
        Self {
            catalog,
            filter,
            cursor: None,
            pages: 0,
            objects: 0,
            state: ListerState::Listing,
        }
    }

    /// Fetch the next non-empty page.
    ///
    /// Returns `Ok(None)` once the catalog answers with an empty page, and on
    /// every call after that (or after a failure) without touching the
    /// network.
    #[instrument(skip(self), fields(page = self.pages + 1))]
    pub async fn next_page(&mut self) -> Result<Option<CatalogPage>> {
        if self.state != ListerState::Listing {
            return Ok(None);
        }

        let page = match self
            .catalog
            .list_by_filter(self.filter, self.cursor.clone())
            .await
        {
            Ok(page) => page,
            Err(source) => {
                self.state = ListerState::Failed;
                return Err(MirrorError::Listing {
                    page: self.pages + 1,
                    source,
                });
            }
        };

        if page.is_terminal() {
            debug!(pages = self.pages, objects = self.objects, "Listing complete");
            self.state = ListerState::Finished;
            return Ok(None);
        }

        self.pages += 1;
        self.objects += page.objects.len() as u64;
        self.cursor = page.next_cursor.clone();
        debug!(entries = page.objects.len(), "Listed page");
        Ok(Some(page))
    }

    pub fn pages(&self) -> u64 {
        self.pages
    }

    pub fn is_finished(&self) -> bool {
        self.state == ListerState::Finished
    }

    /// Token for the reconciler, issued only after a normal termination.
    pub fn completed_pass(&self) -> Option<CompletedPass> {
        self.is_finished().then_some(CompletedPass {
            pages: self.pages,
            objects: self.objects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::catalog::{BinaryId, RemoteObjectMetadata};
    use bridge_traits::error::BridgeError;
    use bytes::Bytes;
    use mockall::{mock, predicate::*, Sequence};

    mock! {
        Catalog {}

        #[async_trait]
        impl RemoteCatalog for Catalog {
            async fn list_by_filter(
                &self,
                filter: &CatalogFilter,
                cursor: Option<PageCursor>,
            ) -> bridge_traits::error::Result<CatalogPage>;
            async fn fetch_content(&self, id: &BinaryId) -> bridge_traits::error::Result<Bytes>;
        }
    }

    fn object(id: &str) -> RemoteObjectMetadata {
        RemoteObjectMetadata {
            id: id.to_string(),
            file_name: None,
            mime_type: "image/jpeg".to_string(),
            organization_id: "org".to_string(),
            location_id: "loc".to_string(),
        }
    }

    #[tokio::test]
    async fn test_walks_pages_until_empty() {
        let mut catalog = MockCatalog::new();
        let mut seq = Sequence::new();
        catalog
            .expect_list_by_filter()
            .with(always(), eq(None))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(CatalogPage::new(
                    vec![object("a"), object("b")],
                    Some(PageCursor::new("c1")),
                ))
            });
        catalog
            .expect_list_by_filter()
            .with(always(), eq(Some(PageCursor::new("c1"))))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(CatalogPage::new(vec![object("c")], Some(PageCursor::new("c2")))));
        catalog
            .expect_list_by_filter()
            .with(always(), eq(Some(PageCursor::new("c2"))))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(CatalogPage::new(vec![], Some(PageCursor::new("c3")))));

        let filter = CatalogFilter::default();
        let mut lister = PageLister::new(&catalog, &filter);

        assert_eq!(lister.next_page().await.unwrap().unwrap().objects.len(), 2);
        assert!(lister.completed_pass().is_none());
        assert_eq!(lister.next_page().await.unwrap().unwrap().objects.len(), 1);
        assert!(lister.next_page().await.unwrap().is_none());

        // Terminated: no further network calls.
        assert!(lister.next_page().await.unwrap().is_none());

        let pass = lister.completed_pass().unwrap();
        assert_eq!(pass.pages(), 2);
        assert_eq!(pass.objects(), 3);
    }

    #[tokio::test]
    async fn test_failure_withholds_completed_pass() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_by_filter()
            .times(1)
            .returning(|_, _| Err(BridgeError::OperationFailed("503".into())));

        let filter = CatalogFilter::default();
        let mut lister = PageLister::new(&catalog, &filter);

        let err = lister.next_page().await.unwrap_err();
        assert!(matches!(err, MirrorError::Listing { page: 1, .. }));
        assert!(lister.next_page().await.unwrap().is_none());
        assert!(lister.completed_pass().is_none());
    }

    #[tokio::test]
    async fn test_empty_catalog_completes_immediately() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_list_by_filter()
            .times(1)
            .returning(|_, _| Ok(CatalogPage::default()));

        let filter = CatalogFilter::default();
        let mut lister = PageLister::new(&catalog, &filter);

        assert!(lister.next_page().await.unwrap().is_none());
        assert_eq!(lister.completed_pass().unwrap().pages(), 0);
    }
}
