//! Remote Catalog Abstractions
//!
//! Types and traits describing the remote binary-object catalog the engine
//! mirrors from. The catalog is consumed in two steps: a metadata-only,
//! cursor-paginated listing under a [`CatalogFilter`], and a per-object
//! content fetch addressed by a composite [`BinaryId`].

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Opaque continuation token returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Builds a cursor from a raw token, treating the empty string as "no cursor".
    pub fn from_token(token: Option<String>) -> Option<Self> {
        token.filter(|t| !t.is_empty()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata describing one remote object.
///
/// Returned by [`RemoteCatalog::list_by_filter`]; never carries the binary
/// payload itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObjectMetadata {
    /// Object id, unique within an organization + location scope
    pub id: String,

    /// Original file name, if the object was uploaded with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// MIME type of the payload
    pub mime_type: String,

    pub organization_id: String,

    pub location_id: String,
}

impl RemoteObjectMetadata {
    /// Composite identifier used to fetch this object's content.
    pub fn binary_id(&self) -> BinaryId {
        BinaryId {
            file_id: self.id.clone(),
            organization_id: self.organization_id.clone(),
            location_id: self.location_id.clone(),
        }
    }
}

/// Composite identifier addressing a single object's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryId {
    pub file_id: String,
    pub organization_id: String,
    pub location_id: String,
}

impl fmt::Display for BinaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.organization_id, self.location_id, self.file_id
        )
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub objects: Vec<RemoteObjectMetadata>,
    pub next_cursor: Option<PageCursor>,
}

impl CatalogPage {
    pub fn new(objects: Vec<RemoteObjectMetadata>, next_cursor: Option<PageCursor>) -> Self {
        Self {
            objects,
            next_cursor,
        }
    }

    /// A page with zero entries ends pagination regardless of its cursor.
    pub fn is_terminal(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Conjunctive query restricting which remote objects are listed.
///
/// Every field is either present with a non-empty value or absent. The
/// remote side treats "present but empty" differently from "absent", so the
/// builder drops empty inputs instead of storing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeSet<String>>,
}

impl CatalogFilter {
    pub fn builder() -> CatalogFilterBuilder {
        CatalogFilterBuilder::default()
    }

    /// True when no field is set, i.e. the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.dataset_id.is_none() && self.tags.is_none() && self.labels.is_none()
    }
}

/// Typed builder for [`CatalogFilter`].
#[derive(Debug, Default)]
pub struct CatalogFilterBuilder {
    dataset_id: Option<String>,
    tags: Option<BTreeSet<String>>,
    labels: Option<BTreeSet<String>>,
}

impl CatalogFilterBuilder {
    /// Restricts to one dataset. Empty ids are ignored.
    pub fn dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        let dataset_id = dataset_id.into();
        self.dataset_id = (!dataset_id.is_empty()).then_some(dataset_id);
        self
    }

    /// Restricts to objects carrying any of `tags`. Empty strings are
    /// discarded; if nothing remains, no tag filter is applied.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = non_empty_set(tags);
        self
    }

    /// Restricts to objects with bounding boxes carrying any of `labels`.
    /// Empty strings are discarded; if nothing remains, no label filter is
    /// applied.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = non_empty_set(labels);
        self
    }

    pub fn build(self) -> CatalogFilter {
        CatalogFilter {
            dataset_id: self.dataset_id,
            tags: self.tags,
            labels: self.labels,
        }
    }
}

fn non_empty_set<I, S>(values: I) -> Option<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let set: BTreeSet<String> = values
        .into_iter()
        .map(Into::into)
        .filter(|v: &String| !v.is_empty())
        .collect();
    (!set.is_empty()).then_some(set)
}

/// API key credentials for the remote catalog.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub api_key_id: String,
    pub api_key: String,
}

impl ApiCredentials {
    pub fn new(api_key_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_key_id: api_key_id.into(),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key_id", &self.api_key_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Remote catalog client.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::catalog::{CatalogFilter, RemoteCatalog};
///
/// async fn count_all(catalog: &dyn RemoteCatalog) -> Result<usize> {
///     let filter = CatalogFilter::default();
///     let mut cursor = None;
///     let mut total = 0;
///     loop {
///         let page = catalog.list_by_filter(&filter, cursor).await?;
///         if page.is_terminal() {
///             return Ok(total);
///         }
///         total += page.objects.len();
///         cursor = page.next_cursor;
///     }
/// }
/// ```
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// List one page of object metadata matching `filter`.
    ///
    /// `cursor` is `None` for the first page and the previous page's
    /// `next_cursor` afterwards. Implementations request metadata only.
    async fn list_by_filter(
        &self,
        filter: &CatalogFilter,
        cursor: Option<PageCursor>,
    ) -> Result<CatalogPage>;

    /// Fetch the full binary content of one object.
    async fn fetch_content(&self, id: &BinaryId) -> Result<Bytes>;
}

/// Establishes connections to the remote catalog.
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    /// Authenticate with `credentials` and return a ready catalog client.
    async fn connect(&self, credentials: &ApiCredentials) -> Result<Arc<dyn RemoteCatalog>>;
}
