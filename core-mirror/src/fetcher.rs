//! Object Fetcher

use bridge_traits::catalog::{RemoteCatalog, RemoteObjectMetadata};
use bytes::Bytes;
use tracing::{debug, instrument};

use crate::error::{MirrorError, Result};

/// Download the full content of one object. One request, no retry.
#[instrument(skip(catalog, object), fields(object_id = %object.id))]
pub async fn fetch(catalog: &dyn RemoteCatalog, object: &RemoteObjectMetadata) -> Result<Bytes> {
    let content = catalog
        .fetch_content(&object.binary_id())
        .await
        .map_err(|source| MirrorError::Fetch {
            object_id: object.id.clone(),
            source,
        })?;

    debug!(bytes = content.len(), "Fetched object");
    Ok(content)
}
